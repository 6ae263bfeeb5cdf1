// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Scope tree parsing.
//!
//! [`ScopeParser`] is the capability the resolver needs from a Python parser:
//! turn source text into a [`ScopeTree`]. [`RustPythonParser`] implements it
//! on top of `rustpython-parser`, converting AST byte ranges to line spans.
//!
//! # Architecture
//!
//! ```text
//! source bytes -> decode_source() -> &str
//!                                     |
//!                                     v
//!        rustpython_parser::parse(Mode::Module) -> ast::Mod
//!                                     |
//!                                     v
//!            ScopeBuilder (LineIndex) -> ScopeTree
//! ```
//!
//! Definitions nested in compound statements (`if`, `for`, `while`, `with`,
//! `try`, `match`) belong to the nearest enclosing class, function or module,
//! just as they do at runtime.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use rustpython_ast::{self as ast, ExceptHandler, Stmt};
use rustpython_parser::Mode;
use thiserror::Error;
use tugtrace_core::text::LineIndex;

use crate::scope::{ScopeKind, ScopeTree};
use crate::version::ParseOptions;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that prevent building a scope tree.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The source is not valid Python.
    #[error("syntax error: {message}")]
    Syntax { message: String },

    /// The source declares an encoding this parser cannot decode.
    #[error("unsupported source encoding '{encoding}'")]
    UnsupportedEncoding { encoding: String },

    /// The source bytes are not valid in the declared encoding.
    #[error("source is not valid {encoding}")]
    InvalidEncoding { encoding: String },
}

/// Result type for parse operations.
pub type ParseResult<T> = Result<T, ParseError>;

// ============================================================================
// Parser Capability
// ============================================================================

/// Something that can turn Python source into a scope tree.
pub trait ScopeParser {
    /// Parse `source` (already decoded) into a scope tree.
    ///
    /// `path` is used only in diagnostics.
    fn parse(&self, source: &str, path: &str, options: &ParseOptions) -> ParseResult<ScopeTree>;
}

impl<T: ScopeParser + ?Sized> ScopeParser for &T {
    fn parse(&self, source: &str, path: &str, options: &ParseOptions) -> ParseResult<ScopeTree> {
        (**self).parse(source, path, options)
    }
}

/// [`ScopeParser`] backed by `rustpython-parser`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustPythonParser;

impl ScopeParser for RustPythonParser {
    fn parse(&self, source: &str, path: &str, options: &ParseOptions) -> ParseResult<ScopeTree> {
        tracing::trace!("parsing {} (python {})", path, options.version);
        let parsed = rustpython_parser::parse(source, Mode::Module, path).map_err(|e| {
            ParseError::Syntax {
                message: e.to_string(),
            }
        })?;
        let ast::Mod::Module(module) = parsed else {
            return Err(ParseError::Syntax {
                message: "source did not parse as a module".to_string(),
            });
        };

        let index = LineIndex::new(source);
        let builder = ScopeBuilder { index: &index };
        let mut children = Vec::new();
        builder.collect(&module.body, &mut children);

        let span = index.full_span();
        debug_assert!(children.iter().all(|child| span.encloses(&child.span)));
        Ok(ScopeTree::module(span.start, span.end).with_children(children))
    }
}

/// Walks statement lists and records class/function scopes.
struct ScopeBuilder<'a> {
    index: &'a LineIndex,
}

impl ScopeBuilder<'_> {
    fn collect(&self, body: &[Stmt], out: &mut Vec<ScopeTree>) {
        for stmt in body {
            match stmt {
                Stmt::FunctionDef(def) => out.push(self.scope(
                    ScopeKind::Function,
                    def.name.as_str(),
                    def.range.start().to_usize(),
                    def.range.end().to_usize(),
                    &def.body,
                )),
                Stmt::AsyncFunctionDef(def) => out.push(self.scope(
                    ScopeKind::Function,
                    def.name.as_str(),
                    def.range.start().to_usize(),
                    def.range.end().to_usize(),
                    &def.body,
                )),
                Stmt::ClassDef(def) => out.push(self.scope(
                    ScopeKind::Class,
                    def.name.as_str(),
                    def.range.start().to_usize(),
                    def.range.end().to_usize(),
                    &def.body,
                )),
                Stmt::If(s) => {
                    self.collect(&s.body, out);
                    self.collect(&s.orelse, out);
                }
                Stmt::For(s) => {
                    self.collect(&s.body, out);
                    self.collect(&s.orelse, out);
                }
                Stmt::AsyncFor(s) => {
                    self.collect(&s.body, out);
                    self.collect(&s.orelse, out);
                }
                Stmt::While(s) => {
                    self.collect(&s.body, out);
                    self.collect(&s.orelse, out);
                }
                Stmt::With(s) => self.collect(&s.body, out),
                Stmt::AsyncWith(s) => self.collect(&s.body, out),
                Stmt::Try(s) => {
                    self.collect(&s.body, out);
                    self.collect_handlers(&s.handlers, out);
                    self.collect(&s.orelse, out);
                    self.collect(&s.finalbody, out);
                }
                Stmt::TryStar(s) => {
                    self.collect(&s.body, out);
                    self.collect_handlers(&s.handlers, out);
                    self.collect(&s.orelse, out);
                    self.collect(&s.finalbody, out);
                }
                Stmt::Match(s) => {
                    for case in &s.cases {
                        self.collect(&case.body, out);
                    }
                }
                _ => {}
            }
        }
    }

    fn collect_handlers(&self, handlers: &[ExceptHandler], out: &mut Vec<ScopeTree>) {
        for handler in handlers {
            match handler {
                ExceptHandler::ExceptHandler(h) => self.collect(&h.body, out),
            }
        }
    }

    fn scope(
        &self,
        kind: ScopeKind,
        name: &str,
        start: usize,
        end: usize,
        body: &[Stmt],
    ) -> ScopeTree {
        let mut children = Vec::new();
        self.collect(body, &mut children);
        let span = self.index.line_span(start, end);
        debug_assert!(
            children.iter().all(|child| span.encloses(&child.span)),
            "nested scope escapes {} {} ({})",
            kind,
            name,
            span
        );
        ScopeTree {
            kind,
            name: name.to_string(),
            span,
            children,
        }
    }
}

// ============================================================================
// Source Decoding
// ============================================================================

/// PEP 263 coding declaration.
static CODING_COOKIE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t\f]*#.*?coding[:=][ \t]*([-\w.]+)").expect("coding cookie pattern is valid")
});

/// Decode raw source bytes into text.
///
/// A UTF-8 byte order mark always wins. Otherwise the encoding is, in
/// order: `options.encoding`, a PEP 263 coding declaration on one of the
/// first two lines, or UTF-8.
/// UTF-8, ASCII and Latin-1 are supported.
pub fn decode_source<'a>(bytes: &'a [u8], options: &ParseOptions) -> ParseResult<Cow<'a, str>> {
    if let Some(rest) = bytes.strip_prefix(b"\xEF\xBB\xBF") {
        return decode_utf8(rest);
    }

    let declared = options
        .encoding_str()
        .map(str::to_string)
        .or_else(|| declared_encoding(bytes));

    let Some(declared) = declared else {
        return decode_utf8(bytes);
    };

    match normalize_encoding(&declared).as_str() {
        "utf-8" | "utf8" | "utf-8-sig" => decode_utf8(bytes),
        "ascii" | "us-ascii" => {
            if bytes.is_ascii() {
                decode_utf8(bytes)
            } else {
                Err(ParseError::InvalidEncoding {
                    encoding: "ascii".to_string(),
                })
            }
        }
        "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" | "iso-latin-1" | "l1" => {
            Ok(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()))
        }
        _ => Err(ParseError::UnsupportedEncoding { encoding: declared }),
    }
}

fn decode_utf8(bytes: &[u8]) -> ParseResult<Cow<'_, str>> {
    std::str::from_utf8(bytes)
        .map(Cow::Borrowed)
        .map_err(|_| ParseError::InvalidEncoding {
            encoding: "utf-8".to_string(),
        })
}

/// Coding declaration from the first two lines, if any.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    bytes
        .split(|&b| b == b'\n')
        .take(2)
        .find_map(|line| {
            let line = String::from_utf8_lossy(line);
            CODING_COOKIE
                .captures(&line)
                .map(|caps| caps[1].to_string())
        })
}

fn normalize_encoding(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('_', "-")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeNode;
    use tugtrace_core::types::LineSpan;

    fn parse(source: &str) -> ScopeTree {
        RustPythonParser
            .parse(source, "test.py", &ParseOptions::default())
            .unwrap()
    }

    mod scope_building {
        use super::*;

        #[test]
        fn module_spans_whole_file() {
            let tree = parse("x = 1\ny = 2\nz = 3\n");
            assert_eq!(tree.kind(), ScopeKind::Module);
            assert_eq!(tree.line_span(), LineSpan::new(1, 3));
            assert!(tree.children().is_empty());
        }

        #[test]
        fn empty_module_has_one_line() {
            let tree = parse("");
            assert_eq!(tree.line_span(), LineSpan::new(1, 1));
        }

        #[test]
        fn nested_class_and_function_spans() {
            let source = "\
class A:
    def b(self):
        def c():
            class D:
                def e(self):
                    pass
";
            let tree = parse(source);
            let a = &tree.children()[0];
            assert_eq!((a.kind(), a.name()), (ScopeKind::Class, "A"));
            assert_eq!(a.line_span(), LineSpan::new(1, 6));
            let b = &a.children()[0];
            assert_eq!((b.kind(), b.name()), (ScopeKind::Function, "b"));
            assert_eq!(b.line_span(), LineSpan::new(2, 6));
            let c = &b.children()[0];
            assert_eq!(c.line_span(), LineSpan::new(3, 6));
            let d = &c.children()[0];
            assert_eq!((d.kind(), d.name()), (ScopeKind::Class, "D"));
            let e = &d.children()[0];
            assert_eq!((e.kind(), e.name()), (ScopeKind::Function, "e"));
            assert_eq!(e.line_span(), LineSpan::new(5, 6));
        }

        #[test]
        fn trailing_blank_lines_and_comments_are_outside_function() {
            let source = "def f():\n    return 1\n\n# trailing\n\nx = f()\n";
            let tree = parse(source);
            assert_eq!(tree.children()[0].line_span(), LineSpan::new(1, 2));
            assert_eq!(tree.line_span(), LineSpan::new(1, 6));
        }

        #[test]
        fn async_def_is_a_function_scope() {
            let tree = parse("async def fetch():\n    await thing()\n");
            let fetch = &tree.children()[0];
            assert_eq!(fetch.kind(), ScopeKind::Function);
            assert_eq!(fetch.name(), "fetch");
        }

        #[test]
        fn definitions_inside_compound_statements_are_found() {
            let source = "\
import sys
if sys.platform == 'win32':
    def helper():
        pass
else:
    def helper():
        pass
try:
    class Fallback:
        pass
except ImportError:
    def missing():
        pass
finally:
    def cleanup():
        pass
for i in range(3):
    def loop_body():
        pass
with open('f') as fh:
    def in_with():
        pass
";
            let tree = parse(source);
            let names: Vec<&str> = tree.children().iter().map(|s| s.name()).collect();
            assert_eq!(
                names,
                vec!["helper", "helper", "Fallback", "missing", "cleanup", "loop_body", "in_with"]
            );
            assert_eq!(tree.children()[0].line_span(), LineSpan::new(3, 4));
            assert_eq!(tree.children()[1].line_span(), LineSpan::new(6, 7));
        }

        #[test]
        fn match_case_bodies_are_searched() {
            let source = "\
def dispatch(cmd):
    match cmd:
        case 'go':
            def go():
                pass
            go()
";
            let tree = parse(source);
            let dispatch = &tree.children()[0];
            assert_eq!(dispatch.children()[0].name(), "go");
            assert_eq!(dispatch.children()[0].line_span(), LineSpan::new(4, 5));
        }

        #[test]
        fn one_line_def_spans_one_line() {
            let tree = parse("class D:\n    def e(self): pass\n");
            let e = &tree.children()[0].children()[0];
            assert_eq!(e.line_span(), LineSpan::new(2, 2));
        }
    }

    mod parse_failures {
        use super::*;

        #[test]
        fn syntax_error_is_reported() {
            let result = RustPythonParser.parse("def broken(:\n", "bad.py", &ParseOptions::default());
            assert!(matches!(result, Err(ParseError::Syntax { .. })));
        }

        #[test]
        fn python2_print_statement_is_a_syntax_error() {
            let result =
                RustPythonParser.parse("print 'hello'\n", "old.py", &ParseOptions::default());
            assert!(result.is_err());
        }
    }

    mod decoding {
        use super::*;

        #[test]
        fn utf8_without_declaration_borrows() {
            let decoded = decode_source(b"x = 1\n", &ParseOptions::default()).unwrap();
            assert!(matches!(decoded, Cow::Borrowed("x = 1\n")));
        }

        #[test]
        fn bom_is_stripped() {
            let decoded = decode_source(b"\xEF\xBB\xBFx = 1\n", &ParseOptions::default()).unwrap();
            assert_eq!(decoded, "x = 1\n");
        }

        #[test]
        fn invalid_utf8_is_rejected() {
            let result = decode_source(b"s = '\xff'\n", &ParseOptions::default());
            assert!(matches!(result, Err(ParseError::InvalidEncoding { .. })));
        }

        #[test]
        fn latin1_cookie_decodes_high_bytes() {
            let source = b"# -*- coding: latin-1 -*-\ns = '\xe9'\n";
            let decoded = decode_source(source, &ParseOptions::default()).unwrap();
            assert!(decoded.contains('\u{e9}'));
        }

        #[test]
        fn cookie_on_second_line_is_honored() {
            let source = b"#!/usr/bin/env python\n# vim: set fileencoding=iso-8859-1 :\ns = '\xe9'\n";
            let decoded = decode_source(source, &ParseOptions::default()).unwrap();
            assert!(decoded.contains('\u{e9}'));
        }

        #[test]
        fn cookie_on_third_line_is_ignored() {
            let source = b"x = 1\ny = 2\n# coding: latin-1\n";
            let decoded = decode_source(source, &ParseOptions::default()).unwrap();
            assert!(matches!(decoded, Cow::Borrowed(_)));
        }

        #[test]
        fn unsupported_cookie_is_rejected() {
            let source = b"# coding: shift_jis\nx = 1\n";
            let result = decode_source(source, &ParseOptions::default());
            match result {
                Err(ParseError::UnsupportedEncoding { encoding }) => assert_eq!(encoding, "shift_jis"),
                other => panic!("expected unsupported encoding, got {:?}", other),
            }
        }

        #[test]
        fn explicit_encoding_overrides_cookie() {
            let source = b"# coding: shift_jis\ns = '\xe9'\n";
            let options = ParseOptions {
                encoding: Some("latin_1".to_string()),
                ..ParseOptions::default()
            };
            let decoded = decode_source(source, &options).unwrap();
            assert!(decoded.contains('\u{e9}'));
        }

        #[test]
        fn ascii_cookie_rejects_high_bytes() {
            let result = decode_source(b"# coding: ascii\ns = '\xe9'\n", &ParseOptions::default());
            assert!(matches!(result, Err(ParseError::InvalidEncoding { .. })));
        }
    }
}
