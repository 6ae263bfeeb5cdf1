//! Qualified function names for stack frames.
//!
//! An interpreter frame only names the function it was executing (`e`).
//! Given the source file, [`resolve`] finds the scope that encloses the
//! frame's line and describes its lexical nesting:
//!
//! ```text
//! class A:
//!     def b(self):
//!         def c():
//!             class D:
//!                 def e(self):
//!                     pass        <- line 6, function "e"
//! ```
//!
//! resolves to `D.e in c in A.b`.
//!
//! # Composition Rules
//!
//! Names are composed innermost to outermost:
//! - a scope whose parent is a class is joined to it with `.` (`A.b`,
//!   `Outer.Inner.method`)
//! - a scope whose parent is a function is joined to it with ` in `
//! - the module never appears in the name
//!
//! # Verification
//!
//! The innermost scope at the line must carry the name the interpreter
//! reported. If it does not, the file changed after the trace was captured
//! and the tree cannot be trusted, so the caller gets [`QualifiedName::Mismatch`]
//! and should show the bare name. Outer scopes are not checked.
//!
//! Scope selection is purely positional. Two functions with the same name
//! resolve independently because only the one whose lines contain the frame
//! is ever visited.

use std::path::Path;

use crate::files::SourceFiles;
use crate::parser::{decode_source, ScopeParser};
use crate::scope::{ScopeKind, ScopeNode};
use crate::version::ParseOptions;

/// Separator between a function and the function that contains it.
const FUNCTION_SEPARATOR: &str = " in ";

/// Outcome of qualified name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualifiedName {
    /// A qualified name was composed from the tree.
    Resolved(String),
    /// The line is at module level; the bare name stands as is.
    TopLevel,
    /// The innermost scope at the line is not the reported function.
    Mismatch {
        /// Name reported by the interpreter.
        expected: String,
        /// Name found in the parsed source.
        found: String,
    },
    /// The line lies outside the parsed file.
    OutOfRange {
        /// The requested line.
        line: u32,
        /// Last line of the parsed file.
        last_line: u32,
    },
    /// No tree was available (missing, unreadable or unparsable source).
    Unavailable,
}

impl QualifiedName {
    /// Whether a qualified name was produced.
    pub fn is_resolved(&self) -> bool {
        matches!(self, QualifiedName::Resolved(_))
    }

    /// Stable label for the outcome, used in output.
    pub fn outcome(&self) -> &'static str {
        match self {
            QualifiedName::Resolved(_) => "resolved",
            QualifiedName::TopLevel => "top_level",
            QualifiedName::Mismatch { .. } => "mismatch",
            QualifiedName::OutOfRange { .. } => "out_of_range",
            QualifiedName::Unavailable => "unavailable",
        }
    }

    /// The qualified name, or `bare` for every other outcome.
    pub fn into_name_or(self, bare: &str) -> String {
        match self {
            QualifiedName::Resolved(name) if !name.is_empty() => name,
            _ => bare.to_string(),
        }
    }
}

/// Resolve the qualified name of `function` at `line` within `root`.
///
/// `root` is the module scope of the file. This is a pure function of its
/// inputs.
pub fn resolve<N: ScopeNode>(root: &N, line: u32, function: &str) -> QualifiedName {
    let root_span = root.line_span();
    if !root_span.contains(line) {
        return QualifiedName::OutOfRange {
            line,
            last_line: root_span.end,
        };
    }

    // Descend to the innermost scope containing the line, recording the path.
    let mut chain: Vec<&N> = Vec::new();
    let mut current = root;
    while let Some(child) = current
        .children()
        .iter()
        .find(|child| child.line_span().contains(line))
    {
        chain.push(child);
        current = child;
    }

    let Some(&innermost) = chain.last() else {
        return QualifiedName::TopLevel;
    };
    if innermost.kind() == ScopeKind::Module {
        return QualifiedName::TopLevel;
    }
    if innermost.name() != function {
        let mismatch = QualifiedName::Mismatch {
            expected: function.to_string(),
            found: innermost.name().to_string(),
        };
        // A def or class header line also runs in the enclosing scope
        // (default arguments, decorators, base classes).
        if innermost.line_span().start != line {
            return mismatch;
        }
        chain.pop();
        match chain.last() {
            None => return QualifiedName::TopLevel,
            Some(parent) if parent.kind() == ScopeKind::Module => return QualifiedName::TopLevel,
            Some(parent) if parent.name() == function => {}
            Some(_) => return mismatch,
        }
    }

    let name = compose(&chain);
    if name.is_empty() {
        QualifiedName::TopLevel
    } else {
        QualifiedName::Resolved(name)
    }
}

/// Join a root-to-leaf scope chain into a qualified name.
fn compose<N: ScopeNode>(chain: &[&N]) -> String {
    let mut scopes = chain.iter().rev();
    let Some(innermost) = scopes.next() else {
        return String::new();
    };

    let mut segments: Vec<String> = Vec::new();
    let mut segment = innermost.name().to_string();
    for scope in scopes {
        match scope.kind() {
            ScopeKind::Class => segment = format!("{}.{}", scope.name(), segment),
            ScopeKind::Function => {
                segments.push(std::mem::replace(&mut segment, scope.name().to_string()));
            }
            ScopeKind::Module => break,
        }
    }
    segments.push(segment);
    segments.join(FUNCTION_SEPARATOR)
}

/// Read, parse and resolve in one step.
///
/// Every failure (unreadable file, undecodable bytes, syntax error) becomes
/// [`QualifiedName::Unavailable`]. Failures are logged at debug level.
pub fn resolve_in_file<P, F>(
    parser: &P,
    files: &F,
    path: &Path,
    line: u32,
    function: &str,
    options: &ParseOptions,
) -> QualifiedName
where
    P: ScopeParser + ?Sized,
    F: SourceFiles + ?Sized,
{
    let bytes = match files.read_bytes(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("cannot read {}: {}", path.display(), e);
            return QualifiedName::Unavailable;
        }
    };

    let path_str = path.to_string_lossy();
    let tree = match decode_source(&bytes, options)
        .and_then(|source| parser.parse(&source, &path_str, options))
    {
        Ok(tree) => tree,
        Err(e) => {
            tracing::debug!("cannot parse {}: {}", path_str, e);
            return QualifiedName::Unavailable;
        }
    };

    let result = resolve(&tree, line, function);
    if let QualifiedName::Mismatch { expected, found } = &result {
        tracing::debug!(
            "{}:{} names '{}' but the trace reported '{}'; source changed since the trace",
            path_str,
            line,
            found,
            expected
        );
    }
    result
}

/// Compute the qualified name of a frame, falling back to the bare name.
pub fn qualified_function_name<P, F>(
    parser: &P,
    files: &F,
    path: &Path,
    line: u32,
    function: &str,
    options: &ParseOptions,
) -> String
where
    P: ScopeParser + ?Sized,
    F: SourceFiles + ?Sized,
{
    resolve_in_file(parser, files, path, line, function, options).into_name_or(function)
}
