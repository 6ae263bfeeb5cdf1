// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Lexical scope trees for Python source files.
//!
//! A scope tree records where each module, class and function body lives,
//! by line. The qualified name resolver only ever reads a tree through the
//! [`ScopeNode`] trait, so any parser that can report kinds, names, line
//! spans and ordered children can feed it.
//!
//! # Invariants
//!
//! - The root is a [`ScopeKind::Module`] spanning the whole file.
//! - A child's span lies inside its parent's span.
//! - Sibling spans do not overlap.
//!
//! Lambdas and comprehensions are not scopes here: tracebacks name them
//! `<lambda>`/`<listcomp>`, which never match the frame pattern.

use tugtrace_core::types::LineSpan;

/// The kind of scope in Python.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Module-level scope (top-level of a file).
    Module,
    /// Class body scope.
    Class,
    /// Function or method body scope (including `async def`).
    Function,
}

impl ScopeKind {
    /// Returns the string representation used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Module => "module",
            ScopeKind::Class => "class",
            ScopeKind::Function => "function",
        }
    }
}

impl std::fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read-only view of one node in a scope tree.
pub trait ScopeNode {
    /// What created this scope.
    fn kind(&self) -> ScopeKind;

    /// The class or function name. Module scopes use a placeholder.
    fn name(&self) -> &str;

    /// Lines covered by the scope, including its header line.
    fn line_span(&self) -> LineSpan;

    /// Directly nested scopes, in source order.
    fn children(&self) -> &[Self]
    where
        Self: Sized;
}

/// Owned scope tree produced by [`crate::parser::ScopeParser`] implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTree {
    /// The kind of scope.
    pub kind: ScopeKind,
    /// The name of the function or class, or `<module>`.
    pub name: String,
    /// Lines covered by the scope.
    pub span: LineSpan,
    /// Nested scopes in source order.
    pub children: Vec<ScopeTree>,
}

/// Name given to module scopes, matching the interpreter's frame name.
pub const MODULE_SCOPE_NAME: &str = "<module>";

impl ScopeTree {
    /// Create a module scope covering `start..=end`.
    pub fn module(start: u32, end: u32) -> Self {
        Self::new(ScopeKind::Module, MODULE_SCOPE_NAME, start, end)
    }

    /// Create a class scope covering `start..=end`.
    pub fn class(name: impl Into<String>, start: u32, end: u32) -> Self {
        Self::new(ScopeKind::Class, name, start, end)
    }

    /// Create a function scope covering `start..=end`.
    pub fn function(name: impl Into<String>, start: u32, end: u32) -> Self {
        Self::new(ScopeKind::Function, name, start, end)
    }

    fn new(kind: ScopeKind, name: impl Into<String>, start: u32, end: u32) -> Self {
        Self {
            kind,
            name: name.into(),
            span: LineSpan::new(start, end),
            children: Vec::new(),
        }
    }

    /// Set the nested scopes.
    #[must_use]
    pub fn with_children(mut self, children: Vec<ScopeTree>) -> Self {
        self.children = children;
        self
    }
}

impl ScopeNode for ScopeTree {
    fn kind(&self) -> ScopeKind {
        self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn line_span(&self) -> LineSpan {
        self.span
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}
