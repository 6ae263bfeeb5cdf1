//! Python traceback support for tugtrace.
//!
//! This crate turns Python traceback text into stack frames whose names are
//! qualified by their lexical nesting, e.g. `D.e in c in A.b`.
//! It includes:
//! - Frame extraction from traceback text
//! - Scope trees built with `rustpython-parser`
//! - Qualified name resolution against a scope tree
//! - Lazy frame assembly over injectable parser and filesystem collaborators

pub mod files;
pub mod frames;
pub mod parser;
pub mod qualname;
pub mod scope;
pub mod stack;
pub mod version;

pub use files::{DiskFiles, FileError, MemoryFiles, SourceFiles};
pub use frames::{split_version_tag, RawFrame, RawFrames};
pub use parser::{decode_source, ParseError, RustPythonParser, ScopeParser};
pub use qualname::{qualified_function_name, resolve, resolve_in_file, QualifiedName};
pub use scope::{ScopeKind, ScopeNode, ScopeTree};
pub use stack::{assemble_frame, parse_stack_frames, StackFrames, StackTraceParser};
pub use tugtrace_core::types::StackFrame;
pub use version::{ParseOptions, PythonVersion};
