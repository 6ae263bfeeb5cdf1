//! tugtrace: qualified stack frames for Python tracebacks
//!
//! Turns raw interpreter traceback text into stack frames whose function
//! names reflect their lexical nesting, so a caller can jump to the right
//! definition when several functions share a name.

// Core infrastructure - re-exported from tugtrace-core
pub use tugtrace_core::error;
pub use tugtrace_core::output;
pub use tugtrace_core::text;
pub use tugtrace_core::types;

// Language support
pub use tugtrace_python as python;
pub use tugtrace_python::{parse_stack_frames, StackFrame, StackTraceParser};

// Front door for the command line
pub mod cli;
