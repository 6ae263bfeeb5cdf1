//! Core infrastructure for tugtrace.
//!
//! This crate provides language-agnostic infrastructure:
//! - Error types and error codes
//! - JSON output types for CLI responses
//! - Line spans, locations and stack frame records
//! - Text utilities for byte offset to line conversion

pub mod error;
pub mod output;
pub mod text;
pub mod types;
