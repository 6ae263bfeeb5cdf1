//! Error types and error code constants for tugtrace.
//!
//! This module provides a unified error type (`TraceError`) that bridges
//! domain-specific errors from different subsystems (file access, parsing)
//! into a common format suitable for JSON output.
//!
//! ## Error Code Mapping
//!
//! Exit codes:
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Resolution errors (file not found, unreadable source)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! ## Design
//!
//! The stack frame pipeline itself never fails: every problem degrades to the
//! best available information. `TraceError` only covers the CLI front door,
//! where a caller asked for something specific (a file, a location) that could
//! not be honored.
//!
//! - **Unified type**: `TraceError` is the single error type for CLI output
//! - **Bridging**: `impl From<X> for TraceError` bridges domain errors
//! - **Code mapping**: `OutputErrorCode` provides stable integer codes for JSON

use std::fmt;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (file not found, unreadable source).
    ResolutionError = 3,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
///
/// This is the canonical error type that all subsystem errors are converted to
/// before being rendered as JSON output.
#[derive(Debug, Error)]
pub enum TraceError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// File exists but could not be read or decoded.
    #[error("cannot read {path}: {reason}")]
    Unreadable { path: String, reason: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&TraceError> for OutputErrorCode {
    fn from(err: &TraceError) -> Self {
        match err {
            TraceError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            TraceError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            TraceError::Unreadable { .. } => OutputErrorCode::ResolutionError,
            TraceError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<TraceError> for OutputErrorCode {
    fn from(err: TraceError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridge: io::Error -> TraceError
// ============================================================================

impl From<std::io::Error> for TraceError {
    fn from(err: std::io::Error) -> Self {
        TraceError::InternalError {
            message: format!("IO error: {}", err),
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl TraceError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        TraceError::InvalidArguments {
            message: message.into(),
            details: None,
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        TraceError::FileNotFound { path: path.into() }
    }

    /// Create an unreadable file error.
    pub fn unreadable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        TraceError::Unreadable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod error_code_mapping {
        use super::*;

        #[test]
        fn invalid_args_maps_to_invalid_arguments() {
            let err = TraceError::invalid_args("bad location");
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
            assert_eq!(err.error_code().code(), 2);
        }

        #[test]
        fn file_errors_map_to_resolution_error() {
            assert_eq!(
                TraceError::file_not_found("missing.py").error_code().code(),
                3
            );
            assert_eq!(
                TraceError::unreadable("app.py", "permission denied")
                    .error_code()
                    .code(),
                3
            );
        }

        #[test]
        fn io_error_bridges_to_internal() {
            let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
            let err = TraceError::from(io_err);
            assert_eq!(OutputErrorCode::from(err), OutputErrorCode::InternalError);
        }
    }

    mod messages {
        use super::*;

        #[test]
        fn file_not_found_message_includes_path() {
            let err = TraceError::file_not_found("tests/test_app.py");
            assert_eq!(err.to_string(), "file not found: tests/test_app.py");
        }

        #[test]
        fn unreadable_message_includes_reason() {
            let err = TraceError::unreadable("app.py", "invalid UTF-8");
            assert_eq!(err.to_string(), "cannot read app.py: invalid UTF-8");
        }
    }
}
