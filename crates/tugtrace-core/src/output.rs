//! JSON output types and serialization for CLI responses.
//!
//! These types form the contract with callers that consume `tugtrace` output
//! (test-result viewers, editor integrations).
//!
//! ## Design Principles
//!
//! 1. **Status first:** Every response has `status` as first field
//! 2. **Deterministic:** Same input -> same output (field order, frame order)
//! 3. **Nullable vs absent:** Absent field means "not applicable" (e.g. a frame
//!    with no file on disk has no `file`/`line`)
//! 4. **Versioned:** Schema version in response enables forward compatibility

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{OutputErrorCode, TraceError};

pub use crate::types::{Location, StackFrame};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Error Types
// ============================================================================

/// Error information for error responses.
///
/// - `code`: Numeric error code (required)
/// - `message`: Human-readable message (required)
/// - `details`: Error-specific structured data (optional)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    /// Create from a TraceError.
    pub fn from_error(err: &TraceError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let message = err.to_string();

        let details = match err {
            TraceError::InvalidArguments { details, .. } => details.clone(),
            TraceError::FileNotFound { path } => Some(serde_json::json!({ "path": path })),
            TraceError::Unreadable { path, reason } => {
                Some(serde_json::json!({ "path": path, "reason": reason }))
            }
            TraceError::InternalError { .. } => None,
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a TraceError.
    pub fn from_error(err: &TraceError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Response Structs
// ============================================================================

/// Response for the `frames` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramesResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Language version used for parsing ("permissive" when unknown).
    pub python_version: String,
    /// Frames in trace order.
    pub frames: Vec<StackFrame>,
    /// True when iteration stopped at a caller-supplied limit.
    pub truncated: bool,
}

impl FramesResponse {
    /// Create a new frames response.
    pub fn new(python_version: impl Into<String>, frames: Vec<StackFrame>, truncated: bool) -> Self {
        FramesResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            python_version: python_version.into(),
            frames,
            truncated,
        }
    }
}

/// Response for the `qualname` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualnameResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// The queried location.
    pub location: Location,
    /// The bare function name that was queried.
    pub function: String,
    /// Qualified name, or the bare name when resolution fell back.
    pub name: String,
    /// Whether `name` came from the syntax tree.
    pub resolved: bool,
    /// Machine-readable resolution outcome (e.g. "resolved", "mismatch").
    pub outcome: String,
}

impl QualnameResponse {
    /// Create a new qualname response.
    pub fn new(
        location: Location,
        function: impl Into<String>,
        name: impl Into<String>,
        resolved: bool,
        outcome: impl Into<String>,
    ) -> Self {
        QualnameResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            location,
            function: function.into(),
            name: name.into(),
            resolved,
            outcome: outcome.into(),
        }
    }
}

// ============================================================================
// Emitters
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
