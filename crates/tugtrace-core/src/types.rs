//! Common types shared between error and output modules.
//!
//! This module contains types that are used by both the error and output modules,
//! avoiding circular dependencies.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// LineSpan Type
// ============================================================================

/// An inclusive range of 1-indexed source lines.
///
/// Scopes are located by line rather than by byte offset because stack traces
/// only report line numbers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LineSpan {
    /// First line (1-indexed, inclusive).
    pub start: u32,
    /// Last line (1-indexed, inclusive).
    pub end: u32,
}

impl LineSpan {
    /// Create a new span. `end` is clamped so it never precedes `start`.
    pub fn new(start: u32, end: u32) -> Self {
        LineSpan {
            start,
            end: end.max(start),
        }
    }

    /// Whether `line` falls inside this span.
    pub fn contains(&self, line: u32) -> bool {
        self.start <= line && line <= self.end
    }

    /// Whether `other` lies entirely inside this span.
    pub fn encloses(&self, other: &LineSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for LineSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

// ============================================================================
// Location Type
// ============================================================================

/// A line in a source file, as reported by an interpreter trace.
///
/// - `file`: Path exactly as it appeared in the trace
/// - `line`: 1-indexed line number
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    /// File path.
    pub file: String,
    /// Line number (1-indexed).
    pub line: u32,
}

impl Location {
    /// Create a new location.
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Location {
            file: file.into(),
            line,
        }
    }

    /// Parse a location from "path:line" format.
    ///
    /// This parsing is robust against paths containing colons (e.g., Windows paths).
    pub fn parse(s: &str) -> Option<Self> {
        let (file, line) = s.rsplit_once(':')?;
        if file.is_empty() {
            return None;
        }
        let line: u32 = line.parse().ok()?;
        Some(Location::new(file, line))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

// ============================================================================
// StackFrame Type
// ============================================================================

/// One navigable frame of a stack trace.
///
/// `file` and `line` are both present or both absent. They are absent for
/// frames whose file does not exist on disk (frozen or built-in modules), in
/// which case `name` is always the bare function name from the trace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StackFrame {
    /// Qualified function name, or the bare name when resolution was not possible.
    pub name: String,
    /// Source file path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Line number (1-indexed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl StackFrame {
    /// A frame with a source location.
    pub fn new(name: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        StackFrame {
            name: name.into(),
            file: Some(file.into()),
            line: Some(line),
        }
    }

    /// A frame that only carries a function name.
    pub fn name_only(name: impl Into<String>) -> Self {
        StackFrame {
            name: name.into(),
            file: None,
            line: None,
        }
    }

    /// The frame's location, if it has one.
    pub fn location(&self) -> Option<Location> {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => Some(Location::new(file.clone(), line)),
            _ => None,
        }
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location() {
            Some(location) => write!(f, "{} ({})", self.name, location),
            None => write!(f, "{}", self.name),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
