//! Text position utilities for byte offset to line conversions.
//!
//! ## Coordinate Conventions
//!
//! - Lines are **1-indexed** (matching interpreter tracebacks and editors)
//! - Byte offsets are **0-indexed**
//! - Offsets past the end of the content clamp to the last line
//!
//! Parsers report node positions as byte ranges while stack traces report
//! lines, so [`LineIndex`] is built once per parsed file and queried for
//! every scope.

use crate::types::LineSpan;

/// Precomputed line start offsets for a piece of source text.
///
/// Lookups are `O(log n)` in the number of lines.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset at which each line starts. Always contains at least `0`.
    line_starts: Vec<usize>,
    /// Total content length in bytes.
    len: usize,
}

impl LineIndex {
    /// Build an index over `content`.
    ///
    /// `\n`, `\r\n` and a lone `\r` each end a line, as they do for the
    /// interpreter.
    pub fn new(content: &str) -> Self {
        let bytes = content.as_bytes();
        let mut line_starts = vec![0];
        for (i, &byte) in bytes.iter().enumerate() {
            let ends_line = match byte {
                b'\n' => true,
                b'\r' => bytes.get(i + 1) != Some(&b'\n'),
                _ => false,
            };
            if ends_line {
                line_starts.push(i + 1);
            }
        }
        LineIndex {
            line_starts,
            len: content.len(),
        }
    }

    /// Number of lines in the content.
    ///
    /// A trailing newline does not start a new line, so `"a\nb\n"` has two
    /// lines. Empty content has zero lines.
    pub fn line_count(&self) -> u32 {
        let mut count = self.line_starts.len();
        if self.line_starts.last() == Some(&self.len) {
            count -= 1;
        }
        count as u32
    }

    /// Convert a byte offset to its 1-indexed line.
    pub fn line_of(&self, offset: usize) -> u32 {
        let offset = offset.min(self.len);
        let line = self.line_starts.partition_point(|&start| start <= offset);
        (line as u32).min(self.line_count().max(1))
    }

    /// Lines covered by the half-open byte range `start..end`.
    ///
    /// The end offset is exclusive, so the last covered line is the line of
    /// the final byte inside the range.
    pub fn line_span(&self, start: usize, end: usize) -> LineSpan {
        let first = self.line_of(start);
        let last = if end > start {
            self.line_of(end - 1)
        } else {
            first
        };
        LineSpan::new(first, last)
    }

    /// Span covering every line of the content (at least one line).
    pub fn full_span(&self) -> LineSpan {
        LineSpan::new(1, self.line_count().max(1))
    }
}

// ============================================================================
// Tests
// ============================================================================
