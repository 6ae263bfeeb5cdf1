//! CLI front door.
//!
//! Provides the helpers behind the `tugtrace` subcommands:
//! - `frames` - Assemble the qualified frames of a trace
//! - `qualname` - Resolve a single `path:line` plus function name
//!
//! The helpers take a [`StackTraceParser`] so callers choose the parser and
//! file access; `main.rs` passes the default disk-backed one.
//!
//! ## Error Handling
//!
//! Trace processing itself never fails. Only argument problems (a bad
//! `--at`, a missing file for `qualname`) surface as [`TraceError`].

use std::fmt::Write as _;
use std::path::Path;

use tugtrace_core::error::TraceError;
use tugtrace_core::output::{FramesResponse, Location, QualnameResponse};
use tugtrace_python::{split_version_tag, RawFrames, ScopeParser, SourceFiles, StackTraceParser};

/// Assemble the frames of `trace`, stopping after `limit` frames.
///
/// Frames past the limit are counted but never resolved, so their files
/// are not read.
pub fn run_frames<P, F>(parser: &StackTraceParser<P, F>, trace: &str, limit: Option<usize>) -> FramesResponse
where
    P: ScopeParser,
    F: SourceFiles,
{
    let frames = parser.frames(trace);
    let version = frames.python_version();

    let Some(limit) = limit else {
        return FramesResponse::new(version.to_string(), frames.collect(), false);
    };

    let taken: Vec<_> = frames.take(limit).collect();
    let (_, body) = split_version_tag(trace);
    let truncated = RawFrames::new(body).nth(limit).is_some();
    tracing::debug!("collected {} frames (limit {}, truncated: {})", taken.len(), limit, truncated);
    FramesResponse::new(version.to_string(), taken, truncated)
}

/// Resolve one frame given as `path:line` and a bare function name.
pub fn run_qualname<P, F>(parser: &StackTraceParser<P, F>, at: &str, name: &str) -> Result<QualnameResponse, TraceError>
where
    P: ScopeParser,
    F: SourceFiles,
{
    let location = Location::parse(at).ok_or_else(|| {
        TraceError::invalid_args(format!("invalid location format '{}', expected path:line", at))
    })?;
    if name.is_empty() {
        return Err(TraceError::invalid_args("function name must not be empty"));
    }

    let path = Path::new(&location.file);
    if !parser.files().exists(path) {
        return Err(TraceError::file_not_found(location.file.clone()));
    }

    let result = parser.resolve(path, location.line, name);
    let resolved = result.is_resolved();
    let outcome = result.outcome();
    Ok(QualnameResponse::new(
        location,
        name,
        result.into_name_or(name),
        resolved,
        outcome,
    ))
}

/// Render frames one per line, innermost call last.
pub fn format_frames_text(response: &FramesResponse) -> String {
    let mut out = String::new();
    for frame in &response.frames {
        let _ = writeln!(out, "{}", frame);
    }
    if response.truncated {
        out.push_str("...\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tugtrace_core::error::OutputErrorCode;
    use tugtrace_python::{MemoryFiles, PythonVersion, RustPythonParser, StackFrame};

    const APP: &str = "\
class Handler:
    def run(self):
        def step():
            pass
        step()
";

    fn parser() -> StackTraceParser<RustPythonParser, MemoryFiles> {
        StackTraceParser::with_collaborators(RustPythonParser, MemoryFiles::new().with_file("app.py", APP))
    }

    fn trace() -> String {
        [
            "3.12.1",
            "Traceback (most recent call last):",
            "  File \"app.py\", line 5, in run",
            "  File \"app.py\", line 4, in step",
            "  File \"<frozen runpy>\", line 88, in _run_code",
            "ValueError",
        ]
        .join("\n")
    }

    mod frames {
        use super::*;

        #[test]
        fn collects_every_frame_without_limit() {
            let response = run_frames(&parser(), &trace(), None);
            assert_eq!(response.status, "ok");
            assert_eq!(response.python_version, "3.12");
            assert!(!response.truncated);
            assert_eq!(
                response.frames,
                vec![
                    StackFrame::new("Handler.run", "app.py", 5),
                    StackFrame::new("step in Handler.run", "app.py", 4),
                    StackFrame::name_only("_run_code"),
                ]
            );
        }

        #[test]
        fn limit_truncates() {
            let response = run_frames(&parser(), &trace(), Some(2));
            assert_eq!(response.frames.len(), 2);
            assert!(response.truncated);
        }

        #[test]
        fn limit_at_frame_count_is_not_truncated() {
            let response = run_frames(&parser(), &trace(), Some(3));
            assert_eq!(response.frames.len(), 3);
            assert!(!response.truncated);
        }

        #[test]
        fn untagged_trace_uses_default_version() {
            let parser = parser().with_default_version(PythonVersion::V3_8);
            let response = run_frames(&parser, "no frames here", None);
            assert_eq!(response.python_version, "3.8");
            assert!(response.frames.is_empty());
        }

        #[test]
        fn text_format_lists_frames() {
            let response = run_frames(&parser(), &trace(), Some(1));
            assert_eq!(format_frames_text(&response), "Handler.run (app.py:5)\n...\n");
        }
    }

    mod qualname {
        use super::*;

        #[test]
        fn resolves_nested_function() {
            let response = run_qualname(&parser(), "app.py:4", "step").unwrap();
            assert_eq!(response.name, "step in Handler.run");
            assert!(response.resolved);
            assert_eq!(response.outcome, "resolved");
            assert_eq!(response.location, Location::new("app.py", 4));
        }

        #[test]
        fn mismatch_falls_back_to_bare_name() {
            let response = run_qualname(&parser(), "app.py:4", "other").unwrap();
            assert_eq!(response.name, "other");
            assert!(!response.resolved);
            assert_eq!(response.outcome, "mismatch");
        }

        #[test]
        fn bad_location_is_invalid_arguments() {
            let err = run_qualname(&parser(), "app.py", "step").unwrap_err();
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
        }

        #[test]
        fn missing_file_is_resolution_error() {
            let err = run_qualname(&parser(), "gone.py:1", "f").unwrap_err();
            assert!(matches!(err, TraceError::FileNotFound { .. }));
            assert_eq!(err.error_code(), OutputErrorCode::ResolutionError);
        }
    }
}
