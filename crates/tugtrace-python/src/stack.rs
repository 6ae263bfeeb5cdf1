//! Stack frame assembly.
//!
//! This is the front door of the crate: trace text in, [`StackFrame`]s out.
//!
//! ```text
//! trace text -> split_version_tag -> RawFrames -> assemble_frame -> StackFrame
//!                                                     |
//!                                  exists? -> read -> decode -> parse -> resolve
//! ```
//!
//! Frames are produced lazily. Each file is read and parsed only when its
//! frame is pulled, and no tree outlives the frame it was parsed for, so a
//! caller that stops after the first few frames never touches the rest.
//!
//! Nothing here fails: a frame whose file does not exist carries only its
//! bare name, and a frame whose file cannot be resolved keeps its location
//! but falls back to the bare name.

use std::path::Path;

use tugtrace_core::types::StackFrame;

use crate::files::{DiskFiles, SourceFiles};
use crate::frames::{split_version_tag, RawFrame, RawFrames};
use crate::parser::{RustPythonParser, ScopeParser};
use crate::qualname::{qualified_function_name, resolve_in_file, QualifiedName};
use crate::version::{ParseOptions, PythonVersion};

/// Turn one raw frame into a final stack frame.
pub fn assemble_frame<P, F>(parser: &P, files: &F, raw: RawFrame, options: &ParseOptions) -> StackFrame
where
    P: ScopeParser + ?Sized,
    F: SourceFiles + ?Sized,
{
    let path = Path::new(&raw.file);
    if !files.exists(path) {
        tracing::debug!("{} does not exist; keeping bare name '{}'", raw.file, raw.function);
        return StackFrame::name_only(raw.function);
    }

    let name = qualified_function_name(parser, files, path, raw.line, &raw.function, options);
    StackFrame::new(name, raw.file, raw.line)
}

/// Lazy iterator of assembled stack frames.
pub struct StackFrames<'t, P, F> {
    raw: RawFrames<'t>,
    parser: P,
    files: F,
    options: ParseOptions,
}

impl<'t, P: ScopeParser, F: SourceFiles> StackFrames<'t, P, F> {
    /// Scan `body` (trace text with any version tag already removed).
    pub fn new(parser: P, files: F, body: &'t str, options: ParseOptions) -> Self {
        Self {
            raw: RawFrames::new(body),
            parser,
            files,
            options,
        }
    }

    /// The language version frames are parsed with.
    pub fn python_version(&self) -> PythonVersion {
        self.options.version
    }
}

impl<P: ScopeParser, F: SourceFiles> Iterator for StackFrames<'_, P, F> {
    type Item = StackFrame;

    fn next(&mut self) -> Option<StackFrame> {
        let raw = self.raw.next()?;
        Some(assemble_frame(&self.parser, &self.files, raw, &self.options))
    }
}

/// Parses stack traces with injected parser and filesystem collaborators.
///
/// # Example
///
/// ```no_run
/// use tugtrace_python::{PythonVersion, StackTraceParser};
///
/// let trace = std::fs::read_to_string("failure.txt").unwrap();
/// let parser = StackTraceParser::new().with_default_version(PythonVersion::V3_12);
/// for frame in parser.frames(&trace) {
///     println!("{}", frame);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StackTraceParser<P = RustPythonParser, F = DiskFiles> {
    parser: P,
    files: F,
    default_version: PythonVersion,
}

impl StackTraceParser {
    /// A parser over the real filesystem using `rustpython-parser`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: ScopeParser, F: SourceFiles> StackTraceParser<P, F> {
    /// A parser with explicit collaborators.
    pub fn with_collaborators(parser: P, files: F) -> Self {
        Self {
            parser,
            files,
            default_version: PythonVersion::Permissive,
        }
    }

    /// Version to parse with when a trace carries no version tag.
    #[must_use]
    pub fn with_default_version(mut self, version: PythonVersion) -> Self {
        self.default_version = version;
        self
    }

    /// Parse options for a trace, honoring its version tag.
    fn options_for(&self, tag: Option<PythonVersion>) -> ParseOptions {
        ParseOptions::new(tag.unwrap_or(self.default_version))
    }

    /// Lazily assemble the frames of `trace`.
    pub fn frames<'t>(&self, trace: &'t str) -> StackFrames<'t, &P, &F> {
        let (tag, body) = split_version_tag(trace);
        StackFrames::new(&self.parser, &self.files, body, self.options_for(tag))
    }

    /// Resolve a single frame, reporting how resolution went.
    ///
    /// Unlike [`StackTraceParser::frames`], no existence short-circuit is
    /// applied; a missing file is [`QualifiedName::Unavailable`].
    pub fn resolve(&self, path: &Path, line: u32, function: &str) -> QualifiedName {
        let options = self.options_for(None);
        resolve_in_file(&self.parser, &self.files, path, line, function, &options)
    }

    /// The file access this parser reads through.
    pub fn files(&self) -> &F {
        &self.files
    }
}

/// Parse a stack trace using the default parser and the real filesystem.
///
/// `trace` may start with a version tag line (e.g. `3.11.4`). Frames are
/// yielded lazily in trace order.
///
/// # Example
///
/// ```no_run
/// let trace = "3.12\n  File \"app.py\", line 6, in e\n";
/// for frame in tugtrace_python::parse_stack_frames(trace) {
///     println!("{}", frame);
/// }
/// ```
pub fn parse_stack_frames(trace: &str) -> StackFrames<'_, RustPythonParser, DiskFiles> {
    let (tag, body) = split_version_tag(trace);
    StackFrames::new(
        RustPythonParser,
        DiskFiles,
        body,
        ParseOptions::new(tag.unwrap_or_default()),
    )
}
