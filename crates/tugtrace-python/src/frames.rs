//! Frame extraction from raw trace text.
//!
//! Python tracebacks name each frame on a line of the form
//!
//! ```text
//!   File "app/models.py", line 42, in save
//! ```
//!
//! [`RawFrames`] scans trace text for that pattern lazily, in textual order.
//! Everything else in the text (the `Traceback` header, source excerpts,
//! the exception message) is ignored.

use std::sync::LazyLock;

use regex::{CaptureMatches, Regex};

use crate::version::PythonVersion;

/// The fixed frame pattern: quoted file, decimal line, identifier.
static FRAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"File "(.+)", line (\d+), in (\w+)"#).expect("frame pattern is valid")
});

/// One frame as it appeared in the trace, before any resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// File path exactly as printed.
    pub file: String,
    /// Line number as printed.
    pub line: u32,
    /// Bare function name as printed.
    pub function: String,
}

/// Lazy iterator over the frames in a piece of trace text.
///
/// Candidates whose line number does not fit a `u32` are skipped; truncated
/// or garbled traces must not stop extraction of the frames that remain.
pub struct RawFrames<'t> {
    matches: CaptureMatches<'static, 't>,
}

impl<'t> RawFrames<'t> {
    /// Start scanning `text`.
    pub fn new(text: &'t str) -> Self {
        Self {
            matches: FRAME_PATTERN.captures_iter(text),
        }
    }
}

impl Iterator for RawFrames<'_> {
    type Item = RawFrame;

    fn next(&mut self) -> Option<RawFrame> {
        loop {
            let caps = self.matches.next()?;
            let Ok(line) = caps[2].parse::<u32>() else {
                tracing::debug!("skipping frame with unusable line number '{}'", &caps[2]);
                continue;
            };
            return Some(RawFrame {
                file: caps[1].to_string(),
                line,
                function: caps[3].to_string(),
            });
        }
    }
}

/// Split a leading version tag line off a trace.
///
/// When the text before the first newline parses as a dotted version, it is
/// removed and returned. Otherwise the text is returned untouched, so a
/// first line that happens to hold a frame is still scanned. Text with no
/// newline never carries a tag.
pub fn split_version_tag(text: &str) -> (Option<PythonVersion>, &str) {
    let Some(newline) = text.find('\n') else {
        return (None, text);
    };
    match PythonVersion::try_parse(&text[..newline]) {
        Some(version) => (Some(version), &text[newline + 1..]),
        None => (None, text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACE: &str = r#"Traceback (most recent call last):
  File "/work/tests/test_app.py", line 12, in test_save
    model.save()
  File "<frozen importlib._bootstrap>", line 978, in _gcd_import
  File "/work/app/models.py", line 42, in save
    raise ValueError("boom")
ValueError: boom
"#;

    fn frame(file: &str, line: u32, function: &str) -> RawFrame {
        RawFrame {
            file: file.to_string(),
            line,
            function: function.to_string(),
        }
    }

    mod extraction {
        use super::*;

        #[test]
        fn frames_are_yielded_in_text_order() {
            let frames: Vec<RawFrame> = RawFrames::new(TRACE).collect();
            assert_eq!(
                frames,
                vec![
                    frame("/work/tests/test_app.py", 12, "test_save"),
                    frame("<frozen importlib._bootstrap>", 978, "_gcd_import"),
                    frame("/work/app/models.py", 42, "save"),
                ]
            );
        }

        #[test]
        fn text_without_frames_yields_nothing() {
            assert_eq!(RawFrames::new("").count(), 0);
            assert_eq!(RawFrames::new("AssertionError: 1 != 2\n").count(), 0);
        }

        #[test]
        fn module_level_frames_do_not_match() {
            let text = "  File \"run.py\", line 3, in <module>\n";
            assert_eq!(RawFrames::new(text).count(), 0);
        }

        #[test]
        fn oversized_line_number_is_skipped() {
            let text = "\
  File \"a.py\", line 99999999999999999999, in broken
  File \"b.py\", line 7, in fine
";
            let frames: Vec<RawFrame> = RawFrames::new(text).collect();
            assert_eq!(frames, vec![frame("b.py", 7, "fine")]);
        }

        #[test]
        fn windows_paths_and_crlf_line_endings() {
            let text = "  File \"C:\\work\\app.py\", line 5, in run\r\n";
            let frames: Vec<RawFrame> = RawFrames::new(text).collect();
            assert_eq!(frames, vec![frame("C:\\work\\app.py", 5, "run")]);
        }

        #[test]
        fn iteration_is_lazy() {
            let mut frames = RawFrames::new(TRACE);
            assert_eq!(frames.next().map(|f| f.line), Some(12));
            assert_eq!(frames.next().map(|f| f.line), Some(978));
        }
    }

    mod version_tag {
        use super::*;

        #[test]
        fn version_line_is_stripped() {
            let text = "3.11.4\n  File \"a.py\", line 1, in f\n";
            let (version, body) = split_version_tag(text);
            assert_eq!(version, Some(PythonVersion::V { major: 3, minor: 11 }));
            assert_eq!(body, "  File \"a.py\", line 1, in f\n");
        }

        #[test]
        fn crlf_version_line_is_stripped() {
            let (version, body) = split_version_tag("3.8\r\nrest");
            assert_eq!(version, Some(PythonVersion::V3_8));
            assert_eq!(body, "rest");
        }

        #[test]
        fn non_version_first_line_is_kept() {
            let text = "  File \"a.py\", line 1, in f\n  File \"b.py\", line 2, in g\n";
            let (version, body) = split_version_tag(text);
            assert_eq!(version, None);
            assert_eq!(body, text);
            assert_eq!(RawFrames::new(body).count(), 2);
        }

        #[test]
        fn text_without_newline_has_no_tag() {
            assert_eq!(split_version_tag("3.11"), (None, "3.11"));
        }
    }
}
