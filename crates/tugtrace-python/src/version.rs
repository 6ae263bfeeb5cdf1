//! Python version tags for version-aware parsing.
//!
//! A trace handed to [`crate::parse_stack_frames`] may start with a line
//! naming the interpreter version that produced it (e.g. `3.11.4`). This
//! module maps that tag to a [`PythonVersion`] and bundles it with other
//! parser settings in [`ParseOptions`].
//!
//! Version validation is deferred: the scope parser accepts every syntax it
//! understands regardless of the selected version. The version is threaded
//! through so a stricter parser can be plugged in without API changes.

/// Target Python language version for parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PythonVersion {
    /// Unknown version: accept all syntax the parser handles.
    #[default]
    Permissive,

    /// A specific language version (e.g., 3.11).
    V {
        /// Major version number.
        major: u8,
        /// Minor version number.
        minor: u8,
    },
}

impl PythonVersion {
    /// Python 2.7 - last of the 2.x line.
    pub const V2_7: Self = Self::V { major: 2, minor: 7 };

    /// Python 3.8 - walrus operator.
    pub const V3_8: Self = Self::V { major: 3, minor: 8 };

    /// Python 3.10 - match statements.
    pub const V3_10: Self = Self::V {
        major: 3,
        minor: 10,
    };

    /// Python 3.12 - type parameter syntax.
    pub const V3_12: Self = Self::V {
        major: 3,
        minor: 12,
    };

    /// Parse a dotted version string such as `3.11` or `3.11.4`.
    ///
    /// Accepts two to four dot-separated components made only of ASCII
    /// digits, with surrounding whitespace ignored (a trace read on Windows
    /// leaves a `\r` on the tag line). Patch and build components are
    /// validated but discarded. Returns `None` for anything else, including
    /// major or minor components that do not fit in a `u8`.
    ///
    /// # Example
    ///
    /// ```
    /// use tugtrace_python::PythonVersion;
    ///
    /// assert_eq!(PythonVersion::try_parse("3.12.1"), Some(PythonVersion::V3_12));
    /// assert_eq!(PythonVersion::try_parse("Traceback (most recent call last):"), None);
    /// ```
    pub fn try_parse(s: &str) -> Option<Self> {
        let components: Vec<&str> = s.trim().split('.').collect();
        if !(2..=4).contains(&components.len()) {
            return None;
        }

        let mut numbers = Vec::with_capacity(components.len());
        for component in components {
            if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            numbers.push(component.parse::<u32>().ok()?);
        }

        let major = u8::try_from(numbers[0]).ok()?;
        let minor = u8::try_from(numbers[1]).ok()?;
        Some(Self::V { major, minor })
    }
}

impl std::fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Permissive => write!(f, "permissive"),
            Self::V { major, minor } => write!(f, "{}.{}", major, minor),
        }
    }
}

/// Configuration options for parsing Python source code.
///
/// Use [`ParseOptions::default()`] for permissive parsing, or
/// [`ParseOptions::new()`] to carry a target Python version.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseOptions {
    /// Target Python version for parsing.
    pub version: PythonVersion,

    /// Optional encoding override for the source bytes.
    ///
    /// When unset, the PEP 263 coding declaration in the first two lines
    /// decides, falling back to UTF-8.
    pub encoding: Option<String>,
}

impl ParseOptions {
    /// Creates parse options targeting a specific Python version.
    #[must_use]
    pub fn new(version: PythonVersion) -> Self {
        Self {
            version,
            encoding: None,
        }
    }

    /// Returns the encoding as a string slice, if set.
    #[must_use]
    pub fn encoding_str(&self) -> Option<&str> {
        self.encoding.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_parse_major_minor() {
        assert_eq!(PythonVersion::try_parse("3.8"), Some(PythonVersion::V3_8));
        assert_eq!(PythonVersion::try_parse("2.7"), Some(PythonVersion::V2_7));
    }

    #[test]
    fn test_try_parse_discards_patch_and_build() {
        assert_eq!(PythonVersion::try_parse("3.10.12"), Some(PythonVersion::V3_10));
        assert_eq!(PythonVersion::try_parse("3.10.12.0"), Some(PythonVersion::V3_10));
    }

    #[test]
    fn test_try_parse_trims_whitespace_and_carriage_return() {
        assert_eq!(PythonVersion::try_parse(" 3.12\r"), Some(PythonVersion::V3_12));
    }

    #[test]
    fn test_try_parse_rejects_non_versions() {
        assert_eq!(PythonVersion::try_parse(""), None);
        assert_eq!(PythonVersion::try_parse("3"), None);
        assert_eq!(PythonVersion::try_parse("3.10.1.2.3"), None);
        assert_eq!(PythonVersion::try_parse("3..1"), None);
        assert_eq!(PythonVersion::try_parse("3.x"), None);
        assert_eq!(PythonVersion::try_parse("+3.10"), None);
        assert_eq!(PythonVersion::try_parse("Traceback (most recent call last):"), None);
    }

    #[test]
    fn test_try_parse_rejects_oversized_components() {
        assert_eq!(PythonVersion::try_parse("300.1"), None);
        assert_eq!(PythonVersion::try_parse("3.1000"), None);
        assert_eq!(PythonVersion::try_parse("3.1.99999999999"), None);
    }

    #[test]
    fn test_version_display() {
        assert_eq!(PythonVersion::Permissive.to_string(), "permissive");
        assert_eq!(PythonVersion::V3_8.to_string(), "3.8");
        assert_eq!(PythonVersion::V3_10.to_string(), "3.10");
    }

    #[test]
    fn test_version_default() {
        assert_eq!(PythonVersion::default(), PythonVersion::Permissive);
    }

    #[test]
    fn test_parse_options_encoding() {
        let options = ParseOptions {
            encoding: Some("latin-1".to_string()),
            ..ParseOptions::new(PythonVersion::V3_10)
        };
        assert_eq!(options.version, PythonVersion::V3_10);
        assert_eq!(options.encoding_str(), Some("latin-1"));
        assert_eq!(ParseOptions::default().encoding_str(), None);
    }
}
