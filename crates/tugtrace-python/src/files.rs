//! Source file access.
//!
//! The frame assembler needs two things from the filesystem: whether a
//! traced file exists, and its bytes. [`SourceFiles`] abstracts both so the
//! pipeline can run against the real disk ([`DiskFiles`]) or against
//! contents the caller already holds ([`MemoryFiles`]).

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tugtrace_core::error::TraceError;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for file operations.
#[derive(Debug, Error)]
pub enum FileError {
    /// File not found.
    #[error("file not found: {path}")]
    NotFound { path: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for file operations.
pub type FileResult<T> = Result<T, FileError>;

impl From<FileError> for TraceError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::NotFound { path } => TraceError::FileNotFound { path },
            FileError::Io(io_err) => TraceError::InternalError {
                message: format!("IO error: {}", io_err),
            },
        }
    }
}

// ============================================================================
// File Access Capability
// ============================================================================

/// Read access to the source files named in a trace.
pub trait SourceFiles {
    /// Whether `path` names an existing regular file.
    fn exists(&self, path: &Path) -> bool;

    /// Read the full contents of `path`.
    ///
    /// Any handle opened is released before returning, on success or error.
    fn read_bytes(&self, path: &Path) -> FileResult<Vec<u8>>;
}

impl<T: SourceFiles + ?Sized> SourceFiles for &T {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn read_bytes(&self, path: &Path) -> FileResult<Vec<u8>> {
        (**self).read_bytes(path)
    }
}

/// [`SourceFiles`] over the process filesystem.
///
/// Relative paths resolve against the current working directory, which is
/// how the interpreter printed them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFiles;

impl SourceFiles for DiskFiles {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_bytes(&self, path: &Path) -> FileResult<Vec<u8>> {
        fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FileError::NotFound {
                path: path.display().to_string(),
            },
            _ => FileError::Io(e),
        })
    }
}

/// [`SourceFiles`] over an in-memory map of path to contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryFiles {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryFiles {
    /// Create an empty set of files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }

    /// Builder form of [`MemoryFiles::insert`].
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }
}

impl SourceFiles for MemoryFiles {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read_bytes(&self, path: &Path) -> FileResult<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| FileError::NotFound {
                path: path.display().to_string(),
            })
    }
}

// ============================================================================
// Tests
// ============================================================================
