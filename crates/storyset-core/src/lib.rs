use std::path::{Path, PathBuf};

use serde::Serialize;

pub mod backend;
pub mod config_file;

pub use backend::{BackendError, PlainTextBackend, TextBackend};

/// A source file together with the raw text extracted from it.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub text: String,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Basename of the source path (the full path when it has none).
    pub fn filename(&self) -> String {
        basename(&self.path)
    }
}

/// One entry of the output dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// 0-based position of the source file in enumeration order.
    pub id: usize,
    pub filename: String,
    pub title: String,
    pub body: String,
}

/// Basename of `path` as a display string.
pub fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
