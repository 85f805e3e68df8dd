use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("extraction returned no content")]
    NoContent,
    #[error("extraction service returned HTTP {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("extraction service unreachable: {0}")]
    Http(String),
    #[error("text is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for text extraction backends.
///
/// Implementors turn a file into raw decoded text; segmentation into title
/// and body lives in `storyset_parsing::StoryExtractor`.
pub trait TextBackend: Send + Sync {
    /// Short identifier used in logs and the CLI summary.
    fn name(&self) -> &str;

    /// Extract the full text content of a file.
    fn extract_text(&self, path: &Path) -> Result<String, BackendError>;
}

/// Reads the file and decodes it as UTF-8 without any PDF handling.
///
/// Useful for pre-extracted `.txt` dumps and for exercising the pipeline
/// without a PDF library.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextBackend;

impl TextBackend for PlainTextBackend {
    fn name(&self) -> &str {
        "plain"
    }

    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn plain_backend_decodes_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all("Título\n\n\nCuerpo".as_bytes()).unwrap();

        let text = PlainTextBackend.extract_text(file.path()).unwrap();
        assert_eq!(text, "Título\n\n\nCuerpo");
    }

    #[test]
    fn plain_backend_rejects_invalid_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0x66, 0x6f, 0xff, 0xfe]).unwrap();

        let err = PlainTextBackend.extract_text(file.path()).unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[test]
    fn plain_backend_missing_file_is_io_error() {
        let err = PlainTextBackend
            .extract_text(Path::new("/nonexistent/storyset/missing.pdf"))
            .unwrap_err();
        assert!(matches!(err, BackendError::Io(_)));
    }
}
