use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub mod batch;
pub mod enumerate;

// Re-export domain types for convenience
pub use storyset_core::{BackendError, Record, TextBackend};
pub use storyset_parsing::{SegmentationMode, StoryExtractor};
// Re-export batch API
pub use batch::{BatchEvent, BatchOutcome, Unparsed, UnparsedReason, process_batch};
pub use enumerate::enumerate_inputs;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("invalid input pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },
    #[error("unknown extraction strategy: {0} (expected basic, textractor or tika)")]
    UnknownStrategy(String),
    #[cfg(not(feature = "pdf"))]
    #[error("PDF support not compiled in (enable the `pdf` feature of storyset-ingest)")]
    NoPdfSupport,
}

/// Which text extraction collaborator to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExtractionStrategy {
    /// Local PDF decode, run-length title split.
    #[default]
    Basic,
    /// Local PDF decode, first line taken as the title.
    Textractor,
    /// Remote Apache Tika server, file name taken as the title.
    Tika,
}

impl ExtractionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Textractor => "textractor",
            Self::Tika => "tika",
        }
    }

    /// Segmentation mode used when none is configured explicitly.
    pub fn default_mode(&self) -> SegmentationMode {
        match self {
            Self::Basic => SegmentationMode::RunLength,
            Self::Textractor => SegmentationMode::FirstLine,
            Self::Tika => SegmentationMode::Filename,
        }
    }
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionStrategy {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "textractor" => Ok(Self::Textractor),
            "tika" => Ok(Self::Tika),
            other => Err(IngestError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Settings for the remote backend; ignored by the local ones.
#[derive(Debug, Clone)]
pub struct BackendOptions {
    pub tika_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            tika_url: storyset_tika::DEFAULT_ENDPOINT.to_string(),
            timeout: storyset_tika::DEFAULT_TIMEOUT,
            max_retries: storyset_tika::DEFAULT_MAX_RETRIES,
        }
    }
}

/// Construct the backend for `strategy`.
pub fn build_backend(
    strategy: ExtractionStrategy,
    options: &BackendOptions,
) -> Result<Box<dyn TextBackend>, IngestError> {
    match strategy {
        ExtractionStrategy::Basic | ExtractionStrategy::Textractor => local_pdf_backend(),
        ExtractionStrategy::Tika => Ok(Box::new(
            storyset_tika::TikaBackend::new(options.tika_url.clone())
                .with_timeout(options.timeout)
                .with_max_retries(options.max_retries),
        )),
    }
}

#[cfg(feature = "pdf")]
fn local_pdf_backend() -> Result<Box<dyn TextBackend>, IngestError> {
    Ok(Box::new(storyset_pdf_mupdf::MupdfBackend::new()))
}

#[cfg(not(feature = "pdf"))]
fn local_pdf_backend() -> Result<Box<dyn TextBackend>, IngestError> {
    Err(IngestError::NoPdfSupport)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_from_str() {
        assert_eq!(
            "TIKA".parse::<ExtractionStrategy>().unwrap(),
            ExtractionStrategy::Tika
        );
        assert!(matches!(
            "ocr".parse::<ExtractionStrategy>(),
            Err(IngestError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn strategy_default_modes() {
        assert_eq!(
            ExtractionStrategy::Basic.default_mode(),
            SegmentationMode::RunLength
        );
        assert_eq!(
            ExtractionStrategy::Textractor.default_mode(),
            SegmentationMode::FirstLine
        );
        assert_eq!(
            ExtractionStrategy::Tika.default_mode(),
            SegmentationMode::Filename
        );
    }

    #[test]
    fn tika_backend_is_named() {
        let backend =
            build_backend(ExtractionStrategy::Tika, &BackendOptions::default()).unwrap();
        assert_eq!(backend.name(), "tika");
    }
}
