use thiserror::Error;

pub mod config;
pub mod extractor;
pub mod sanitize;
pub mod segment;
pub mod text_processing;

pub use config::{ConfigError, DEFAULT_TITLE_WINDOW, SegmentationConfig, SegmentationConfigBuilder};
pub use extractor::{ParsedStory, StoryExtractor};
pub use sanitize::{sanitize, sanitize_with_extra};
pub use segment::{
    Confidence, Segmentation, SegmentationMode, measure_break_run, segment, split_at_break_run,
};
// Re-export domain types from core (canonical definitions live there)
pub use storyset_core::{BackendError, Document, Record, TextBackend};

/// Why a document's text could not be divided into title and body.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentationFailure {
    #[error("no title/body split point found")]
    NoSplitPoint,
    #[error("only a single-line-break split was found and low-confidence splits are rejected")]
    LowConfidenceRejected,
}

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Segmentation(#[from] SegmentationFailure),
    #[error("unknown segmentation mode: {0}")]
    UnknownMode(String),
}
