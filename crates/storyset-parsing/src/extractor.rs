use std::path::Path;

use storyset_core::{Document, Record, TextBackend};

use crate::config::SegmentationConfig;
use crate::segment::{self, Segmentation, SegmentationMode};
use crate::{ParsingError, SegmentationFailure, sanitize, text_processing};

/// A record together with how its title/body split was obtained.
#[derive(Debug, Clone)]
pub struct ParsedStory {
    pub record: Record,
    pub mode: SegmentationMode,
    pub run_length: Option<usize>,
    pub low_confidence: bool,
}

/// A configurable story extraction pipeline.
///
/// Holds a [`SegmentationConfig`] and exposes each pipeline step as a method.
/// The default constructor uses built-in defaults; use
/// [`StoryExtractor::with_config`] to change the window or strictness.
#[derive(Debug, Clone, Default)]
pub struct StoryExtractor {
    config: SegmentationConfig,
}

impl StoryExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self {
            config: SegmentationConfig::default(),
        }
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(config: SegmentationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Read raw text through `backend`.
    pub fn extract_document(
        &self,
        path: &Path,
        backend: &dyn TextBackend,
    ) -> Result<Document, ParsingError> {
        let text = backend.extract_text(path)?;
        Ok(Document::new(path, text))
    }

    /// Divide already-normalized text into title and body.
    pub fn segment(
        &self,
        doc: &Document,
        mode: SegmentationMode,
    ) -> Result<Segmentation, SegmentationFailure> {
        match mode {
            SegmentationMode::RunLength => {
                segment::segment_run_length_with_config(&doc.text, &self.config)
            }
            SegmentationMode::Filename => Ok(segment::segment_filename(&doc.filename(), &doc.text)),
            SegmentationMode::FirstLine => {
                segment::segment_first_line(&doc.text).ok_or(SegmentationFailure::NoSplitPoint)
            }
        }
    }

    /// Strip XML-illegal and configured extra characters.
    pub fn sanitize(&self, text: &str) -> String {
        sanitize::sanitize_with_extra(text, &self.config.strip_chars)
    }

    /// Normalize, segment and sanitize an extracted document into its record.
    pub fn build_story(
        &self,
        id: usize,
        doc: &Document,
        mode: SegmentationMode,
    ) -> Result<ParsedStory, SegmentationFailure> {
        let lines = text_processing::normalize_lines_with_config(&doc.text, &self.config);
        let normalized = Document::new(
            doc.path.clone(),
            text_processing::expand_with_config(&lines, &self.config),
        );
        // The title window counts extracted characters, before ligatures grow the text.
        let seg = match mode {
            SegmentationMode::RunLength => {
                let run_length = segment::measure_break_run(&lines, self.config.title_window);
                segment::segment_at_run_length(&normalized.text, run_length, &self.config)?
            }
            _ => self.segment(&normalized, mode)?,
        };

        if seg.is_low_confidence() {
            tracing::warn!(
                path = %doc.path.display(),
                title = %seg.title,
                "split at a single line break; title may be only the first line"
            );
        } else {
            tracing::debug!(
                path = %doc.path.display(),
                mode = %mode,
                run_length = ?seg.run_length,
                "segmented"
            );
        }

        Ok(ParsedStory {
            record: Record {
                id,
                filename: self.sanitize(&doc.filename()),
                title: self.sanitize(&seg.title),
                body: self.sanitize(&seg.body),
            },
            mode,
            run_length: seg.run_length,
            low_confidence: seg.is_low_confidence(),
        })
    }

    /// Full pipeline for one file: extract, normalize, segment, sanitize.
    pub fn extract_story(
        &self,
        id: usize,
        path: &Path,
        backend: &dyn TextBackend,
        mode: SegmentationMode,
    ) -> Result<ParsedStory, ParsingError> {
        let doc = self.extract_document(path, backend)?;
        Ok(self.build_story(id, &doc, mode)?)
    }
}
