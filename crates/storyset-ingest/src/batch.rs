use std::fmt;
use std::path::{Path, PathBuf};

use storyset_core::{BackendError, Document, Record, TextBackend, basename};
use storyset_parsing::{ParsedStory, SegmentationFailure, SegmentationMode, StoryExtractor};

/// Why a file produced no record.
#[derive(Debug)]
pub enum UnparsedReason {
    Extraction(BackendError),
    Segmentation(SegmentationFailure),
}

impl fmt::Display for UnparsedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extraction(e) => write!(f, "extraction failed: {}", e),
            Self::Segmentation(e) => write!(f, "segmentation failed: {}", e),
        }
    }
}

/// A file that could not be turned into a record.
#[derive(Debug)]
pub struct Unparsed {
    pub index: usize,
    pub path: PathBuf,
    pub filename: String,
    pub reason: UnparsedReason,
}

/// Everything one batch run produced.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Records in enumeration order.
    pub records: Vec<Record>,
    pub unparsed: Vec<Unparsed>,
    /// Records whose split fell back to a single line break.
    pub low_confidence: usize,
}

impl BatchOutcome {
    pub fn total(&self) -> usize {
        self.records.len() + self.unparsed.len()
    }

    /// Basenames of the files that produced no record.
    pub fn unparsed_filenames(&self) -> Vec<&str> {
        self.unparsed.iter().map(|u| u.filename.as_str()).collect()
    }
}

/// Progress notification emitted while a batch runs.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    Started {
        index: usize,
        total: usize,
        path: &'a Path,
    },
    Parsed {
        index: usize,
        total: usize,
        story: &'a ParsedStory,
    },
    Skipped {
        index: usize,
        total: usize,
        unparsed: &'a Unparsed,
    },
}

/// Turn every path into a record, in order.
///
/// The record id is the path's position in `paths`, so it does not depend on
/// which other files fail. Failures are reported through `on_event` and
/// collected in [`BatchOutcome::unparsed`]; they never stop the batch.
pub fn process_batch(
    paths: &[PathBuf],
    backend: &dyn TextBackend,
    extractor: &StoryExtractor,
    mode: SegmentationMode,
    mut on_event: impl FnMut(BatchEvent<'_>),
) -> BatchOutcome {
    let total = paths.len();
    let mut outcome = BatchOutcome::default();

    for (index, path) in paths.iter().enumerate() {
        on_event(BatchEvent::Started { index, total, path });

        let result = backend
            .extract_text(path)
            .map_err(UnparsedReason::Extraction)
            .and_then(|text| {
                let doc = Document::new(path.clone(), text);
                extractor
                    .build_story(index, &doc, mode)
                    .map_err(UnparsedReason::Segmentation)
            });

        match result {
            Ok(story) => {
                if story.low_confidence {
                    outcome.low_confidence += 1;
                }
                on_event(BatchEvent::Parsed {
                    index,
                    total,
                    story: &story,
                });
                outcome.records.push(story.record);
            }
            Err(reason) => {
                tracing::debug!(
                    path = %path.display(),
                    backend = backend.name(),
                    reason = %reason,
                    "skipping unparsed file"
                );
                let unparsed = Unparsed {
                    index,
                    path: path.clone(),
                    filename: basename(path),
                    reason,
                };
                on_event(BatchEvent::Skipped {
                    index,
                    total,
                    unparsed: &unparsed,
                });
                outcome.unparsed.push(unparsed);
            }
        }
    }

    tracing::info!(
        total,
        records = outcome.records.len(),
        unparsed = outcome.unparsed.len(),
        low_confidence = outcome.low_confidence,
        "batch complete"
    );
    outcome
}
