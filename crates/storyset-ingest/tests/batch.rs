//! Batch orchestration over real files with in-process backends.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use storyset_core::{BackendError, PlainTextBackend, TextBackend};
use storyset_ingest::{
    BatchEvent, SegmentationMode, StoryExtractor, UnparsedReason, enumerate_inputs, process_batch,
};
use storyset_parsing::{SegmentationConfigBuilder, SegmentationFailure};

/// Plain decode, except that files whose name contains "corrupt" fail with
/// no content like an extraction service would.
struct FlakyBackend;

impl TextBackend for FlakyBackend {
    fn name(&self) -> &str {
        "flaky"
    }

    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        if path.to_string_lossy().contains("corrupt") {
            return Err(BackendError::NoContent);
        }
        PlainTextBackend.extract_text(path)
    }
}

fn fixture_dir(files: &[(&str, &str)]) -> (tempfile::TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().unwrap();
    for (name, contents) in files {
        std::fs::write(dir.path().join(name), contents).unwrap();
    }
    let pattern = format!("{}/*.txt", dir.path().display());
    let paths = enumerate_inputs(&pattern).unwrap();
    (dir, paths)
}

#[test]
fn mixed_batch_keeps_going_and_reports_unparsed() {
    let (_dir, paths) = fixture_dir(&[
        ("a.txt", "Title Line\n\n\nBody line 1\nBody line 2"),
        ("b.txt", "OnlyOneLineNoBreaks"),
        ("c-corrupt.txt", "Never read\n\n\nBody"),
        ("d.txt", "Last Story\n\nThe end."),
    ]);

    let outcome = process_batch(
        &paths,
        &FlakyBackend,
        &StoryExtractor::new(),
        SegmentationMode::RunLength,
        |_| {},
    );

    assert_eq!(outcome.total(), 4);
    assert_eq!(outcome.records.len(), 2);

    let first = &outcome.records[0];
    assert_eq!(first.id, 0);
    assert_eq!(first.filename, "a.txt");
    assert_eq!(first.title, "Title Line");
    assert_eq!(first.body, "Body line 1\nBody line 2");

    // Ids follow enumeration order, so the gaps from skipped files remain.
    let last = &outcome.records[1];
    assert_eq!(last.id, 3);
    assert_eq!(last.filename, "d.txt");
    assert_eq!(last.title, "Last Story");

    assert_eq!(outcome.unparsed_filenames(), vec!["b.txt", "c-corrupt.txt"]);
    assert!(matches!(
        outcome.unparsed[0].reason,
        UnparsedReason::Segmentation(SegmentationFailure::NoSplitPoint)
    ));
    assert!(matches!(
        outcome.unparsed[1].reason,
        UnparsedReason::Extraction(BackendError::NoContent)
    ));
}

#[test]
fn events_arrive_in_order() {
    let (_dir, paths) = fixture_dir(&[("a.txt", "T\n\nB"), ("b.txt", "nothing")]);

    let mut log = Vec::new();
    process_batch(
        &paths,
        &PlainTextBackend,
        &StoryExtractor::new(),
        SegmentationMode::RunLength,
        |event| {
            log.push(match event {
                BatchEvent::Started { index, total, .. } => format!("start {index}/{total}"),
                BatchEvent::Parsed { index, story, .. } => {
                    format!("parsed {index} {}", story.record.title)
                }
                BatchEvent::Skipped { index, unparsed, .. } => {
                    format!("skipped {index} {}", unparsed.filename)
                }
            })
        },
    );

    assert_eq!(
        log,
        vec!["start 0/2", "parsed 0 T", "start 1/2", "skipped 1 b.txt"]
    );
}

#[test]
fn low_confidence_splits_are_counted() {
    let (_dir, paths) = fixture_dir(&[
        ("a.txt", "single\nbreaks\nonly"),
        ("b.txt", "Title\n\n\nBody"),
    ]);

    let outcome = process_batch(
        &paths,
        &PlainTextBackend,
        &StoryExtractor::new(),
        SegmentationMode::RunLength,
        |_| {},
    );
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.low_confidence, 1);
    assert_eq!(outcome.records[0].title, "single");
}

#[test]
fn strict_extractor_moves_low_confidence_to_unparsed() {
    let (_dir, paths) = fixture_dir(&[("a.txt", "single\nbreaks\nonly")]);
    let config = SegmentationConfigBuilder::new()
        .reject_low_confidence(true)
        .build()
        .unwrap();

    let outcome = process_batch(
        &paths,
        &PlainTextBackend,
        &StoryExtractor::with_config(config),
        SegmentationMode::RunLength,
        |_| {},
    );
    assert!(outcome.records.is_empty());
    assert!(matches!(
        outcome.unparsed[0].reason,
        UnparsedReason::Segmentation(SegmentationFailure::LowConfidenceRejected)
    ));
}

#[test]
fn filename_mode_never_fails_segmentation() {
    let (_dir, paths) = fixture_dir(&[("x.txt", "OnlyOneLineNoBreaks"), ("y.txt", "")]);

    let outcome = process_batch(
        &paths,
        &PlainTextBackend,
        &StoryExtractor::new(),
        SegmentationMode::Filename,
        |_| {},
    );
    assert!(outcome.unparsed.is_empty());
    assert_eq!(outcome.records[0].title, "x.txt");
    assert_eq!(outcome.records[0].body, "OnlyOneLineNoBreaks");
    assert_eq!(outcome.records[1].body, "");
}

#[test]
fn missing_file_is_extraction_failure() {
    let paths = vec![PathBuf::from("/nonexistent/storyset/ghost.pdf")];
    let outcome = process_batch(
        &paths,
        &PlainTextBackend,
        &StoryExtractor::new(),
        SegmentationMode::RunLength,
        |_| {},
    );
    assert_eq!(outcome.unparsed_filenames(), vec!["ghost.pdf"]);
    assert!(matches!(
        outcome.unparsed[0].reason,
        UnparsedReason::Extraction(BackendError::Io(_))
    ));
}

#[test]
fn control_characters_are_stripped_from_filename() {
    let (_dir, paths) = fixture_dir(&[("bad\u{1}name.txt", "T\n\n\nB")]);

    let outcome = process_batch(
        &paths,
        &PlainTextBackend,
        &StoryExtractor::new(),
        SegmentationMode::RunLength,
        |_| {},
    );
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].filename, "badname.txt");
    assert!(!outcome.records[0].filename.contains('\u{1}'));
}

/// Collects formatted log output in memory.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn skipped_files_stay_below_warn_level() {
    let (_dir, paths) = fixture_dir(&[("a.txt", "OnlyOneLineNoBreaks"), ("b.txt", "T\n\nB")]);

    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let outcome = tracing::subscriber::with_default(subscriber, || {
        process_batch(
            &paths,
            &PlainTextBackend,
            &StoryExtractor::new(),
            SegmentationMode::RunLength,
            |_| {},
        )
    });

    assert_eq!(outcome.unparsed_filenames(), vec!["a.txt"]);
    let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(!text.contains("a.txt"), "unexpected log output: {text}");
}
