use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::config::SegmentationConfig;
use crate::{ParsingError, SegmentationFailure};

/// How a document's text is divided into title and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SegmentationMode {
    /// Split at the first run of line breaks as wide as the widest run near the top.
    #[default]
    RunLength,
    /// Use the file name as title and the whole text as body.
    Filename,
    /// First non-blank line is the title, remaining non-blank lines the body.
    FirstLine,
}

impl SegmentationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RunLength => "run-length",
            Self::Filename => "filename",
            Self::FirstLine => "first-line",
        }
    }
}

impl fmt::Display for SegmentationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SegmentationMode {
    type Err = ParsingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "run-length" | "runlength" | "run_length" => Ok(Self::RunLength),
            "filename" => Ok(Self::Filename),
            "first-line" | "firstline" | "first_line" => Ok(Self::FirstLine),
            other => Err(ParsingError::UnknownMode(other.to_string())),
        }
    }
}

/// How much the split can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    Confident,
    /// The run-length search degenerated to a single line break.
    LowConfidence,
}

/// A document's text divided into title and body (unsanitized).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    pub mode: SegmentationMode,
    pub title: String,
    pub body: String,
    /// Line-break run length the split was made at (run-length mode only).
    pub run_length: Option<usize>,
    pub confidence: Confidence,
}

impl Segmentation {
    pub fn is_low_confidence(&self) -> bool {
        self.confidence == Confidence::LowConfidence
    }
}

/// Widest line-break run in the first `window` characters of `text`.
///
/// A run closed by a non-break counts its full length; a run still open at
/// the end of the window counts one less. The result is never below 1.
pub fn measure_break_run(text: &str, window: usize) -> usize {
    let prefix: Vec<char> = text.chars().take(window).collect();

    let mut count = 0;
    let mut max_count = 0;
    for pair in prefix.windows(2) {
        match (pair[0] == '\n', pair[1] == '\n') {
            (true, true) => count += 1,
            (true, false) => {
                max_count = max_count.max(count + 1);
                count = 0;
            }
            _ => {}
        }
    }

    max_count.max(count).max(1)
}

/// Split `text` before the earliest run of at least `min_run` line breaks.
///
/// The whole run is consumed; the title is everything before it and the body
/// everything after it. Returns `None` when no such run exists.
pub fn split_at_break_run(text: &str, min_run: usize) -> Option<(String, String)> {
    let min_run = min_run.max(1);
    let re = Regex::new(&format!(r"(?s)\A(.*?)\n{{{min_run},}}(.*)\z")).ok()?;
    let caps = re.captures(text)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Segment `text` with the run-length heuristic and default configuration.
///
/// Returns `None` when no split point exists.
pub fn segment(text: &str) -> Option<Segmentation> {
    segment_run_length_with_config(text, &SegmentationConfig::default()).ok()
}

/// Config-aware version of [`segment`].
pub(crate) fn segment_run_length_with_config(
    text: &str,
    config: &SegmentationConfig,
) -> Result<Segmentation, SegmentationFailure> {
    let run_length = measure_break_run(text, config.title_window);
    segment_at_run_length(text, run_length, config)
}

/// Split `text` at a run length measured beforehand.
pub(crate) fn segment_at_run_length(
    text: &str,
    run_length: usize,
    config: &SegmentationConfig,
) -> Result<Segmentation, SegmentationFailure> {
    let (title, body) =
        split_at_break_run(text, run_length).ok_or(SegmentationFailure::NoSplitPoint)?;

    let confidence = if run_length == 1 {
        Confidence::LowConfidence
    } else {
        Confidence::Confident
    };
    if confidence == Confidence::LowConfidence && config.reject_low_confidence {
        return Err(SegmentationFailure::LowConfidenceRejected);
    }

    Ok(Segmentation {
        mode: SegmentationMode::RunLength,
        title,
        body,
        run_length: Some(run_length),
        confidence,
    })
}

/// Title is `filename`, body is the entire text. Never fails.
pub fn segment_filename(filename: &str, text: &str) -> Segmentation {
    Segmentation {
        mode: SegmentationMode::Filename,
        title: filename.to_string(),
        body: text.to_string(),
        run_length: None,
        confidence: Confidence::Confident,
    }
}

/// Title is the first non-blank line; body joins the remaining non-blank lines.
pub fn segment_first_line(text: &str) -> Option<Segmentation> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let title = lines.next()?.trim().to_string();
    let body = lines.collect::<Vec<_>>().join("\n");

    Some(Segmentation {
        mode: SegmentationMode::FirstLine,
        title,
        body,
        run_length: None,
        confidence: Confidence::Confident,
    })
}
