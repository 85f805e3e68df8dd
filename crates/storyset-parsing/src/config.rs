use thiserror::Error;

/// Number of leading characters inspected to find the title separator.
pub const DEFAULT_TITLE_WINDOW: usize = 150;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("title window must be at least 1 character")]
    EmptyTitleWindow,
}

/// Configuration for the title/body segmentation pipeline.
///
/// Use [`SegmentationConfigBuilder`] to construct a validated instance.
#[derive(Debug, Clone)]
pub struct SegmentationConfig {
    /// How many leading characters the break-run scan looks at (default: 150).
    pub(crate) title_window: usize,
    /// Treat a split found with a run length of 1 as a failure (default: false).
    pub(crate) reject_low_confidence: bool,
    /// Expand ﬁ/ﬂ style ligatures before segmenting (default: true).
    pub(crate) expand_ligatures: bool,
    /// Rewrite CRLF and CR as LF before segmenting (default: true).
    pub(crate) normalize_line_endings: bool,
    /// Characters stripped from title and body on top of XML-illegal controls.
    pub(crate) strip_chars: String,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            title_window: DEFAULT_TITLE_WINDOW,
            reject_low_confidence: false,
            expand_ligatures: true,
            normalize_line_endings: true,
            strip_chars: String::new(),
        }
    }
}

impl SegmentationConfig {
    pub fn title_window(&self) -> usize {
        self.title_window
    }

    pub fn reject_low_confidence(&self) -> bool {
        self.reject_low_confidence
    }

    pub fn normalize_line_endings(&self) -> bool {
        self.normalize_line_endings
    }

    pub fn strip_chars(&self) -> &str {
        &self.strip_chars
    }
}

/// Builder for [`SegmentationConfig`].
///
/// Unset fields fall back to the defaults; [`build()`](Self::build) rejects
/// values the segmenter cannot work with.
#[derive(Debug, Clone, Default)]
pub struct SegmentationConfigBuilder {
    title_window: Option<usize>,
    reject_low_confidence: Option<bool>,
    expand_ligatures: Option<bool>,
    normalize_line_endings: Option<bool>,
    strip_chars: Option<String>,
}

impl SegmentationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title_window(mut self, chars: usize) -> Self {
        self.title_window = Some(chars);
        self
    }

    pub fn reject_low_confidence(mut self, reject: bool) -> Self {
        self.reject_low_confidence = Some(reject);
        self
    }

    pub fn expand_ligatures(mut self, expand: bool) -> Self {
        self.expand_ligatures = Some(expand);
        self
    }

    pub fn normalize_line_endings(mut self, normalize: bool) -> Self {
        self.normalize_line_endings = Some(normalize);
        self
    }

    pub fn strip_chars(mut self, chars: impl Into<String>) -> Self {
        self.strip_chars = Some(chars.into());
        self
    }

    pub fn add_strip_char(mut self, c: char) -> Self {
        self.strip_chars.get_or_insert_with(String::new).push(c);
        self
    }

    pub fn build(self) -> Result<SegmentationConfig, ConfigError> {
        let defaults = SegmentationConfig::default();
        let title_window = self.title_window.unwrap_or(defaults.title_window);
        if title_window == 0 {
            return Err(ConfigError::EmptyTitleWindow);
        }

        Ok(SegmentationConfig {
            title_window,
            reject_low_confidence: self
                .reject_low_confidence
                .unwrap_or(defaults.reject_low_confidence),
            expand_ligatures: self.expand_ligatures.unwrap_or(defaults.expand_ligatures),
            normalize_line_endings: self
                .normalize_line_endings
                .unwrap_or(defaults.normalize_line_endings),
            strip_chars: self.strip_chars.unwrap_or(defaults.strip_chars),
        })
    }
}
