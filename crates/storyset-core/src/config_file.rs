use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub extraction: Option<ExtractionConfig>,
    pub segmentation: Option<SegmentationSection>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// `basic`, `textractor` or `tika`.
    pub strategy: Option<String>,
    pub tika_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentationSection {
    /// `run-length`, `filename` or `first-line`.
    pub mode: Option<String>,
    pub title_window: Option<usize>,
    pub reject_low_confidence: Option<bool>,
    pub expand_ligatures: Option<bool>,
    /// Rewrite `\r\n` and lone `\r` as `\n` before counting line breaks.
    pub normalize_line_endings: Option<bool>,
    /// Extra characters removed from title and body on top of XML-illegal ones.
    pub strip_chars: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: Option<String>,
    /// `xml` or `json`.
    pub format: Option<String>,
    pub unparsed_log: Option<String>,
}

/// Platform config directory path: `<config_dir>/storyset/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("storyset").join("config.toml"))
}

/// Load config by cascading CWD `.storyset.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".storyset.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

fn pick<S, T>(
    overlay: &Option<S>,
    base: &Option<S>,
    field: impl Fn(&S) -> Option<T>,
) -> Option<T> {
    overlay
        .as_ref()
        .and_then(&field)
        .or_else(|| base.as_ref().and_then(&field))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let (be, oe) = (&base.extraction, &overlay.extraction);
    let (bs, os) = (&base.segmentation, &overlay.segmentation);
    let (bo, oo) = (&base.output, &overlay.output);

    ConfigFile {
        extraction: Some(ExtractionConfig {
            strategy: pick(oe, be, |e| e.strategy.clone()),
            tika_url: pick(oe, be, |e| e.tika_url.clone()),
            timeout_secs: pick(oe, be, |e| e.timeout_secs),
            max_retries: pick(oe, be, |e| e.max_retries),
        }),
        segmentation: Some(SegmentationSection {
            mode: pick(os, bs, |s| s.mode.clone()),
            title_window: pick(os, bs, |s| s.title_window),
            reject_low_confidence: pick(os, bs, |s| s.reject_low_confidence),
            expand_ligatures: pick(os, bs, |s| s.expand_ligatures),
            normalize_line_endings: pick(os, bs, |s| s.normalize_line_endings),
            strip_chars: pick(os, bs, |s| s.strip_chars.clone()),
        }),
        output: Some(OutputConfig {
            path: pick(oo, bo, |o| o.path.clone()),
            format: pick(oo, bo, |o| o.format.clone()),
            unparsed_log: pick(oo, bo, |o| o.unparsed_log.clone()),
        }),
    }
}
