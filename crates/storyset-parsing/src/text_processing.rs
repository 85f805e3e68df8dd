use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::SegmentationConfig;

/// Expand common typographic ligatures found in PDFs.
pub fn expand_ligatures(text: &str) -> String {
    text.replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{FB05}', '\u{FB06}'], "st")
}

/// Rewrite `\r\n` and lone `\r` as `\n`.
///
/// The break-run heuristic only counts `\n`, so Windows-style line endings
/// would otherwise never form a run.
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n?").unwrap());
    RE.replace_all(text, "\n")
}

/// Apply the configured line-ending step only.
pub(crate) fn normalize_lines_with_config<'a>(
    text: &'a str,
    config: &SegmentationConfig,
) -> Cow<'a, str> {
    if config.normalize_line_endings {
        normalize_line_endings(text)
    } else {
        Cow::Borrowed(text)
    }
}

/// Apply the configured ligature step only.
pub(crate) fn expand_with_config(text: &str, config: &SegmentationConfig) -> String {
    if config.expand_ligatures {
        expand_ligatures(text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SegmentationConfigBuilder;

    #[test]
    fn test_expand_ligatures() {
        assert_eq!(expand_ligatures("ﬁnding ﬂow"), "finding flow");
        assert_eq!(expand_ligatures("eﬃcient oﬄine"), "efficient offline");
        assert_eq!(expand_ligatures("no ligatures here"), "no ligatures here");
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\r\n\r\nb\rc"), "a\n\nb\nc");
        assert!(matches!(normalize_line_endings("a\nb"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_normalize_respects_toggles() {
        let config = SegmentationConfigBuilder::new()
            .expand_ligatures(false)
            .normalize_line_endings(false)
            .build()
            .unwrap();
        let lines = normalize_lines_with_config("ﬁ\r\n", &config);
        assert_eq!(expand_with_config(&lines, &config), "ﬁ\r\n");

        let config = SegmentationConfig::default();
        let lines = normalize_lines_with_config("ﬁ\r\n", &config);
        assert_eq!(expand_with_config(&lines, &config), "fi\n");
    }
}
