use std::path::{Path, PathBuf};

use crate::IngestError;

/// Extension used when the input names a directory rather than a pattern.
pub const DEFAULT_EXTENSION: &str = "pdf";

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(pattern: &str) -> String {
    let rest = match pattern.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return pattern.to_string(),
    };
    match dirs::home_dir() {
        Some(home) => format!("{}{}", home.display(), rest),
        None => pattern.to_string(),
    }
}

/// Resolve `input` into the glob pattern that will be matched.
///
/// A directory becomes `<dir>/*.pdf`; anything else is used as a pattern.
pub fn resolve_pattern(input: &str) -> String {
    let expanded = expand_tilde(input);
    let path = Path::new(&expanded);
    if path.is_dir() {
        let escaped = glob::Pattern::escape(&expanded);
        format!("{}/*.{}", escaped.trim_end_matches('/'), DEFAULT_EXTENSION)
    } else {
        expanded
    }
}

/// Expand a path pattern (or directory) into a sorted list of files.
///
/// Entries that cannot be read are logged and skipped; an invalid pattern is
/// an error. No matches yields an empty list.
pub fn enumerate_inputs(input: &str) -> Result<Vec<PathBuf>, IngestError> {
    let pattern = resolve_pattern(input);
    tracing::debug!(input, pattern = %pattern, "enumerating inputs");

    let entries = glob::glob(&pattern).map_err(|source| IngestError::Pattern {
        pattern: pattern.clone(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(path) => tracing::debug!(path = %path.display(), "skipping non-file match"),
            Err(e) => tracing::warn!(path = %e.path().display(), error = %e.error(), "unreadable match"),
        }
    }
    paths.sort();
    Ok(paths)
}
