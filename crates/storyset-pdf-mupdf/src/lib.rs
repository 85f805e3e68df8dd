use std::path::Path;

use mupdf::{Document, TextPageFlags};

use storyset_core::{BackendError, TextBackend};

/// MuPDF-based implementation of [`TextBackend`].
///
/// Kept in its own crate so `storyset-ingest` can build without mupdf when
/// its `pdf` feature is off.
///
/// Each text line becomes one `\n`-terminated line, every block ends with an
/// extra `\n` and pages are joined with `\n`, so the gap between a title
/// block and the body survives as a run of line breaks.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl TextBackend for MupdfBackend {
    fn name(&self) -> &str {
        "mupdf"
    }

    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        let mut pages_text = Vec::new();

        for page_result in document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?
        {
            let page = page_result.map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

            let mut page_text = String::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    let line_text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    page_text.push_str(&line_text);
                    page_text.push('\n');
                }
                // Block boundary: keep the visual gap as an empty line.
                page_text.push('\n');
            }
            pages_text.push(page_text);
        }

        tracing::debug!(path = %path.display(), pages = pages_text.len(), "extracted PDF text");

        let text = pages_text.join("\n");
        if text.trim().is_empty() {
            return Err(BackendError::NoContent);
        }
        Ok(text)
    }
}
