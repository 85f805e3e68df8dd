use std::io::Write;

use owo_colors::OwoColorize;
use storyset_ingest::{BatchOutcome, Unparsed};
use storyset_parsing::ParsedStory;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the line shown before a batch starts.
pub fn print_run_header(
    w: &mut dyn Write,
    total: usize,
    backend: &str,
    mode: &str,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(
            w,
            "Building dataset from {} files ({} extraction, {} segmentation)",
            total.bold(),
            backend.cyan(),
            mode.cyan()
        )?;
    } else {
        writeln!(
            w,
            "Building dataset from {} files ({} extraction, {} segmentation)",
            total, backend, mode
        )?;
    }
    Ok(())
}

pub fn print_warning(w: &mut dyn Write, message: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", "WARNING:".yellow(), message)
    } else {
        writeln!(w, "WARNING: {}", message)
    }
}

/// Print one per-file failure.
pub fn print_skipped(
    w: &mut dyn Write,
    unparsed: &Unparsed,
    total: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    let idx = unparsed.index + 1;
    if color.enabled() {
        writeln!(
            w,
            "[{}/{}] {} {} ({})",
            idx,
            total,
            "UNPARSED".red(),
            unparsed.filename,
            unparsed.reason
        )
    } else {
        writeln!(
            w,
            "[{}/{}] UNPARSED {} ({})",
            idx, total, unparsed.filename, unparsed.reason
        )
    }
}

/// Print the split of a single file.
pub fn print_preview(
    w: &mut dyn Write,
    story: &ParsedStory,
    color: ColorMode,
) -> std::io::Result<()> {
    let record = &story.record;
    let how = match story.run_length {
        Some(k) => format!("{}, run length {}", story.mode, k),
        None => story.mode.to_string(),
    };

    if color.enabled() {
        writeln!(w, "{} {} ({})", "PREVIEW:".bold().cyan(), record.filename.bold(), how)?;
    } else {
        writeln!(w, "PREVIEW: {} ({})", record.filename, how)?;
    }
    if story.low_confidence {
        print_warning(
            w,
            "split at a single line break; title may be only the first line",
            color,
        )?;
    }
    writeln!(w)?;

    if color.enabled() {
        writeln!(w, "{}", "Title:".bold())?;
    } else {
        writeln!(w, "Title:")?;
    }
    writeln!(w, "  {}", record.title)?;
    writeln!(w)?;

    let lines = record.body.lines().count();
    if color.enabled() {
        writeln!(w, "{} {}", "Body:".bold(), format!("({} lines)", lines).dimmed())?;
    } else {
        writeln!(w, "Body: ({} lines)", lines)?;
    }
    for line in record.body.lines().take(PREVIEW_BODY_LINES) {
        writeln!(w, "  {}", truncate(line, 100))?;
    }
    if lines > PREVIEW_BODY_LINES {
        let msg = format!("... {} more lines", lines - PREVIEW_BODY_LINES);
        if color.enabled() {
            writeln!(w, "  {}", msg.dimmed())?;
        } else {
            writeln!(w, "  {}", msg)?;
        }
    }
    Ok(())
}

const PREVIEW_BODY_LINES: usize = 10;

/// Print the final summary and the files that produced no record.
pub fn print_summary(
    w: &mut dyn Write,
    outcome: &BatchOutcome,
    output_path: &str,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    let sep = "=".repeat(60);
    if color.enabled() {
        writeln!(w, "{}", sep.bold())?;
        writeln!(w, "{}", "SUMMARY".bold())?;
        writeln!(w, "{}", sep.bold())?;
    } else {
        writeln!(w, "{}", sep)?;
        writeln!(w, "SUMMARY")?;
        writeln!(w, "{}", sep)?;
    }

    writeln!(w, "  Files processed: {}", outcome.total())?;
    if color.enabled() {
        writeln!(w, "  {} {}", "Stories written:".green(), outcome.records.len())?;
    } else {
        writeln!(w, "  Stories written: {}", outcome.records.len())?;
    }
    if outcome.low_confidence > 0 {
        let msg = format!("Single-break splits: {}", outcome.low_confidence);
        if color.enabled() {
            writeln!(w, "  {}", msg.yellow())?;
        } else {
            writeln!(w, "  {}", msg)?;
        }
    }
    if !outcome.unparsed.is_empty() {
        if color.enabled() {
            writeln!(w, "  {} {}", "Unparsed:".red(), outcome.unparsed.len())?;
        } else {
            writeln!(w, "  Unparsed: {}", outcome.unparsed.len())?;
        }
    }
    writeln!(w, "  Output: {}", output_path)?;
    writeln!(w)?;

    if !outcome.unparsed.is_empty() {
        if color.enabled() {
            writeln!(w, "{}", "Could not parse:".bold())?;
        } else {
            writeln!(w, "Could not parse:")?;
        }
        for name in outcome.unparsed_filenames() {
            writeln!(w, "  {}", name)?;
        }
        writeln!(w)?;
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((end, _)) => format!("{}...", &s[..end]),
        None => s.to_string(),
    }
}
