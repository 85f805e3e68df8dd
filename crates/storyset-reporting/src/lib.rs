use std::fmt;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use storyset_core::Record;

pub mod xml;

pub use xml::{read_xml, to_xml_string, write_xml};

/// Default name of the dataset file.
pub const DEFAULT_OUTPUT: &str = "stories.xml";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid dataset: {0}")]
    Invalid(String),
    #[error("unknown export format: {0} (expected xml or json)")]
    UnknownFormat(String),
}

/// Dataset serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Xml,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xml => "xml",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xml" => Ok(ExportFormat::Xml),
            "json" => Ok(ExportFormat::Json),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

#[derive(Serialize)]
struct JsonDataset<'a> {
    stories: &'a [Record],
}

/// Serialize `records` as pretty-printed JSON: `{"stories": [...]}`.
pub fn write_json<W: Write>(records: &[Record], mut out: W) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(&mut out, &JsonDataset { stories: records })?;
    out.write_all(b"\n")?;
    Ok(())
}

/// Export the dataset to `path` in the given format.
pub fn export_dataset(
    records: &[Record],
    format: ExportFormat,
    path: &Path,
) -> Result<(), ReportError> {
    let file = std::fs::File::create(path)?;
    let mut out = BufWriter::new(file);
    match format {
        ExportFormat::Xml => write_xml(records, &mut out)?,
        ExportFormat::Json => write_json(records, &mut out)?,
    }
    out.flush()?;
    tracing::info!(path = %path.display(), records = records.len(), %format, "dataset written");
    Ok(())
}

/// Write one file name per line.
pub fn write_unparsed_log(filenames: &[&str], path: &Path) -> Result<(), ReportError> {
    let mut out = BufWriter::new(std::fs::File::create(path)?);
    for name in filenames {
        writeln!(out, "{}", name)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Record> {
        vec![
            Record {
                id: 0,
                filename: "a.pdf".into(),
                title: "Alpha".into(),
                body: "First body".into(),
            },
            Record {
                id: 2,
                filename: "c.pdf".into(),
                title: "Gamma".into(),
                body: "Third body".into(),
            },
        ]
    }

    #[test]
    fn export_xml_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_OUTPUT);
        export_dataset(&sample(), ExportFormat::Xml, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(read_xml(&written).unwrap(), sample());
    }

    #[test]
    fn export_json_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stories.json");
        export_dataset(&sample(), ExportFormat::Json, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let stories = value["stories"].as_array().unwrap();
        assert_eq!(stories.len(), 2);
        assert_eq!(stories[1]["id"], 2);
        assert_eq!(stories[1]["filename"], "c.pdf");
        assert_eq!(stories[0]["title"], "Alpha");
    }

    #[test]
    fn export_to_missing_directory_fails() {
        let err = export_dataset(
            &sample(),
            ExportFormat::Xml,
            Path::new("/nonexistent/storyset/out.xml"),
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::Io(_)));
    }

    #[test]
    fn unparsed_log_one_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unparsed.txt");
        write_unparsed_log(&["b.pdf", "d.pdf"], &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "b.pdf\nd.pdf\n");
    }

    #[test]
    fn format_from_str() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("csv".parse::<ExportFormat>().is_err());
    }
}
