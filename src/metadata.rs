use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

/// One processed detail page. Append-only: records are created by the crawl
/// driver and never updated afterwards.
#[derive(Debug, Clone)]
pub struct ItemRecord {
    pub name: String,
    pub url: String,
    pub authors: Vec<String>,
    pub description: String,
    pub image_files: Vec<String>,
    pub pdf_file: Option<String>,
    pub description_file: Option<String>,
    /// Which site produced the record.
    pub source: &'static str,
}

#[derive(Serialize)]
struct Row<'a> {
    name: &'a str,
    source_url: &'a str,
    authors: String,
    description: &'a str,
    image_files: String,
    image_count: usize,
    pdf_file: &'a str,
    description_file: &'a str,
    source: &'a str,
}

/// Serialize the run's records to a CSV file, one row per record, in append
/// order. An empty record set writes nothing and returns false.
pub fn write_metadata(records: &[ItemRecord], path: &Path) -> Result<bool> {
    if records.is_empty() {
        info!("no records extracted, nothing to save");
        return Ok(false);
    }

    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for record in records {
        writer.serialize(Row {
            name: &record.name,
            source_url: &record.url,
            authors: record.authors.join(", "),
            description: &record.description,
            image_files: record.image_files.join(", "),
            image_count: record.image_files.len(),
            pdf_file: record.pdf_file.as_deref().unwrap_or(""),
            description_file: record.description_file.as_deref().unwrap_or(""),
            source: record.source,
        })?;
    }
    writer.flush()?;
    info!("saved {} records to {}", records.len(), path.display());
    Ok(true)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> ItemRecord {
        ItemRecord {
            name: name.to_string(),
            url: format!("https://example.com/{name}"),
            authors: vec!["A. Silva".into(), "B. Costa".into()],
            description: "A short abstract.".into(),
            image_files: vec!["a.jpg".into(), "b.jpg".into()],
            pdf_file: None,
            description_file: Some(format!("{name}.txt")),
            source: "SciELO",
        }
    }

    #[test]
    fn empty_set_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        assert!(!write_metadata(&[], &path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn one_row_per_record_in_append_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        let records = vec![record("first"), record("second")];
        assert!(write_metadata(&records, &path).unwrap());

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("name,source_url,authors,description"));
        assert!(lines[1].starts_with("first,"));
        assert!(lines[2].starts_with("second,"));
        assert!(lines[1].contains("a.jpg, b.jpg"));
        assert!(lines[1].contains(",2,"));
    }
}
