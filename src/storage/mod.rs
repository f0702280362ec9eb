//! Flat-file persistence for harvested results
//!
//! Results are appended to a single CSV file. The header row is written when
//! the file is first created; later runs only append. There is no locking,
//! rotation or size cap: one operator, one writer.

pub mod dedup;

pub use dedup::DedupBuffer;

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::{SearchResult, UrlRow};

/// A record that can be written as one CSV row
pub trait SinkRecord {
    /// Column names, written once per file
    const HEADER: &'static [&'static str];

    /// Column holding the dedup key
    const KEY_COLUMN: &'static str;

    /// Dedup key
    fn key(&self) -> &str;

    /// Field values, in `HEADER` order
    fn row(&self) -> Vec<String>;
}

impl SinkRecord for SearchResult {
    const HEADER: &'static [&'static str] =
        &["keyword", "title", "link", "result_number", "scraped_at"];
    const KEY_COLUMN: &'static str = "link";

    fn key(&self) -> &str {
        &self.link
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.keyword.clone(),
            self.title.clone(),
            self.link.clone(),
            self.rank.to_string(),
            self.scraped_at.to_rfc3339(),
        ]
    }
}

impl SinkRecord for UrlRow {
    const HEADER: &'static [&'static str] = &["timestamp", "url"];
    const KEY_COLUMN: &'static str = "url";

    fn key(&self) -> &str {
        &self.url
    }

    fn row(&self) -> Vec<String> {
        vec![self.timestamp.to_rfc3339(), self.url.clone()]
    }
}

/// Append-only CSV file
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `records`, writing the header first if the file is new or empty
    ///
    /// Returns the number of rows written.
    pub fn append<R: SinkRecord>(&self, records: &[R]) -> Result<usize> {
        let mut written = 0;
        self.append_counted(records, &mut written)?;
        Ok(written)
    }

    /// Append `records` one row at a time, counting rows in `written`
    ///
    /// On error, `written` holds the rows already in the file, so the caller
    /// can retry only the rest. A row cut short by an I/O error mid-write can
    /// still leave a partial line behind.
    pub(crate) fn append_counted<R: SinkRecord>(
        &self,
        records: &[R],
        written: &mut usize,
    ) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let header = needs_header.then_some(R::HEADER);
        write_rows(&mut file, header, records, written)?;

        tracing::debug!(
            path = %self.path.display(),
            rows = *written,
            header = needs_header,
            "Appended rows to sink"
        );

        Ok(())
    }

    /// Read every value of `column`; a missing file yields an empty set
    pub fn read_keys(&self, column: &str) -> Result<HashSet<String>> {
        if !self.path.exists() {
            return Ok(HashSet::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let index = reader
            .headers()?
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| {
                Error::other(format!(
                    "column '{column}' not found in {}",
                    self.path.display()
                ))
            })?;

        let mut keys = HashSet::new();
        for record in reader.records() {
            if let Some(value) = record?.get(index) {
                keys.insert(value.to_string());
            }
        }
        Ok(keys)
    }
}

/// Write the optional header, then each record as its own flushed write
fn write_rows<W: Write, R: SinkRecord>(
    out: &mut W,
    header: Option<&[&str]>,
    records: &[R],
    written: &mut usize,
) -> Result<()> {
    if let Some(header) = header {
        out.write_all(&encode_row(header)?)?;
        out.flush()?;
    }
    for record in records {
        out.write_all(&encode_row(record.row())?)?;
        out.flush()?;
        *written += 1;
    }
    Ok(())
}

/// One CSV line, quoted as needed
fn encode_row<I, T>(fields: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(fields)?;
    writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}
