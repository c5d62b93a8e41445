//! CSV input stream provider.
//!
//! Checks the upload preconditions once, then streams raw byte records as
//! [`RawRow`]s without materializing the file. Field bytes are passed
//! through untouched; the normalizer owns encoding repair.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::{ByteRecord, ByteRecordsIntoIter, ReaderBuilder};
use redirection_core::models::RawRow;
use tracing::warn;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Verify the upload before any row is read.
pub fn check_input(path: &Path, allowed_extensions: &[String]) -> Result<()> {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) => bail!("No file uploaded or upload error: {}: {}", path.display(), e),
    };
    if !meta.is_file() {
        bail!(
            "No file uploaded or upload error: {} is not a file",
            path.display()
        );
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !allowed_extensions
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(&ext))
    {
        bail!(
            "The uploaded file is not a valid CSV: {} (expected extension: {})",
            path.display(),
            allowed_extensions.join(", ")
        );
    }

    Ok(())
}

/// Lazy row stream over a CSV source.
///
/// Iteration stops at the first read error; call [`finish`](Self::finish)
/// afterwards to surface it.
pub struct CsvRows<R: Read> {
    records: ByteRecordsIntoIter<R>,
    error: Option<csv::Error>,
}

impl CsvRows<File> {
    /// Check preconditions and open `path` for streaming.
    pub fn open(path: &Path, allowed_extensions: &[String]) -> Result<Self> {
        check_input(path, allowed_extensions)?;
        let file = File::open(path)
            .with_context(|| format!("No file uploaded or upload error: {}", path.display()))?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> CsvRows<R> {
    pub fn from_reader(reader: R) -> Self {
        let records = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader)
            .into_byte_records();
        Self {
            records,
            error: None,
        }
    }

    /// Report a read error that cut the stream short.
    pub fn finish(self) -> Result<()> {
        match self.error {
            Some(e) => Err(e).context("Failed to read CSV input"),
            None => Ok(()),
        }
    }
}

impl<R: Read> Iterator for CsvRows<R> {
    type Item = RawRow;

    fn next(&mut self) -> Option<RawRow> {
        if self.error.is_some() {
            return None;
        }
        match self.records.next()? {
            Ok(record) => Some(to_row(&record)),
            Err(e) => {
                warn!(error = %e, "CSV stream ended early");
                self.error = Some(e);
                None
            }
        }
    }
}

fn to_row(record: &ByteRecord) -> RawRow {
    let line_number = record.position().map(|p| p.line()).unwrap_or(1);
    let mut fields: Vec<Vec<u8>> = record.iter().map(<[u8]>::to_vec).collect();
    if line_number == 1 {
        if let Some(first) = fields.first_mut() {
            if first.starts_with(UTF8_BOM) {
                first.drain(..UTF8_BOM.len());
            }
        }
    }
    RawRow::new(line_number, fields)
}
