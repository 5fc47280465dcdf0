use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::app::ports::LeadSourcePort;
use crate::constants::{
    get_supported_extensions, CSV_EXTENSION, TEXT_DEFAULT_LEAD_STATUS, TEXT_DEFAULT_PRIORITY, TEXT_EXTENSION,
    TSV_EXTENSION,
};
use crate::domain::{format_number, CanonicalField};
use crate::error::{PipelineError, Result};
use crate::pipeline::ingestion::RawLeadTable;

/// Reads leads from a `.csv`, `.tsv` or line-oriented `.txt` file
pub struct FileLeadSource {
    path: PathBuf,
}

impl FileLeadSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn extension(&self) -> Result<String> {
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if get_supported_extensions().contains(&ext.as_str()) {
            Ok(ext)
        } else {
            Err(PipelineError::UnsupportedExtension(ext))
        }
    }

    fn read_delimited(&self, delimiter: u8) -> Result<RawLeadTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .has_headers(true)
            .from_path(&self.path)?;

        let headers: Vec<String> = reader.byte_headers()?.iter().map(decode_field).collect();

        let mut rows = Vec::new();
        for record in reader.byte_records() {
            let record = record?;
            let row: Vec<String> = record.iter().map(decode_field).collect();
            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            rows.push(row);
        }

        Ok(RawLeadTable::new(headers, rows))
    }

    /// Each non-empty line is `FullName, CompanyName, Country, JobTitle`;
    /// blank parts are skipped and missing trailing fields stay empty.
    /// Blank lines produce no lead but still advance the line number.
    fn read_text(&self) -> Result<RawLeadTable> {
        let bytes = fs::read(&self.path)?;
        let text = decode_field(&bytes);

        let headers: Vec<String> = [
            CanonicalField::LeadId,
            CanonicalField::FullName,
            CanonicalField::CompanyName,
            CanonicalField::Country,
            CanonicalField::JobTitle,
            CanonicalField::LeadStatus,
            CanonicalField::PriorityScore,
        ]
        .iter()
        .map(|f| f.column_name().to_string())
        .collect();

        // LeadID is the 1-based physical line number, blank lines included
        let rows: Vec<Vec<String>> = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .map(|(index, line)| {
                let mut parts = line
                    .split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string);
                let mut row = vec![(index + 1).to_string()];
                row.extend((0..4).map(|_| parts.next().unwrap_or_default()));
                row.push(TEXT_DEFAULT_LEAD_STATUS.to_string());
                row.push(format_number(TEXT_DEFAULT_PRIORITY));
                row
            })
            .collect();

        Ok(RawLeadTable::new(headers, rows))
    }
}

impl LeadSourcePort for FileLeadSource {
    fn load(&self) -> Result<RawLeadTable> {
        if !self.path.is_file() {
            return Err(PipelineError::InputNotFound(self.path.clone()));
        }
        let ext = self.extension()?;
        debug!("Reading {} as {}", self.path.display(), ext);

        let table = match ext.as_str() {
            CSV_EXTENSION => self.read_delimited(b',')?,
            TSV_EXTENSION => self.read_delimited(b'\t')?,
            TEXT_EXTENSION => self.read_text()?,
            other => return Err(PipelineError::UnsupportedExtension(other.to_string())),
        };

        if table.is_empty() {
            return Err(PipelineError::EmptyInput(self.path.clone()));
        }
        info!("Read {} rows from {}", table.len(), self.path.display());
        Ok(table)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// UTF-8 when valid, otherwise Latin-1
fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
