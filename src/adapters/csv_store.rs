use crate::core::{CodeRecord, CodeSet, CodeStore};
use crate::extract::normalize_code;
use crate::utils::error::Result;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

pub const HEADER: [&str; 4] = ["Code", "Date Added", "Expiration", "Redeemed"];

/// Header written before the Expiration column existed.
const LEGACY_HEADER: &str = "code,date added,redeemed";

/// Append-only CSV file of codes: `Code, Date Added, Expiration, Redeemed`.
#[derive(Debug, Clone)]
pub struct CsvCodeStore {
    path: PathBuf,
}

impl CsvCodeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_header(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(HEADER)?;
        writer.flush()?;
        Ok(())
    }

    /// Rewrites a legacy three-column file, inserting an empty Expiration.
    fn upgrade_legacy(&self, content: &str) -> Result<()> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut rows: Vec<[String; 4]> = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }
            let field = |i: usize| record.get(i).unwrap_or_default().to_string();
            if record.len() >= 3 {
                rows.push([field(0), field(1), String::new(), field(2)]);
            } else {
                rows.push([field(0), String::new(), String::new(), "No".to_string()]);
            }
        }

        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(HEADER)?;
        for row in &rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        tracing::info!(
            "Upgraded CSV header in {} ({} existing row(s))",
            self.path.display(),
            rows.len()
        );
        Ok(())
    }

    fn read_codes(&self) -> Result<CodeSet> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;

        // Only the code column is decoded; other columns may hold any bytes.
        let mut codes = CodeSet::new();
        for record in reader.byte_records() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(
                        "Stopped reading {} after {} code(s): {}",
                        self.path.display(),
                        codes.len(),
                        e
                    );
                    break;
                }
            };
            let Some(first) = record.get(0) else {
                continue;
            };
            if let Some(code) = std::str::from_utf8(first).ok().and_then(normalize_code) {
                codes.insert(code);
            }
        }
        Ok(codes)
    }
}

impl CodeStore for CsvCodeStore {
    async fn prepare(&self) -> Result<()> {
        let is_empty = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };
        if is_empty {
            tracing::debug!("Creating {} with header", self.path.display());
            return self.write_header();
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Could not inspect CSV header of {}: {}", self.path.display(), e);
                return Ok(());
            }
        };
        let first_line = content.lines().next().unwrap_or_default();
        if first_line.trim().to_lowercase() == LEGACY_HEADER {
            if let Err(e) = self.upgrade_legacy(&content) {
                tracing::warn!(
                    "Leaving {} as-is, header upgrade failed: {}",
                    self.path.display(),
                    e
                );
            }
        }
        Ok(())
    }

    async fn known_codes(&self) -> Result<CodeSet> {
        if !self.path.exists() {
            return Ok(CodeSet::new());
        }
        match self.read_codes() {
            Ok(codes) => Ok(codes),
            Err(e) => {
                tracing::warn!("Failed to read existing CSV '{}': {}", self.path.display(), e);
                Ok(CodeSet::new())
            }
        }
    }

    async fn append(&self, records: &[CodeRecord]) -> Result<usize> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(records.len())
    }
}
