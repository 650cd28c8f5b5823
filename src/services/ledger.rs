//! Applied-job ledger - business capability layer
//!
//! Append-only CSV record of every application outcome, also the source of
//! the recently-applied skip set.

use crate::error::{AppError, AppResult};
use crate::models::AppliedRecord;
use chrono::{Duration, NaiveDateTime};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Applied-job ledger
///
/// Responsibilities:
/// - append one row per outcome, durable before returning
/// - re-read the file for the recency dedup set
/// - never rewrite existing rows
pub struct AppliedLedger {
    path: PathBuf,
}

impl AppliedLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Job ids with a record at or after `now - window`
    ///
    /// A missing or malformed file degrades to an empty set.
    ///
    /// # Arguments
    /// - `now`: run start, local time
    /// - `window`: how far back a record still counts
    ///
    /// # Returns
    /// Ids to pass over this run, whatever their recorded result
    pub fn load_recent(&self, now: NaiveDateTime, window: Duration) -> HashSet<String> {
        match self.read_all() {
            Ok(records) => {
                let cutoff = now - window;
                let ids: HashSet<String> = records
                    .into_iter()
                    .filter(|r| r.timestamp >= cutoff)
                    .map(|r| r.job_id)
                    .collect();
                info!("✓ {} job ids applied to recently", ids.len());
                ids
            }
            Err(e) => {
                warn!(
                    "⚠️ job ids could not be loaded from {}: {} (starting with no history)",
                    self.path.display(),
                    e
                );
                HashSet::new()
            }
        }
    }

    /// Every record in file order; no file yet means no records
    ///
    /// # Returns
    /// `ReadFailed` naming the file for unreadable rows, `Other` with the
    /// line number for rows that do not parse
    pub fn read_all(&self) -> AppResult<Vec<AppliedRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let read_err =
            |e: csv::Error| AppError::file_read_failed(self.path.display().to_string(), e);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)
            .map_err(read_err)?;

        let mut records = Vec::new();
        for (line, row) in reader.records().enumerate() {
            let row = row.map_err(read_err)?;
            let record = AppliedRecord::from_row(&row).map_err(|msg| {
                AppError::Other(format!("{} line {}: {}", self.path.display(), line + 1, msg))
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Append one record and sync it to disk
    ///
    /// # Arguments
    /// - `record`: the outcome to persist, written as a single line
    ///
    /// # Returns
    /// `WriteFailed` naming the file if the row could not be encoded or written
    pub fn append(&self, record: &AppliedRecord) -> AppResult<()> {
        debug!(
            "ledger append: {} | {} | {}",
            record.job_id, record.title, record.result
        );

        let path = self.path.display().to_string();
        let write_err = |e: std::io::Error| AppError::file_write_failed(path.as_str(), e);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;

        // whole line in one write so a reader never sees half a row
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer
            .write_record(record.to_row())
            .map_err(|e| AppError::file_write_failed(path.as_str(), e))?;
        let line = writer
            .into_inner()
            .map_err(|e| AppError::file_write_failed(path.as_str(), e))?;

        file.write_all(&line).map_err(write_err)?;
        file.sync_data().map_err(write_err)?;
        Ok(())
    }
}
