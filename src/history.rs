//! Workout history: append-only CSV store.
//!
//! One row per explicitly saved session, `timestamp,reps,accuracy`, header
//! written when the file is first created. The app never rewrites or
//! deletes rows.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutRecord {
    pub timestamp: DateTime<Utc>,
    pub reps: u32,
    pub accuracy: f32,
}

#[derive(Debug, Clone)]
pub struct WorkoutHistory {
    path: PathBuf,
}

impl WorkoutHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file (with header) if needed.
    pub fn append(&self, record: &WorkoutRecord) -> Result<()> {
        let needs_header = !self.path.exists();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create history directory {}", parent.display())
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open history file {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer
            .serialize(record)
            .context("failed to serialize workout record")?;
        writer
            .flush()
            .with_context(|| format!("failed to write history file {}", self.path.display()))?;
        Ok(())
    }

    /// All saved records, oldest first. A missing file reads as empty.
    pub fn load(&self) -> Result<Vec<WorkoutRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("failed to read history file {}", self.path.display()))?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: WorkoutRecord = row.with_context(|| {
                format!("malformed row in history file {}", self.path.display())
            })?;
            records.push(record);
        }
        Ok(records)
    }
}
