//! Snapshot of an in-progress run saved when the application closes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;

use super::store::{write_json, FileStore};
use crate::timer::TickData;
use crate::Result;

const SUSPENDED_FILE: &str = "suspended_run.json";

/// At most one of these exists per data directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspendedRun {
    pub template_id: String,
    pub attempts_id: String,
    pub elapsed_ms: i64,
    pub current_segment: usize,
    pub split_times_ms: Vec<i64>,
    pub segment_times_ms: Vec<i64>,
    pub suspended_at: DateTime<Utc>,
}

impl SuspendedRun {
    /// Capture a run from the engine's current snapshot
    pub fn from_tick(template_id: impl Into<String>, attempts_id: impl Into<String>, tick: &TickData) -> Self {
        Self {
            template_id: template_id.into(),
            attempts_id: attempts_id.into(),
            elapsed_ms: tick.elapsed_ms,
            current_segment: tick.current_segment,
            split_times_ms: tick.split_times_ms.clone(),
            segment_times_ms: tick.segment_times_ms.clone(),
            suspended_at: Utc::now(),
        }
    }
}

impl FileStore {
    pub fn save_suspended_run(&self, run: &SuspendedRun) -> Result<()> {
        write_json(&self.file_path(SUSPENDED_FILE), run)?;
        log::info!(
            "Suspended run for attempts {} at {} ms",
            run.attempts_id,
            run.elapsed_ms
        );
        Ok(())
    }

    /// `Ok(None)` when no run is suspended
    pub fn load_suspended_run(&self) -> Result<Option<SuspendedRun>> {
        let data = match fs::read(self.file_path(SUSPENDED_FILE)) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&data)?))
    }

    /// Idempotent
    pub fn delete_suspended_run(&self) -> Result<()> {
        match fs::remove_file(self.file_path(SUSPENDED_FILE)) {
            Ok(()) => {
                log::debug!("Cleared suspended run");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
