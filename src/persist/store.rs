//! File-backed persistence for templates and attempt histories
//!
//! Layout under the base directory:
//! - `templates/<id>.json`
//! - `attempts/<id>.json`
//! - `suspended_run.json`
//! - `settings.toml`
//!
//! Every write goes to a `.tmp` sibling first and is renamed into place, so a
//! crash mid-write leaves the previous record intact.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::dirs::default_base_dir;
use super::suspended::SuspendedRun;
use crate::split::{Attempts, Template};
use crate::{Result, SplitError};

const TEMPLATES_DIR: &str = "templates";
const ATTEMPTS_DIR: &str = "attempts";

/// What a session needs from its persistence collaborator
pub trait RunStore: Send + Sync {
    /// Persist an attempt history, replacing any previous version
    fn save_attempts(&self, attempts: &Attempts) -> Result<()>;

    /// Persist the single suspended-run record
    fn save_suspended_run(&self, run: &SuspendedRun) -> Result<()>;

    /// Load the suspended-run record, `None` if there is none
    fn load_suspended_run(&self) -> Result<Option<SuspendedRun>>;

    /// Remove the suspended-run record. Not an error if it is absent.
    fn delete_suspended_run(&self) -> Result<()>;
}

/// Lightweight template listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub segment_count: usize,
    /// Unix seconds
    pub updated_at: i64,
}

/// Lightweight attempts listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptsSummary {
    pub id: String,
    pub template_id: String,
    pub name: String,
    pub category_name: String,
    pub attempt_count: u32,
    /// Unix seconds
    pub updated_at: i64,
}

/// JSON file store rooted at a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Open a store, creating its directories as needed
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        for sub in [TEMPLATES_DIR, ATTEMPTS_DIR] {
            fs::create_dir_all(base_dir.join(sub))?;
        }

        log::debug!("Opened store at {}", base_dir.display());
        Ok(Self { base_dir })
    }

    /// Open the store in the platform data directory
    pub fn open_default() -> Result<Self> {
        let base_dir = default_base_dir().ok_or(SplitError::NoDataDir)?;
        Self::open(base_dir)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    // =========================================================================
    // Templates
    // =========================================================================

    pub fn save_template(&self, template: &Template) -> Result<()> {
        let path = self.record_path(TEMPLATES_DIR, "template", &template.id)?;
        write_json(&path, template)?;
        log::debug!("Saved template {} ({})", template.id, template.name);
        Ok(())
    }

    pub fn load_template(&self, id: &str) -> Result<Template> {
        let path = self.record_path(TEMPLATES_DIR, "template", id)?;
        read_json(&path, "template", id)
    }

    /// Summaries of every readable template, most recently updated first
    pub fn list_templates(&self) -> Result<Vec<TemplateSummary>> {
        let mut summaries: Vec<TemplateSummary> = self
            .load_all::<Template>(TEMPLATES_DIR)?
            .into_iter()
            .map(|t| TemplateSummary {
                segment_count: t.segment_names.len(),
                updated_at: t.updated_at.timestamp(),
                id: t.id,
                name: t.name,
            })
            .collect();

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.name.cmp(&b.name)));
        Ok(summaries)
    }

    /// Delete a template together with every attempt history built from it
    pub fn delete_template(&self, id: &str) -> Result<()> {
        let path = self.record_path(TEMPLATES_DIR, "template", id)?;

        for attempts in self.load_all::<Attempts>(ATTEMPTS_DIR)? {
            if attempts.template_id == id {
                if let Err(e) = self.delete_attempts(&attempts.id) {
                    log::warn!("Could not delete attempts {}: {}", attempts.id, e);
                }
            }
        }

        remove_record(&path, "template", id)?;
        log::info!("Deleted template {}", id);
        Ok(())
    }

    // =========================================================================
    // Attempts
    // =========================================================================

    pub fn save_attempts(&self, attempts: &Attempts) -> Result<()> {
        let path = self.record_path(ATTEMPTS_DIR, "attempts", &attempts.id)?;
        write_json(&path, attempts)?;
        log::debug!(
            "Saved attempts {} ({} attempts)",
            attempts.id,
            attempts.attempt_count
        );
        Ok(())
    }

    pub fn load_attempts(&self, id: &str) -> Result<Attempts> {
        let path = self.record_path(ATTEMPTS_DIR, "attempts", id)?;
        read_json(&path, "attempts", id)
    }

    /// Summaries of the attempt histories built from a template
    pub fn list_attempts_for_template(&self, template_id: &str) -> Result<Vec<AttemptsSummary>> {
        let mut summaries: Vec<AttemptsSummary> = self
            .load_all::<Attempts>(ATTEMPTS_DIR)?
            .into_iter()
            .filter(|a| a.template_id == template_id)
            .map(|a| AttemptsSummary {
                attempt_count: a.attempt_count,
                updated_at: a.updated_at.timestamp(),
                id: a.id,
                template_id: a.template_id,
                name: a.name,
                category_name: a.category_name,
            })
            .collect();

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.name.cmp(&b.name)));
        Ok(summaries)
    }

    pub fn delete_attempts(&self, id: &str) -> Result<()> {
        let path = self.record_path(ATTEMPTS_DIR, "attempts", id)?;
        remove_record(&path, "attempts", id)?;
        log::info!("Deleted attempts {}", id);
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    pub(crate) fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn record_path(&self, dir: &str, kind: &'static str, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\']);
        if !valid {
            return Err(SplitError::not_found(kind, id));
        }
        Ok(self.base_dir.join(dir).join(format!("{id}.json")))
    }

    /// Load every `.json` record in a directory, skipping unreadable files
    fn load_all<T: DeserializeOwned>(&self, dir: &str) -> Result<Vec<T>> {
        let mut records = Vec::new();

        for entry in fs::read_dir(self.base_dir.join(dir))? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match fs::read(&path).map_err(SplitError::from).and_then(|data| {
                serde_json::from_slice::<T>(&data).map_err(SplitError::from)
            }) {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("Skipping unreadable record {}: {}", path.display(), e),
            }
        }

        Ok(records)
    }
}

impl RunStore for FileStore {
    fn save_attempts(&self, attempts: &Attempts) -> Result<()> {
        FileStore::save_attempts(self, attempts)
    }

    fn save_suspended_run(&self, run: &SuspendedRun) -> Result<()> {
        FileStore::save_suspended_run(self, run)
    }

    fn load_suspended_run(&self) -> Result<Option<SuspendedRun>> {
        FileStore::load_suspended_run(self)
    }

    fn delete_suspended_run(&self) -> Result<()> {
        FileStore::delete_suspended_run(self)
    }
}

/// Write bytes to `path` via a temporary sibling and rename
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, data)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &data)
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path, kind: &'static str, id: &str) -> Result<T> {
    let data = fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SplitError::not_found(kind, id),
        _ => e.into(),
    })?;
    Ok(serde_json::from_slice(&data)?)
}

fn remove_record(path: &Path, kind: &'static str, id: &str) -> Result<()> {
    fs::remove_file(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SplitError::not_found(kind, id),
        _ => e.into(),
    })
}
