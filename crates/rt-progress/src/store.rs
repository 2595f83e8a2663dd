// store.rs — ProgressStore: one JSON file per Progress record.
//
// Layout: `<progress_dir>/<progress_id>.json`.
//
// The store enforces no cross-record rules; the tracker keeps one record per
// (trainee, phase) by checking `find` before creating.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::ProgressError;
use crate::progress::{PhaseState, Progress};

pub struct ProgressStore {
    dir: PathBuf,
}

impl ProgressStore {
    /// Open a store backed by the given directory, creating it if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, ProgressError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| ProgressError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Create or overwrite.
    pub fn save(&self, progress: &Progress) -> Result<(), ProgressError> {
        let path = self.progress_file(progress.id);
        let json = serde_json::to_string_pretty(progress)?;
        fs::write(&path, json).map_err(|source| ProgressError::Io { path, source })?;
        Ok(())
    }

    pub fn get(&self, progress_id: Uuid) -> Result<Option<Progress>, ProgressError> {
        let path = self.progress_file(progress_id);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path).map_err(|source| ProgressError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    pub fn require(&self, progress_id: Uuid) -> Result<Progress, ProgressError> {
        self.get(progress_id)?
            .ok_or_else(|| ProgressError::NotFound(format!("progress {}", progress_id)))
    }

    /// Every record, oldest first.
    pub fn list(&self) -> Result<Vec<Progress>, ProgressError> {
        let mut records = Vec::new();
        let entries = fs::read_dir(&self.dir).map_err(|source| ProgressError::Io {
            path: self.dir.clone(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| ProgressError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let json = fs::read_to_string(&path).map_err(|source| ProgressError::Io {
                    path: path.clone(),
                    source,
                })?;
                match serde_json::from_str::<Progress>(&json) {
                    Ok(progress) => records.push(progress),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "skipping unreadable progress file")
                    }
                }
            }
        }

        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }

    /// A trainee's records in phase-number order.
    pub fn list_for_resident(&self, resident_id: Uuid) -> Result<Vec<Progress>, ProgressError> {
        let mut records: Vec<Progress> = self
            .list()?
            .into_iter()
            .filter(|p| p.resident_id == resident_id)
            .collect();
        records.sort_by_key(|p| p.phase_number);
        Ok(records)
    }

    pub fn list_by_state(&self, state: PhaseState) -> Result<Vec<Progress>, ProgressError> {
        Ok(self.list()?.into_iter().filter(|p| p.state == state).collect())
    }

    /// The record for (trainee, phase), if one exists.
    pub fn find(&self, resident_id: Uuid, phase_id: Uuid) -> Result<Option<Progress>, ProgressError> {
        Ok(self
            .list()?
            .into_iter()
            .find(|p| p.resident_id == resident_id && p.phase_id == phase_id))
    }

    fn progress_file(&self, progress_id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", progress_id))
    }
}
