// trail.rs — Append-only JSONL audit trail with a SHA-256 hash chain.
//
// Each line is one AuditEntry. An entry's `previous_hash` is the digest of
// the raw text of the line before it, so editing, inserting or deleting any
// line breaks verification from that point on.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::entry::AuditEntry;
use crate::error::AuditError;
use crate::hasher;

/// Handle for appending to an audit file.
///
/// Appends take `&self`; the tail hash sits behind a mutex so one trail can be
/// shared by every request handler.
pub struct AuditTrail {
    path: PathBuf,
    last_hash: Mutex<Option<String>>,
}

impl AuditTrail {
    /// Open (or create) a trail, recovering the tail hash from existing content.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| AuditError::OpenFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let last_hash = if path.exists() {
            Self::tail_hash(&path)?
        } else {
            None
        };
        Ok(Self {
            path,
            last_hash: Mutex::new(last_hash),
        })
    }

    /// Chain `entry` to the current tail and append it as one line.
    pub fn append(&self, mut entry: AuditEntry) -> Result<AuditEntry, AuditError> {
        let mut last_hash = self
            .last_hash
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        entry.previous_hash = last_hash.clone();
        let line = serde_json::to_string(&entry)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| AuditError::OpenFailed {
                path: self.path.clone(),
                source,
            })?;
        writeln!(file, "{}", line)?;
        file.flush()?;

        *last_hash = Some(hasher::hash_str(&line));
        Ok(entry)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every entry in file order. Blank lines are skipped.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<AuditEntry>, AuditError> {
        let mut entries = Vec::new();
        for line in Self::lines(path.as_ref())? {
            entries.push(serde_json::from_str(&line)?);
        }
        Ok(entries)
    }

    /// Walk the chain. Returns the number of entries when every link holds.
    pub fn verify(path: impl AsRef<Path>) -> Result<usize, AuditError> {
        let mut expected: Option<String> = None;
        let mut count = 0;

        for (index, line) in Self::lines(path.as_ref())?.into_iter().enumerate() {
            let entry: AuditEntry = serde_json::from_str(&line)?;
            if entry.previous_hash != expected {
                return Err(AuditError::IntegrityViolation {
                    line: index + 1,
                    expected: expected.unwrap_or_else(|| "none".to_string()),
                    actual: entry.previous_hash.unwrap_or_else(|| "none".to_string()),
                });
            }
            // Hash the stored text, not a re-serialization.
            expected = Some(hasher::hash_str(&line));
            count += 1;
        }
        Ok(count)
    }

    fn tail_hash(path: &Path) -> Result<Option<String>, AuditError> {
        Ok(Self::lines(path)?.last().map(|line| hasher::hash_str(line)))
    }

    fn lines(path: &Path) -> Result<Vec<String>, AuditError> {
        let file = File::open(path).map_err(|source| AuditError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let mut lines = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if !line.trim().is_empty() {
                lines.push(line);
            }
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use uuid::Uuid;

    #[test]
    fn appended_entries_read_back_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let trail = AuditTrail::open(&path).unwrap();
        trail.append(AuditEntry::new("activity_completed")).unwrap();
        trail.append(AuditEntry::new("activity_validated")).unwrap();

        let entries = AuditTrail::read_all(&path).unwrap();
        let actions: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["activity_completed", "activity_validated"]);
        assert!(entries[0].previous_hash.is_none());
        assert!(entries[1].previous_hash.is_some());
    }

    #[test]
    fn chain_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        {
            let trail = AuditTrail::open(&path).unwrap();
            trail.append(AuditEntry::new("progress_initialized")).unwrap();
        }
        {
            let trail = AuditTrail::open(&path).unwrap();
            trail
                .append(AuditEntry::new("phase_unlocked").on(Uuid::new_v4()))
                .unwrap();
        }
        assert_eq!(AuditTrail::verify(&path).unwrap(), 2);
    }

    #[test]
    fn tampering_is_detected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let trail = AuditTrail::open(&path).unwrap();
        for action in ["activity_completed", "activity_rejected", "activity_completed"] {
            trail.append(AuditEntry::new(action)).unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        fs::write(&path, content.replacen("activity_rejected", "activity_validated", 1)).unwrap();

        let err = AuditTrail::verify(&path).unwrap_err();
        assert!(matches!(err, AuditError::IntegrityViolation { line: 3, .. }));
    }

    #[test]
    fn open_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("audit.jsonl");
        let trail = AuditTrail::open(&path).unwrap();
        trail.append(AuditEntry::new("x")).unwrap();
        assert!(path.exists());
    }
}
