// config.rs — Where the tracker keeps its state, and tunable settings.
//
// `TrackerConfig::for_project()` lays everything out under `<root>/.rt/`:
//
//   .rt/curriculum/<track>.json
//   .rt/users/<user_id>.json
//   .rt/progress/<progress_id>.json
//   .rt/notifications/<notification_id>.json
//   .rt/audit.jsonl
//   .rt/tracker.toml          (optional)

use std::path::{Path, PathBuf};

use rt_notify::NotificationLinks;
use serde::{Deserialize, Serialize};

use crate::error::ProgressError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub project_root: PathBuf,
    pub curriculum_dir: PathBuf,
    pub users_dir: PathBuf,
    pub progress_dir: PathBuf,
    pub notifications_dir: PathBuf,

    /// Append-only, hash-chained transition log.
    pub audit_log: PathBuf,

    pub settings_file: PathBuf,

    #[serde(default)]
    pub settings: TrackerSettings,
}

impl TrackerConfig {
    /// Standard `.rt/` layout with default settings.
    pub fn for_project(project_root: impl AsRef<Path>) -> Self {
        let root = project_root.as_ref().to_path_buf();
        let rt_dir = root.join(".rt");
        Self {
            project_root: root,
            curriculum_dir: rt_dir.join("curriculum"),
            users_dir: rt_dir.join("users"),
            progress_dir: rt_dir.join("progress"),
            notifications_dir: rt_dir.join("notifications"),
            audit_log: rt_dir.join("audit.jsonl"),
            settings_file: rt_dir.join("tracker.toml"),
            settings: TrackerSettings::default(),
        }
    }

    /// Standard layout plus `.rt/tracker.toml`, when present.
    pub fn load(project_root: impl AsRef<Path>) -> Result<Self, ProgressError> {
        let mut config = Self::for_project(project_root);
        config.settings = TrackerSettings::load_or_default(&config.settings_file)?;
        Ok(config)
    }
}

/// Contents of `tracker.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TrackerSettings {
    #[serde(default)]
    pub notifications: NotificationLinks,

    #[serde(default)]
    pub http: HttpSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpSettings {
    /// Address the daemon listens on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl TrackerSettings {
    pub fn load(path: &Path) -> Result<Self, ProgressError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProgressError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ProgressError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Defaults when the file does not exist; a malformed file is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ProgressError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }
}
