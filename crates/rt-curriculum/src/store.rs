// store.rs — CurriculumStore: one JSON document per track.
//
// Layout: `<curriculum_dir>/residency.json` and `<curriculum_dir>/society.json`.
// A missing file is an empty curriculum, so a fresh install loads cleanly.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::catalog::{Activity, Curriculum, Phase, Track};
use crate::error::CurriculumError;

/// Persistent catalog of phases and activities for both tracks.
pub struct CurriculumStore {
    dir: PathBuf,
}

impl CurriculumStore {
    /// Open a store backed by the given directory, creating it if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, CurriculumError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| CurriculumError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Load the curriculum of a track (empty if none has been published).
    pub fn load(&self, track: Track) -> Result<Curriculum, CurriculumError> {
        let path = self.track_file(track);
        if !path.exists() {
            return Ok(Curriculum::new(track));
        }
        let json = fs::read_to_string(&path).map_err(|source| CurriculumError::Io {
            path: path.clone(),
            source,
        })?;
        let curriculum: Curriculum = serde_json::from_str(&json)?;
        Ok(curriculum)
    }

    /// Validate and persist a curriculum, replacing the track's current one.
    pub fn save(&self, curriculum: &Curriculum) -> Result<(), CurriculumError> {
        curriculum.validate()?;
        let path = self.track_file(curriculum.track);
        let json = serde_json::to_string_pretty(curriculum)?;
        fs::write(&path, json).map_err(|source| CurriculumError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(track = %curriculum.track, phases = curriculum.phases.len(), "curriculum saved");
        Ok(())
    }

    /// Import a hand-written catalog file (`.yaml`/`.yml` or JSON) as the
    /// curriculum of `track`. The file's own `track` field is overridden.
    pub fn import_file(&self, path: &Path, track: Track) -> Result<Curriculum, CurriculumError> {
        let content = fs::read_to_string(path).map_err(|source| CurriculumError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_yaml = path
            .extension()
            .is_some_and(|ext| ext == "yaml" || ext == "yml");
        let mut curriculum: Curriculum = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        curriculum.track = track;
        curriculum.normalize();
        self.save(&curriculum)?;

        let activities: usize = curriculum.phases.iter().map(|p| p.activities.len()).sum();
        tracing::info!(
            %track,
            phases = curriculum.phases.len(),
            activities,
            "curriculum imported from {}",
            path.display()
        );
        Ok(curriculum)
    }

    /// Phases of a track in published order, each with activities sorted by `order`.
    pub fn phases_by_number(&self, track: Track) -> Result<Vec<Phase>, CurriculumError> {
        let curriculum = self.load(track)?;
        Ok(curriculum
            .phases_by_number()
            .into_iter()
            .map(|phase| {
                let mut phase = phase.clone();
                phase.activities.sort_by_key(|a| a.order);
                phase
            })
            .collect())
    }

    pub fn phase(&self, track: Track, phase_id: Uuid) -> Result<Phase, CurriculumError> {
        self.load(track)?
            .phase(phase_id)
            .cloned()
            .ok_or(CurriculumError::PhaseNotFound { track, phase_id })
    }

    /// Catalog entry for an activity, if the phase still lists it.
    pub fn activity(
        &self,
        track: Track,
        phase_id: Uuid,
        activity_id: Uuid,
    ) -> Result<Option<Activity>, CurriculumError> {
        let phase = self.phase(track, phase_id)?;
        Ok(phase.activity(activity_id).cloned())
    }

    /// The phase unlocked after `phase_id` in the same track, if any.
    pub fn next_phase(&self, track: Track, phase_id: Uuid) -> Result<Option<Phase>, CurriculumError> {
        let curriculum = self.load(track)?;
        if curriculum.phase(phase_id).is_none() {
            return Err(CurriculumError::PhaseNotFound { track, phase_id });
        }
        Ok(curriculum.next_after(phase_id).cloned())
    }

    /// Change a phase's unlock order and persist.
    pub fn reorder(&self, track: Track, phase_id: Uuid, new_order: u32) -> Result<(), CurriculumError> {
        let mut curriculum = self.load(track)?;
        curriculum.reorder(phase_id, new_order)?;
        self.save(&curriculum)?;
        tracing::info!(%track, %phase_id, new_order, "phase reordered");
        Ok(())
    }

    fn track_file(&self, track: Track) -> PathBuf {
        self.dir.join(format!("{}.json", track))
    }
}
