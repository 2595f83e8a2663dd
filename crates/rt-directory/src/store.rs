// store.rs — UserStore: one JSON file per user.
//
// Layout: `<users_dir>/<user_id>.json`. The directory is small (hundreds of
// users) so lookups by e-mail and role scan every record.

use std::fs;
use std::path::{Path, PathBuf};

use rt_curriculum::Track;
use uuid::Uuid;

use crate::error::DirectoryError;
use crate::user::{Role, User};

pub struct UserStore {
    dir: PathBuf,
}

impl UserStore {
    /// Open a store backed by the given directory, creating it if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| DirectoryError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Validate and store a new user. E-mails are unique, case-insensitively.
    pub fn register(&self, user: &User) -> Result<(), DirectoryError> {
        user.validate()?;
        let taken = self
            .list()?
            .iter()
            .any(|u| u.id != user.id && u.email.eq_ignore_ascii_case(&user.email));
        if taken {
            return Err(DirectoryError::DuplicateEmail(user.email.clone()));
        }
        self.save(user)?;
        tracing::info!(user_id = %user.id, role = %user.role, track = %user.track, "user registered");
        Ok(())
    }

    /// Write a user record (creates or overwrites).
    pub fn save(&self, user: &User) -> Result<(), DirectoryError> {
        let path = self.user_file(user.id);
        let json = serde_json::to_string_pretty(user)?;
        fs::write(&path, json).map_err(|source| DirectoryError::Io { path, source })?;
        Ok(())
    }

    pub fn get(&self, user_id: Uuid) -> Result<Option<User>, DirectoryError> {
        let path = self.user_file(user_id);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path).map_err(|source| DirectoryError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Like [`get`](Self::get), but a missing user is an error.
    pub fn require(&self, user_id: Uuid) -> Result<User, DirectoryError> {
        self.get(user_id)?.ok_or(DirectoryError::NotFound(user_id))
    }

    /// All users, sorted by name.
    pub fn list(&self) -> Result<Vec<User>, DirectoryError> {
        let mut users = Vec::new();
        let entries = fs::read_dir(&self.dir).map_err(|source| DirectoryError::Io {
            path: self.dir.clone(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| DirectoryError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let json = fs::read_to_string(&path).map_err(|source| DirectoryError::Io {
                    path: path.clone(),
                    source,
                })?;
                match serde_json::from_str::<User>(&json) {
                    Ok(user) => users.push(user),
                    Err(e) => tracing::warn!("skipping unreadable user file {}: {}", path.display(), e),
                }
            }
        }

        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    pub fn list_by_role(&self, role: Role) -> Result<Vec<User>, DirectoryError> {
        Ok(self.list()?.into_iter().filter(|u| u.role == role).collect())
    }

    /// Tutors assigned to a hospital and specialty.
    pub fn tutors_of(&self, hospital: &str, specialty: &str) -> Result<Vec<User>, DirectoryError> {
        Ok(self
            .list_by_role(Role::Tutor)?
            .into_iter()
            .filter(|u| {
                u.hospital.as_deref() == Some(hospital) && u.specialty.as_deref() == Some(specialty)
            })
            .collect())
    }

    /// Professors of a society.
    pub fn professors_of(&self, society: &str) -> Result<Vec<User>, DirectoryError> {
        Ok(self
            .list_by_role(Role::Professor)?
            .into_iter()
            .filter(|u| u.society.as_deref() == Some(society) && u.track == Track::Society)
            .collect())
    }

    fn user_file(&self, user_id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tutor(name: &str, hospital: &str, specialty: &str) -> User {
        User::new(name, format!("{}@h.org", name.to_lowercase()), Role::Tutor)
            .with_hospital(hospital, specialty, "centro")
    }

    #[test]
    fn register_and_get() {
        let dir = tempdir().unwrap();
        let store = UserStore::new(dir.path().join("users")).unwrap();
        let user = tutor("Gil", "La Paz", "urology");
        store.register(&user).unwrap();

        let found = store.get(user.id).unwrap().unwrap();
        assert_eq!(found, user);
    }

    #[test]
    fn require_missing_user_is_not_found() {
        let dir = tempdir().unwrap();
        let store = UserStore::new(dir.path()).unwrap();
        let err = store.require(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DirectoryError::NotFound(_)));
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let dir = tempdir().unwrap();
        let store = UserStore::new(dir.path()).unwrap();
        store.register(&tutor("Gil", "La Paz", "urology")).unwrap();

        let mut twin = tutor("Gil", "Clinic", "urology");
        twin.email = "GIL@h.org".to_string();
        let err = store.register(&twin).unwrap_err();
        assert!(matches!(err, DirectoryError::DuplicateEmail(_)));
    }

    #[test]
    fn invalid_user_is_not_stored() {
        let dir = tempdir().unwrap();
        let store = UserStore::new(dir.path()).unwrap();
        let user = User::new("Ana", "ana@h.org", Role::Resident);
        assert!(store.register(&user).is_err());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn tutors_filtered_by_hospital_and_specialty() {
        let dir = tempdir().unwrap();
        let store = UserStore::new(dir.path()).unwrap();
        store.register(&tutor("Gil", "La Paz", "urology")).unwrap();
        store.register(&tutor("Ruiz", "La Paz", "gynecology")).unwrap();
        store.register(&tutor("Sanz", "Clinic", "urology")).unwrap();

        let found = store.tutors_of("La Paz", "urology").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Gil");
    }

    #[test]
    fn professors_filtered_by_society() {
        let dir = tempdir().unwrap();
        let store = UserStore::new(dir.path()).unwrap();
        let p1 = User::new("Prof A", "a@s.org", Role::Professor).with_society("SEC");
        let p2 = User::new("Prof B", "b@s.org", Role::Professor).with_society("AEU");
        store.register(&p1).unwrap();
        store.register(&p2).unwrap();

        let found = store.professors_of("SEC").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, p1.id);
    }
}
