use crate::common::SessionRecord;
use crate::error::AuthError;
use std::fs;
use std::path::{Path, PathBuf};

const RECORD_FILE: &str = "session.json";
const LOGGED_OUT_FILE: &str = "logged_out";

/// Durable storage for the minimal session record and the logged-out sentinel.
///
/// The access token never reaches this store.
#[derive(Debug, Clone)]
pub struct SessionRecordStore {
    record_path: PathBuf,
    sentinel_path: PathBuf,
}

impl SessionRecordStore {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, AuthError> {
        let dir = dir.as_ref();

        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| {
                AuthError::Storage(format!("Failed to create storage directory: {}", e))
            })?;
        }

        Ok(Self {
            record_path: dir.join(RECORD_FILE),
            sentinel_path: dir.join(LOGGED_OUT_FILE),
        })
    }

    pub fn save_record(&self, record: &SessionRecord) -> Result<(), AuthError> {
        let json = serde_json::to_string_pretty(record)?;

        fs::write(&self.record_path, json)
            .map_err(|e| AuthError::Storage(format!("Failed to save session record: {}", e)))?;

        restrict_permissions(&self.record_path)
    }

    pub fn load_record(&self) -> Result<Option<SessionRecord>, AuthError> {
        if !self.record_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.record_path)
            .map_err(|e| AuthError::Storage(format!("Failed to read session record: {}", e)))?;

        let record: SessionRecord = serde_json::from_str(&json)?;
        Ok(Some(record))
    }

    pub fn delete_record(&self) -> Result<(), AuthError> {
        remove_if_exists(&self.record_path)
    }

    pub fn mark_logged_out(&self) -> Result<(), AuthError> {
        fs::write(&self.sentinel_path, b"1")
            .map_err(|e| AuthError::Storage(format!("Failed to write logout flag: {}", e)))
    }

    pub fn clear_logged_out(&self) -> Result<(), AuthError> {
        remove_if_exists(&self.sentinel_path)
    }

    pub fn is_logged_out(&self) -> bool {
        self.sentinel_path.exists()
    }
}

fn remove_if_exists(path: &Path) -> Result<(), AuthError> {
    if path.exists() {
        fs::remove_file(path)
            .map_err(|e| AuthError::Storage(format!("Failed to delete {}: {}", path.display(), e)))?;
    }
    Ok(())
}

/// Owner read/write only.
pub(crate) fn restrict_permissions(path: &Path) -> Result<(), AuthError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)
            .map_err(|e| AuthError::Storage(format!("Failed to get file permissions: {}", e)))?
            .permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)
            .map_err(|e| AuthError::Storage(format!("Failed to set file permissions: {}", e)))?;
    }
    #[cfg(not(unix))]
    let _ = path;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn record() -> SessionRecord {
        SessionRecord {
            username: "ana".to_string(),
            roles: BTreeSet::from(["HR".to_string()]),
            company_id: None,
            expires_at: None,
        }
    }

    #[test]
    fn record_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionRecordStore::new(dir.path()).unwrap();

        assert_eq!(store.load_record().unwrap(), None);
        store.save_record(&record()).unwrap();
        assert_eq!(store.load_record().unwrap(), Some(record()));

        store.delete_record().unwrap();
        assert_eq!(store.load_record().unwrap(), None);
        // Deleting twice is fine
        store.delete_record().unwrap();
    }

    #[test]
    fn sentinel_toggles() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionRecordStore::new(dir.path().join("nested")).unwrap();

        assert!(!store.is_logged_out());
        store.mark_logged_out().unwrap();
        assert!(store.is_logged_out());
        store.clear_logged_out().unwrap();
        assert!(!store.is_logged_out());
    }

    #[cfg(unix)]
    #[test]
    fn record_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = SessionRecordStore::new(dir.path()).unwrap();
        store.save_record(&record()).unwrap();

        let mode = fs::metadata(dir.path().join(RECORD_FILE))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
