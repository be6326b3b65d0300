use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::token_storage::restrict_permissions;
use crate::error::AuthError;

/// Device identifier generated once per installation and sent with every auth
/// call so the backend can bind refresh credentials to a device.
pub struct DeviceIdStore {
    device_id_path: PathBuf,
}

impl DeviceIdStore {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, AuthError> {
        let dir = dir.as_ref();

        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }

        Ok(Self {
            device_id_path: dir.join("device_id"),
        })
    }

    pub fn load_or_create(&self) -> Result<String, AuthError> {
        if self.device_id_path.exists() {
            let existing = fs::read_to_string(&self.device_id_path)?.trim().to_string();
            if !existing.is_empty() {
                return Ok(existing);
            }
            tracing::warn!("Device id file was empty, generating a new id");
        }

        let device_id = Uuid::new_v4().to_string();
        fs::write(&self.device_id_path, &device_id)?;
        restrict_permissions(&self.device_id_path)?;

        Ok(device_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_is_generated_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = DeviceIdStore::new(dir.path()).unwrap();

        let first = store.load_or_create().unwrap();
        let second = DeviceIdStore::new(dir.path())
            .unwrap()
            .load_or_create()
            .unwrap();

        assert_eq!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[test]
    fn empty_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("device_id"), "  \n").unwrap();

        let id = DeviceIdStore::new(dir.path())
            .unwrap()
            .load_or_create()
            .unwrap();
        assert!(!id.is_empty());
    }
}
