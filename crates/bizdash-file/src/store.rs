//! Session file storage.

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, instrument};

use bizdash_core::error::StorageError;
use bizdash_core::{CredentialStore, Result, Session};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Persists the session as a JSON document on disk.
///
/// Writes go to a temporary sibling and are renamed into place while an
/// exclusive lock on `<file>.lock` is held, so concurrent processes never
/// observe a half-written session. On Unix the file is created `0600`.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store backed by the file at `path`. Nothing is touched until
    /// the first read or write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn io_error(&self, err: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }

    fn lock(&self, exclusive: bool) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(|e| self.io_error(e))?;

        if exclusive {
            lock_file.lock_exclusive().map_err(|e| self.io_error(e))?;
        } else {
            lock_file.lock_shared().map_err(|e| self.io_error(e))?;
        }

        Ok(lock_file)
    }

    fn write_locked(&self, json: &str) -> Result<()> {
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, json).map_err(|e| self.io_error(e))?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&temp_path)
                .map_err(|e| self.io_error(e))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&temp_path, perms).map_err(|e| self.io_error(e))?;
        }

        fs::rename(&temp_path, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn get(&self) -> Result<Session> {
        let lock = self.lock(false)?;

        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No session file");
                return Ok(Session::empty());
            }
            Err(e) => return Err(self.io_error(e).into()),
        };

        lock.unlock().map_err(|e| self.io_error(e))?;

        let session = serde_json::from_str(&json).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        Ok(session)
    }

    #[instrument(skip(self, session), fields(path = %self.path.display()))]
    fn set(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_string_pretty(session).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let lock = self.lock(true)?;
        self.write_locked(&json)?;
        lock.unlock().map_err(|e| self.io_error(e))?;

        debug!("Session written");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn clear(&self) -> Result<()> {
        let lock = self.lock(true)?;

        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Session file removed"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(self.io_error(e).into()),
        }

        lock.unlock().map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizdash_core::error::Error;
    use bizdash_core::{AccessToken, RefreshToken, UserProfile};
    use tempfile::TempDir;

    fn session() -> Session {
        Session::new(AccessToken::new("access-1"), RefreshToken::new("refresh-1")).with_user(
            Some(UserProfile {
                id: 1,
                username: "alice".to_string(),
                email: Some("alice@example.com".to_string()),
                first_name: None,
                last_name: None,
            }),
        )
    }

    #[test]
    fn missing_file_is_logged_out() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("session.json"));
        assert!(store.get().unwrap().is_empty());
    }

    #[test]
    fn session_survives_a_new_store_instance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileCredentialStore::new(&path).set(&session()).unwrap();

        let loaded = FileCredentialStore::new(&path).get().unwrap();
        assert_eq!(loaded, session());
        assert!(loaded.is_authenticated());
    }

    #[test]
    fn stored_under_access_and_refresh_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("session.json"));
        store.set(&session()).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["access"], "access-1");
        assert_eq!(value["refresh"], "refresh-1");
    }

    #[test]
    fn clear_removes_file_and_is_repeatable() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("session.json"));
        store.set(&session()).unwrap();

        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.get().unwrap().is_empty());

        store.clear().unwrap();
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let err = FileCredentialStore::new(&path).get().unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Corrupt { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_private() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("session.json"));
        store.set(&session()).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
