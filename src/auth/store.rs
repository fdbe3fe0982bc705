//! Durable storage for the single bearer credential. A dumb, synchronous
//! key-value surface over one token file: a missing file is the normal
//! anonymous state, not an error. No expiry logic lives here.

use crate::error::Result;
use secrecy::{ExposeSecret, SecretString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Well-known location of the token file, `<config dir>/forumo/token`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .map(|base| base.join("forumo").join("token"))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persists the credential, replacing any previous one. The file is
    /// restricted to owner read/write on unix.
    ///
    /// # Errors
    /// Returns an error if the file or its parent directory cannot be written.
    pub fn save(&self, token: &SecretString) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token.expose_secret())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut permissions = fs::metadata(&self.path)?.permissions();
            permissions.set_mode(0o600);
            fs::set_permissions(&self.path, permissions)?;
        }

        Ok(())
    }

    /// Loads the stored credential. `None` when no credential is stored.
    ///
    /// # Errors
    /// Returns an error only on genuine I/O failure, never for absence.
    pub fn load(&self) -> Result<Option<SecretString>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(SecretString::from(trimmed.to_string())))
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Removes the stored credential. Removing an already-empty store is
    /// not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("forumo").join("token"))
    }

    #[test]
    fn load_on_fresh_path_is_empty() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = store_in(&dir);

        assert!(store.load().expect("Failed to load").is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = store_in(&dir);

        store
            .save(&SecretString::from("tok-123".to_string()))
            .expect("Failed to save");

        let loaded = store.load().expect("Failed to load").expect("missing token");
        assert_eq!(loaded.expose_secret(), "tok-123");
    }

    #[test]
    fn save_replaces_previous_credential() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = store_in(&dir);

        store
            .save(&SecretString::from("first".to_string()))
            .expect("Failed to save");
        store
            .save(&SecretString::from("second".to_string()))
            .expect("Failed to save");

        let loaded = store.load().expect("Failed to load").expect("missing token");
        assert_eq!(loaded.expose_secret(), "second");
    }

    #[test]
    fn clear_empties_the_store_and_is_idempotent() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = store_in(&dir);

        store
            .save(&SecretString::from("tok-123".to_string()))
            .expect("Failed to save");
        store.clear().expect("Failed to clear");
        store.clear().expect("Failed to clear twice");

        assert!(store.load().expect("Failed to load").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = store_in(&dir);

        store
            .save(&SecretString::from("tok-123".to_string()))
            .expect("Failed to save");

        let mode = fs::metadata(store.path())
            .expect("Failed to stat")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
