//! Durable mirror of the session
//!
//! `TokenStore` writes the display name and the bearer token as two string
//! entries of a key/value [`Storage`], the same shape browser local storage
//! has. Nothing here validates the token; the backend is the only judge.

use crate::auth::session::Session;
use crate::constants::{APP_DIR_NAME, DISPLAY_NAME_KEY, TOKEN_KEY};
use crate::errors::StorageError;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Key/value string storage
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing a key that is not there is not an error
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Storage backed by one file per key
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

/// `<config_dir>/secondbrain`, or a dot-directory in the working dir
pub fn default_storage_dir() -> PathBuf {
    match dirs::config_dir() {
        Some(config_dir) => config_dir.join(APP_DIR_NAME),
        None => PathBuf::from(format!(".{}", APP_DIR_NAME)),
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        // Owner read/write only, the token is a credential
        #[cfg(unix)]
        {
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
            options.mode(0o600);
            // An existing file keeps its mode on open
            if path.exists() {
                std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
            }
        }

        let mut file = options.open(&path)?;
        file.write_all(value.as_bytes())?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage, lost on exit
///
/// Writes can be made to fail with [`MemoryStorage::set_unavailable`], which
/// is how storage outages are simulated.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn items(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected(key.to_string()));
        }
        self.items().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected(key.to_string()));
        }
        self.items().remove(key);
        Ok(())
    }
}

/// Persists the session as two entries of a [`Storage`]
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn Storage>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        self.storage.set_item(TOKEN_KEY, &session.bearer_token)?;
        self.storage.set_item(DISPLAY_NAME_KEY, &session.display_name)?;
        Ok(())
    }

    /// A session only if both entries are present and non-empty
    pub fn load(&self) -> Result<Option<Session>, StorageError> {
        let token = self.storage.get_item(TOKEN_KEY)?;
        let name = self.storage.get_item(DISPLAY_NAME_KEY)?;

        Ok(match (name, token) {
            (Some(name), Some(token)) if !name.is_empty() && !token.is_empty() => {
                Some(Session::new(name, token))
            }
            _ => None,
        })
    }

    /// Removes both entries, attempting the second even if the first fails
    pub fn clear(&self) -> Result<(), StorageError> {
        let token = self.storage.remove_item(TOKEN_KEY);
        let name = self.storage.remove_item(DISPLAY_NAME_KEY);
        token.and(name)
    }
}
