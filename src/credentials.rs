//! Local credential store.
//!
//! Holds the logged-in identity under three namespaced keys. The file
//! backend keeps them in a small YAML map:
//!
//! ```yaml
//! "@loggedInUserID:id": u1
//! "@loggedInUserID:key": 9f3c...
//! "@loggedInUserID:password": secret
//! ```

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use uuid::Uuid;

use crate::models::Identity;

pub const ID_KEY: &str = "@loggedInUserID:id";
pub const AUTH_KEY: &str = "@loggedInUserID:key";
pub const PASSWORD_KEY: &str = "@loggedInUserID:password";

/// Every key the identity occupies.
pub const IDENTITY_KEYS: [&str; 3] = [ID_KEY, AUTH_KEY, PASSWORD_KEY];

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("I/O error for {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("Failed to parse credential file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Failed to serialize credentials: {0}")]
    Serialize(#[from] serde_yaml::Error),
    #[error("Credential store unavailable: {0}")]
    Unavailable(String),
}

/// String key-value storage for the logged-in identity.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, CredentialError>> + Send;

    fn set(&self, key: &str, value: &str)
        -> impl Future<Output = Result<(), CredentialError>> + Send;

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), CredentialError>> + Send;

    /// Reads the stored identity. A partially stored identity reads as `None`.
    fn load_identity(
        &self,
    ) -> impl Future<Output = Result<Option<Identity>, CredentialError>> + Send {
        async move {
            let id = self.get(ID_KEY).await?;
            let key = self.get(AUTH_KEY).await?;
            let password = self.get(PASSWORD_KEY).await?;
            match (id, key, password) {
                (Some(id), Some(key), Some(password)) => Ok(Some(Identity { id, key, password })),
                (None, None, None) => Ok(None),
                _ => {
                    tracing::warn!("Ignoring partially stored identity");
                    Ok(None)
                }
            }
        }
    }

    fn save_identity(
        &self,
        identity: &Identity,
    ) -> impl Future<Output = Result<(), CredentialError>> + Send {
        async move {
            self.set(ID_KEY, &identity.id).await?;
            self.set(AUTH_KEY, &identity.key).await?;
            self.set(PASSWORD_KEY, &identity.password).await?;
            Ok(())
        }
    }

    /// Removes all three identity keys, or none of them.
    ///
    /// If a removal fails, keys already removed are written back before the
    /// error is returned.
    fn clear_identity(&self) -> impl Future<Output = Result<(), CredentialError>> + Send {
        async move {
            let mut snapshot = Vec::with_capacity(IDENTITY_KEYS.len());
            for key in IDENTITY_KEYS {
                snapshot.push((key, self.get(key).await?));
            }

            for (index, (key, _)) in snapshot.iter().enumerate() {
                if let Err(e) = self.remove(key).await {
                    for (restored_key, value) in &snapshot[..index] {
                        if let Some(value) = value {
                            if let Err(restore_err) = self.set(restored_key, value).await {
                                tracing::error!(
                                    key = restored_key,
                                    "Failed to restore credential after aborted logout: {}",
                                    restore_err
                                );
                            }
                        }
                    }
                    return Err(e);
                }
            }
            Ok(())
        }
    }
}

/// Credentials kept in a YAML file, rewritten atomically on every change.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Default file name inside a data directory.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("credentials.yaml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> CredentialError {
        CredentialError::Io {
            path: self.path.clone(),
            source,
        }
    }

    async fn read_map(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_yaml::from_str(&contents).map_err(|source| {
                CredentialError::Parse {
                    path: self.path.clone(),
                    source,
                }
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    async fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let yaml = serde_yaml::to_string(map)?;

        // Write atomically using temp file + rename
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = self
            .path
            .with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()));
        tokio::fs::write(&temp_path, yaml)
            .await
            .map_err(|e| self.io_error(e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(|e| self.io_error(e))?;
        }

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| self.io_error(e))
    }

    async fn modify(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, String>) + Send,
    ) -> Result<(), CredentialError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        change(&mut map);
        self.write_map(&map).await
    }
}

impl CredentialStore for FileCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_map().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        self.modify(|map| {
            map.insert(key.to_string(), value.to_string());
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), CredentialError> {
        self.modify(|map| {
            map.remove(key);
        })
        .await
    }

    async fn save_identity(&self, identity: &Identity) -> Result<(), CredentialError> {
        self.modify(|map| {
            map.insert(ID_KEY.to_string(), identity.id.clone());
            map.insert(AUTH_KEY.to_string(), identity.key.clone());
            map.insert(PASSWORD_KEY.to_string(), identity.password.clone());
        })
        .await
    }

    /// One atomic rewrite drops all three keys together.
    async fn clear_identity(&self) -> Result<(), CredentialError> {
        self.modify(|map| {
            for key in IDENTITY_KEYS {
                map.remove(key);
            }
        })
        .await
    }
}

/// Process-local credentials, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, CredentialError> {
        self.entries
            .lock()
            .map_err(|_| CredentialError::Unavailable("credential map poisoned".to_string()))
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        Ok(self.entries()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CredentialError> {
        self.entries()?.remove(key);
        Ok(())
    }
}
