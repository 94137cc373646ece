//! JSON-file session store: survives application restarts.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::core::{Credentials, Session, SessionStore, StoreError};

/// Durable session store backed by a JSON file.
///
/// Reads are served from an in-memory cache; every mutation is persisted
/// before it is acknowledged. [`FileSessionStore::load`] restores a prior
/// session at startup, `clear` removes the file.
pub struct FileSessionStore {
    path: PathBuf,
    cached: RwLock<Option<Session>>,
}

impl FileSessionStore {
    /// Open a store at `path`, restoring the persisted session if one exists.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let cached = match tokio::fs::read(&path).await {
            Ok(bytes) => Some(
                serde_json::from_slice(&bytes)
                    .map_err(|e| StoreError::Invalid(e.to_string()))?,
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };
        Ok(Self {
            path,
            cached: RwLock::new(cached),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, session: &Session) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Io(e.to_string()))?;
        }

        let content =
            serde_json::to_vec_pretty(session).map_err(|e| StoreError::Invalid(e.to_string()))?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;

        // Credentials on disk: keep the file private to the operator.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&self.path, perms)
                .await
                .map_err(|e| StoreError::Io(e.to_string()))?;
        }

        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn read(&self) -> Option<Session> {
        self.cached.read().clone()
    }

    async fn start(&self, session: Session) -> Result<(), StoreError> {
        self.persist(&session).await?;
        *self.cached.write() = Some(session);
        Ok(())
    }

    async fn write_credentials(&self, credentials: Credentials) -> Result<(), StoreError> {
        let updated = {
            let guard = self.cached.read();
            let mut session = guard.clone().ok_or_else(|| {
                StoreError::Invalid("no session to update credentials for".into())
            })?;
            session.credentials = credentials;
            session
        };
        self.persist(&updated).await?;
        *self.cached.write() = Some(updated);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.cached.write() = None;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e.to_string())),
        }
    }
}
