//! Session store backends.

pub mod file;
pub mod memory;

use async_trait::async_trait;

use crate::core::{Credentials, Session, SessionStore, StoreError};

pub use file::FileSessionStore;
pub use memory::InMemorySessionStore;

/// Store backend chosen from configuration.
pub enum ConfiguredStore {
    /// Process-local store.
    Memory(InMemorySessionStore),
    /// JSON-file store.
    File(FileSessionStore),
}

#[async_trait]
impl SessionStore for ConfiguredStore {
    async fn read(&self) -> Option<Session> {
        match self {
            Self::Memory(store) => store.read().await,
            Self::File(store) => store.read().await,
        }
    }

    async fn start(&self, session: Session) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.start(session).await,
            Self::File(store) => store.start(session).await,
        }
    }

    async fn write_credentials(&self, credentials: Credentials) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.write_credentials(credentials).await,
            Self::File(store) => store.write_credentials(credentials).await,
        }
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.clear().await,
            Self::File(store) => store.clear().await,
        }
    }
}
