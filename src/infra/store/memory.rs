//! In-memory session store for development and testing.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::core::{Credentials, Session, SessionStore, StoreError};

/// Process-local session store. Nothing survives a restart.
#[derive(Default)]
pub struct InMemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl InMemorySessionStore {
    /// Create an empty (logged-out) store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn read(&self) -> Option<Session> {
        self.session.read().clone()
    }

    async fn start(&self, session: Session) -> Result<(), StoreError> {
        *self.session.write() = Some(session);
        Ok(())
    }

    async fn write_credentials(&self, credentials: Credentials) -> Result<(), StoreError> {
        let mut guard = self.session.write();
        match guard.as_mut() {
            Some(session) => {
                session.credentials = credentials;
                Ok(())
            }
            None => Err(StoreError::Invalid(
                "no session to update credentials for".into(),
            )),
        }
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.session.write() = None;
        Ok(())
    }
}
