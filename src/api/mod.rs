//! Typed API façade over the refresh gate.
//!
//! Every operation here is a thin mapping: build an [`ApiRequest`], run it
//! through [`SessionGate::execute`], decode the answer. The gate makes token
//! refreshes invisible; the only session-related outcome an operation can
//! surface is [`ApiError::SessionExpired`].

mod calendar;
mod models;
mod user;

pub use models::{
    BoardTask, CalendarData, KeyValue, LoginResponse, MachineId, MachineSchedule, PaperParams,
    TaskId, TaskSummary,
};

use std::sync::Arc;

use crate::core::{
    ApiError, ApiRequest, Identity, SessionGate, SessionStore, TokenRefresher, Transport,
};

/// Client for the scheduling-board API.
///
/// Holds the refresh gate plus direct handles to the transport (for the
/// login call, which happens before any session exists) and the session
/// store. Cheap to clone.
pub struct BoardClient<T, R, S> {
    gate: SessionGate<T, R, S>,
    transport: Arc<T>,
    store: Arc<S>,
}

impl<T, R, S> Clone for BoardClient<T, R, S> {
    fn clone(&self) -> Self {
        Self {
            gate: self.gate.clone(),
            transport: Arc::clone(&self.transport),
            store: Arc::clone(&self.store),
        }
    }
}

impl<T, R, S> BoardClient<T, R, S>
where
    T: Transport,
    R: TokenRefresher,
    S: SessionStore,
{
    /// Assemble a client from its collaborators. The transport and store
    /// must be the same instances the gate was built over.
    pub fn new(gate: SessionGate<T, R, S>, transport: Arc<T>, store: Arc<S>) -> Self {
        Self {
            gate,
            transport,
            store,
        }
    }

    /// The underlying gate, for callers issuing raw requests.
    pub fn gate(&self) -> &SessionGate<T, R, S> {
        &self.gate
    }

    /// Identity of the logged-in operator.
    pub async fn identity(&self) -> Result<Identity, ApiError> {
        self.store
            .read()
            .await
            .map(|session| session.identity)
            .ok_or(ApiError::SessionExpired)
    }

    /// Run a request through the gate and decode a typed answer.
    async fn run<D: serde::de::DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<D, ApiError> {
        let response = self.gate.execute(request).await?;
        if !response.is_success() {
            return Err(ApiError::Status(response.status));
        }
        response
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Run a request through the gate, expecting only success.
    async fn run_ok(&self, request: ApiRequest) -> Result<(), ApiError> {
        let response = self.gate.execute(request).await?;
        if !response.is_success() {
            return Err(ApiError::Status(response.status));
        }
        Ok(())
    }
}
