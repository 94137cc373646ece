//! Single-flight token-refresh gate.
//!
//! [`SessionGate`] wraps a [`Transport`] so that any request rejected with
//! the expired-credential sentinel (403) triggers exactly one token refresh,
//! no matter how many callers hit the sentinel concurrently. Callers that
//! arrive while a refresh is in flight are parked: requests that have not
//! been attempted yet wait for the gate to reopen, requests that already saw
//! the sentinel are queued and re-issued by the refresher itself, in arrival
//! order, with the new access token.
//!
//! A refresh failure is terminal: every parked caller is settled with
//! [`ApiError::SessionExpired`], the session store is cleared, and the gate
//! reopens. Nothing is retried and no caller is left waiting.
//!
//! The gate has no opinion on non-authorization outcomes: transport errors
//! and other HTTP statuses pass through untouched on the fast path.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::core::{
    ApiError, ApiRequest, ApiResponse, Credentials, RefreshError, SessionStore, TokenRefresher,
    Transport, UserId,
};

/// Tunables for the gate.
#[derive(Debug, Clone)]
pub struct GateOptions {
    /// Upper bound on the refresh call. Expiry counts as a refresh failure;
    /// without it a hung refresh would park every caller indefinitely.
    pub refresh_timeout: Duration,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            refresh_timeout: Duration::from_secs(10),
        }
    }
}

/// One caller's request parked while a refresh is in flight. Owned by the
/// queue from creation until its slot is settled; never silently dropped.
struct PendingRequest {
    id: Uuid,
    request: ApiRequest,
    slot: oneshot::Sender<Result<ApiResponse, ApiError>>,
}

/// Gate bookkeeping. Flag and queue live behind one mutex so that deciding
/// between "become the refresher" and "enqueue" is a single atomic step.
struct GateState {
    refreshing: bool,
    queue: VecDeque<PendingRequest>,
}

struct GateInner<T, R, S> {
    transport: Arc<T>,
    refresher: Arc<R>,
    store: Arc<S>,
    state: Mutex<GateState>,
    /// Signaled whenever the gate reopens, waking `wait_until_open` parkers.
    reopened: Notify,
    refresh_timeout: Duration,
}

/// Serializes concurrent API calls behind a single-flight token refresh.
///
/// Cheap to clone; all clones share the same gate state. Constructed once at
/// the composition root and handed to every API façade operation.
pub struct SessionGate<T, R, S> {
    inner: Arc<GateInner<T, R, S>>,
}

impl<T, R, S> Clone for SessionGate<T, R, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, R, S> SessionGate<T, R, S>
where
    T: Transport,
    R: TokenRefresher,
    S: SessionStore,
{
    /// Create a gate over the given collaborators.
    pub fn new(transport: Arc<T>, refresher: Arc<R>, store: Arc<S>, options: GateOptions) -> Self {
        Self {
            inner: Arc::new(GateInner {
                transport,
                refresher,
                store,
                state: Mutex::new(GateState {
                    refreshing: false,
                    queue: VecDeque::new(),
                }),
                reopened: Notify::new(),
                refresh_timeout: options.refresh_timeout,
            }),
        }
    }

    /// Perform `request` with automatic reauthentication.
    ///
    /// Drop-in replacement for a direct [`Transport::send`]: the result is
    /// identical to what the transport would produce, except that a 403 is
    /// transparently retried once behind a coordinated token refresh. Only a
    /// failed refresh surfaces differently, as [`ApiError::SessionExpired`].
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let request_id = Uuid::new_v4();
        self.wait_until_open().await;

        let access_token = self
            .inner
            .store
            .read()
            .await
            .map(|session| session.credentials.access_token);
        let first_attempt = self
            .inner
            .transport
            .send(&request, access_token.as_deref())
            .await;

        match first_attempt {
            Ok(response) if response.is_auth_expired() => {
                self.reauthorize(request_id, request).await
            }
            other => {
                tracing::trace!(%request_id, path = %request.path, "fast path");
                other.map_err(ApiError::Transport)
            }
        }
    }

    /// Park until no refresh is in flight. Requests that have not been
    /// attempted yet wait here instead of hammering the server with calls
    /// doomed to fail on stale credentials.
    async fn wait_until_open(&self) {
        loop {
            let reopened = self.inner.reopened.notified();
            tokio::pin!(reopened);
            // Register for the wakeup before checking the flag, so a reopen
            // between the check and the await cannot be missed.
            reopened.as_mut().enable();
            if !self.inner.state.lock().refreshing {
                return;
            }
            reopened.await;
        }
    }

    /// Handle a 403: become the sole refresher, or queue behind the one in
    /// flight. Decided under a single lock acquisition.
    async fn reauthorize(
        &self,
        request_id: Uuid,
        request: ApiRequest,
    ) -> Result<ApiResponse, ApiError> {
        let parked = {
            let mut state = self.inner.state.lock();
            if state.refreshing {
                let (slot, settled) = oneshot::channel();
                state.queue.push_back(PendingRequest {
                    id: request_id,
                    request: request.clone(),
                    slot,
                });
                Some(settled)
            } else {
                state.refreshing = true;
                None
            }
        };

        match parked {
            Some(settled) => {
                tracing::debug!(%request_id, "refresh already in flight, queued");
                // The refresher settles every slot; a dropped sender would
                // mean it died mid-cycle, which ends the session anyway.
                settled.await.unwrap_or(Err(ApiError::SessionExpired))
            }
            None => self.run_refresh_cycle(request_id, request).await,
        }
    }

    /// The refresher's whole cycle: refresh, persist, retry the original
    /// request, drain the queue, reopen the gate.
    async fn run_refresh_cycle(
        &self,
        request_id: Uuid,
        request: ApiRequest,
    ) -> Result<ApiResponse, ApiError> {
        tracing::info!(%request_id, "access token rejected, starting refresh");

        // Reopens the gate and settles any queued slot even if this future
        // is dropped mid-refresh; no caller may be left parked forever.
        let mut reopen = ReopenOnDrop {
            state: &self.inner.state,
            reopened: &self.inner.reopened,
            armed: true,
        };

        match self.invoke_refresh().await {
            Ok(credentials) => {
                if let Err(error) = self
                    .inner
                    .store
                    .write_credentials(credentials.clone())
                    .await
                {
                    tracing::error!(%error, "failed to persist refreshed credentials");
                    self.fail_session().await;
                    reopen.armed = false;
                    return Err(ApiError::SessionExpired);
                }
                tracing::info!("token refresh succeeded");

                let retried = self
                    .inner
                    .transport
                    .send(&request, Some(&credentials.access_token))
                    .await
                    .map_err(ApiError::Transport);

                self.drain_queue(&credentials.access_token).await;
                reopen.armed = false;
                self.inner.reopened.notify_waiters();
                retried
            }
            Err(error) => {
                tracing::warn!(%error, "token refresh failed, ending session");
                self.fail_session().await;
                reopen.armed = false;
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// Invoke the refresh operation with the stored refresh token, bounded
    /// by the configured timeout.
    async fn invoke_refresh(&self) -> Result<Credentials, RefreshError> {
        let session = self
            .inner
            .store
            .read()
            .await
            .ok_or(RefreshError::NoSession)?;
        let user_id: UserId = session.identity.user_id;

        let refresh = self
            .inner
            .refresher
            .refresh(&session.credentials.refresh_token, user_id);
        match tokio::time::timeout(self.inner.refresh_timeout, refresh).await {
            Ok(outcome) => outcome,
            Err(_) => Err(RefreshError::Timeout),
        }
    }

    /// Re-issue queued requests FIFO with the new access token and settle
    /// each slot with its own result. Loops until the queue is observably
    /// empty, then clears the refreshing flag — all before the gate reopens,
    /// so no later arrival can overtake a queued caller.
    async fn drain_queue(&self, access_token: &str) {
        loop {
            let batch = {
                let mut state = self.inner.state.lock();
                if state.queue.is_empty() {
                    state.refreshing = false;
                    break;
                }
                std::mem::take(&mut state.queue)
            };
            for pending in batch {
                let result = self
                    .inner
                    .transport
                    .send(&pending.request, Some(access_token))
                    .await
                    .map_err(ApiError::Transport);
                tracing::debug!(request_id = %pending.id, "settling queued request after refresh");
                let _ = pending.slot.send(result);
            }
        }
    }

    /// Terminal path: settle every queued caller with the session-expired
    /// error, clear the store, reopen the gate.
    async fn fail_session(&self) {
        let drained = {
            let mut state = self.inner.state.lock();
            state.refreshing = false;
            std::mem::take(&mut state.queue)
        };
        for pending in drained {
            tracing::debug!(request_id = %pending.id, "settling queued request with session end");
            let _ = pending.slot.send(Err(ApiError::SessionExpired));
        }
        if let Err(error) = self.inner.store.clear().await {
            tracing::error!(%error, "failed to clear session store");
        }
        self.inner.reopened.notify_waiters();
    }
}

/// Backstop releasing the gate if the refreshing caller's future is dropped.
struct ReopenOnDrop<'a> {
    state: &'a Mutex<GateState>,
    reopened: &'a Notify,
    armed: bool,
}

impl Drop for ReopenOnDrop<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let drained = {
            let mut state = self.state.lock();
            state.refreshing = false;
            std::mem::take(&mut state.queue)
        };
        for pending in drained {
            let _ = pending.slot.send(Err(ApiError::SessionExpired));
        }
        self.reopened.notify_waiters();
    }
}
