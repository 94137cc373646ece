//! Integration tests for the session gate's refresh coordination.
//!
//! These tests validate:
//! 1. The fast path returns transport results unchanged, with no refresh
//! 2. Concurrent 403s coalesce into exactly one refresh call
//! 3. Queued callers are settled in arrival order with the new token
//! 4. Refresh failure fans out to every parked caller and ends the session
//! 5. Requests arriving mid-refresh wait and never use stale credentials

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use pressboard_client::core::{
    ApiError, ApiRequest, ApiResponse, Credentials, GateOptions, Identity, RefreshError, Session,
    SessionGate, SessionStore, StoreError, TokenRefresher, Transport, TransportError, UserId,
};
use pressboard_client::infra::store::InMemorySessionStore;

// ============================================================================
// Mock server, transport, and refresher
// ============================================================================

/// Shared picture of the "server": which access token it currently accepts,
/// what the next refresh will hand out, and every request it saw.
struct ServerState {
    valid_access: String,
    next_pair: (String, String),
    sent: Vec<(String, Option<String>)>,
    forced_status: Option<u16>,
    fail_transport: bool,
}

struct MockServer {
    state: Mutex<ServerState>,
    refresh_calls: AtomicUsize,
}

impl MockServer {
    fn new(valid_access: &str) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ServerState {
                valid_access: valid_access.to_owned(),
                next_pair: ("access-2".to_owned(), "refresh-2".to_owned()),
                sent: Vec::new(),
                forced_status: None,
                fail_transport: false,
            }),
            refresh_calls: AtomicUsize::new(0),
        })
    }

    fn sent(&self) -> Vec<(String, Option<String>)> {
        self.state.lock().sent.clone()
    }

    fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

/// Transport that answers 200 for the currently valid access token and 403
/// for anything else. A small latency keeps in-flight requests overlapping
/// the way real network calls do.
#[derive(Clone)]
struct MockTransport {
    server: Arc<MockServer>,
    latency: Duration,
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> Result<ApiResponse, TransportError> {
        {
            let mut state = self.server.state.lock();
            state
                .sent
                .push((request.path.clone(), access_token.map(str::to_owned)));
            if state.fail_transport {
                return Err(TransportError::Timeout);
            }
        }
        tokio::time::sleep(self.latency).await;

        let state = self.server.state.lock();
        if let Some(status) = state.forced_status {
            return Ok(ApiResponse {
                status,
                body: serde_json::Value::Null,
            });
        }
        if access_token == Some(state.valid_access.as_str()) {
            Ok(ApiResponse {
                status: 200,
                body: serde_json::json!({ "path": request.path }),
            })
        } else {
            Ok(ApiResponse {
                status: 403,
                body: serde_json::Value::Null,
            })
        }
    }
}

#[derive(Clone, Copy)]
enum RefreshBehavior {
    Succeed,
    FailTransport,
    Hang,
}

/// Refresher that rotates the server's accepted token after a delay, or
/// fails, or never resolves.
#[derive(Clone)]
struct MockRefresher {
    server: Arc<MockServer>,
    delay: Duration,
    behavior: RefreshBehavior,
}

#[async_trait]
impl TokenRefresher for MockRefresher {
    async fn refresh(
        &self,
        _refresh_token: &str,
        _user_id: UserId,
    ) -> Result<Credentials, RefreshError> {
        self.server.refresh_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        match self.behavior {
            RefreshBehavior::Succeed => {
                let mut state = self.server.state.lock();
                let (access, refresh) = state.next_pair.clone();
                state.valid_access = access.clone();
                Ok(Credentials {
                    access_token: access,
                    refresh_token: refresh,
                })
            }
            RefreshBehavior::FailTransport => {
                Err(RefreshError::Transport(TransportError::Timeout))
            }
            RefreshBehavior::Hang => {
                std::future::pending::<()>().await;
                Err(RefreshError::Timeout)
            }
        }
    }
}

/// Store wrapper counting `clear` calls.
struct CountingStore {
    inner: InMemorySessionStore,
    clears: AtomicUsize,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: InMemorySessionStore::new(),
            clears: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SessionStore for CountingStore {
    async fn read(&self) -> Option<Session> {
        self.inner.read().await
    }

    async fn start(&self, session: Session) -> Result<(), StoreError> {
        self.inner.start(session).await
    }

    async fn write_credentials(&self, credentials: Credentials) -> Result<(), StoreError> {
        self.inner.write_credentials(credentials).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.clear().await
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn stale_session() -> Session {
    Session {
        credentials: Credentials {
            access_token: "stale-access".into(),
            refresh_token: "refresh-1".into(),
        },
        identity: Identity {
            user_id: 7,
            org_id: 2,
            role: 1,
        },
    }
}

async fn logged_in_store() -> Arc<CountingStore> {
    let store = Arc::new(CountingStore::new());
    store.start(stale_session()).await.unwrap();
    store
}

fn make_gate(
    server: &Arc<MockServer>,
    store: &Arc<CountingStore>,
    behavior: RefreshBehavior,
    refresh_delay: Duration,
) -> SessionGate<MockTransport, MockRefresher, CountingStore> {
    let transport = Arc::new(MockTransport {
        server: Arc::clone(server),
        latency: Duration::from_millis(10),
    });
    let refresher = Arc::new(MockRefresher {
        server: Arc::clone(server),
        delay: refresh_delay,
        behavior,
    });
    SessionGate::new(
        transport,
        refresher,
        Arc::clone(store),
        GateOptions {
            refresh_timeout: Duration::from_secs(5),
        },
    )
}

// ============================================================================
// Fast path
// ============================================================================

#[tokio::test]
async fn test_fast_path_no_refresh() {
    let server = MockServer::new("stale-access");
    let store = logged_in_store().await;
    let gate = make_gate(&server, &store, RefreshBehavior::Succeed, Duration::ZERO);

    let response = gate
        .execute(ApiRequest::get("/getCalendar/?userId=7"))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body["path"], "/getCalendar/?userId=7");
    assert_eq!(server.refresh_calls(), 0);
    assert_eq!(server.sent().len(), 1);
}

#[tokio::test]
async fn test_non_auth_status_passes_through() {
    let server = MockServer::new("stale-access");
    server.state.lock().forced_status = Some(500);
    let store = logged_in_store().await;
    let gate = make_gate(&server, &store, RefreshBehavior::Succeed, Duration::ZERO);

    let response = gate.execute(ApiRequest::get("/broken")).await.unwrap();

    // A 500 is the caller's problem, not the gate's: no refresh, no retry.
    assert_eq!(response.status, 500);
    assert_eq!(server.refresh_calls(), 0);
    assert_eq!(server.sent().len(), 1);
}

#[tokio::test]
async fn test_transport_error_passes_through() {
    let server = MockServer::new("stale-access");
    server.state.lock().fail_transport = true;
    let store = logged_in_store().await;
    let gate = make_gate(&server, &store, RefreshBehavior::Succeed, Duration::ZERO);

    let error = gate.execute(ApiRequest::get("/down")).await.unwrap_err();

    assert!(matches!(
        error,
        ApiError::Transport(TransportError::Timeout)
    ));
    assert_eq!(server.refresh_calls(), 0);
    assert!(store.read().await.is_some(), "session must survive");
}

// ============================================================================
// Refresh coordination
// ============================================================================

#[tokio::test]
async fn test_single_caller_refresh_then_retry() {
    // Valid token is what the NEXT refresh hands out: the stored one is stale.
    let server = MockServer::new("access-2");
    let store = logged_in_store().await;
    let gate = make_gate(
        &server,
        &store,
        RefreshBehavior::Succeed,
        Duration::from_millis(20),
    );

    let response = gate.execute(ApiRequest::get("/tasks")).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(server.refresh_calls(), 1);

    // Both tokens rotated together.
    let session = store.read().await.unwrap();
    assert_eq!(session.credentials.access_token, "access-2");
    assert_eq!(session.credentials.refresh_token, "refresh-2");

    // First attempt with the stale token, retry with the new one.
    let sent = server.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].1.as_deref(), Some("stale-access"));
    assert_eq!(sent[1].1.as_deref(), Some("access-2"));
}

#[tokio::test]
async fn test_concurrent_callers_single_flight_fifo() {
    let server = MockServer::new("access-2");
    let store = logged_in_store().await;
    let gate = make_gate(
        &server,
        &store,
        RefreshBehavior::Succeed,
        Duration::from_millis(100),
    );

    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let mut handles = Vec::new();

    // A, B, and C all pass the open gate and see 403 on their first attempt;
    // A (first to observe it) refreshes, B and C queue in arrival order.
    for (label, stagger) in [("A", 0u64), ("B", 3), ("C", 6)] {
        let gate = gate.clone();
        let order = Arc::clone(&order);
        handles.push(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(stagger)).await;
            let response = gate
                .execute(ApiRequest::get(format!("/req-{label}")))
                .await
                .unwrap();
            order.lock().push(label);
            response
        }));
    }

    for handle in handles {
        let response = handle.await.unwrap();
        assert_eq!(response.status, 200);
    }

    // Exactly one refresh despite three concurrent 403s.
    assert_eq!(server.refresh_calls(), 1);

    // Queued callers settle in arrival order.
    let completed = order.lock().clone();
    let b_pos = completed.iter().position(|l| *l == "B").unwrap();
    let c_pos = completed.iter().position(|l| *l == "C").unwrap();
    assert!(b_pos < c_pos, "queued callers must settle FIFO");

    // Three stale attempts; then the refresher re-issues its own request
    // first and drains the queue in arrival order, all with the new token.
    let sent = server.sent();
    assert_eq!(sent.len(), 6);
    for (_, token) in &sent[..3] {
        assert_eq!(token.as_deref(), Some("stale-access"));
    }
    assert_eq!(sent[3].0, "/req-A");
    assert_eq!(sent[4].0, "/req-B");
    assert_eq!(sent[5].0, "/req-C");
    for (_, token) in &sent[3..] {
        assert_eq!(token.as_deref(), Some("access-2"));
    }
}

#[tokio::test]
async fn test_arrivals_during_refresh_wait_for_new_token() {
    let server = MockServer::new("access-2");
    let store = logged_in_store().await;
    let gate = make_gate(
        &server,
        &store,
        RefreshBehavior::Succeed,
        Duration::from_millis(100),
    );

    let trigger = {
        let gate = gate.clone();
        tokio::spawn(async move { gate.execute(ApiRequest::get("/req-A")).await })
    };

    // D arrives while the refresh is in flight and has not attempted its
    // request yet: it must wait at the gate, not race with stale credentials.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let response = gate.execute(ApiRequest::get("/req-D")).await.unwrap();
    assert_eq!(response.status, 200);

    trigger.await.unwrap().unwrap();

    let d_sends: Vec<_> = server
        .sent()
        .into_iter()
        .filter(|(path, _)| path == "/req-D")
        .collect();
    assert_eq!(d_sends.len(), 1, "one attempt, after the refresh");
    assert_eq!(d_sends[0].1.as_deref(), Some("access-2"));
}

// ============================================================================
// Refresh failure
// ============================================================================

#[tokio::test]
async fn test_refresh_failure_fans_out_and_ends_session() {
    let server = MockServer::new("access-2");
    let store = logged_in_store().await;
    let gate = make_gate(
        &server,
        &store,
        RefreshBehavior::FailTransport,
        Duration::from_millis(50),
    );

    let mut handles = Vec::new();
    for stagger in [0u64, 3, 6] {
        let gate = gate.clone();
        handles.push(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(stagger)).await;
            gate.execute(ApiRequest::get("/doomed")).await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(ApiError::SessionExpired)));
    }

    assert_eq!(server.refresh_calls(), 1);
    assert!(store.read().await.is_none(), "session must be cleared");
    assert_eq!(store.clears.load(Ordering::SeqCst), 1, "cleared exactly once");

    // Nothing was re-issued after the failed refresh.
    assert_eq!(server.sent().len(), 3);
}

#[tokio::test]
async fn test_hung_refresh_bounded_by_timeout() {
    let server = MockServer::new("access-2");
    let store = logged_in_store().await;
    let transport = Arc::new(MockTransport {
        server: Arc::clone(&server),
        latency: Duration::from_millis(1),
    });
    let refresher = Arc::new(MockRefresher {
        server: Arc::clone(&server),
        delay: Duration::ZERO,
        behavior: RefreshBehavior::Hang,
    });
    let gate = SessionGate::new(
        transport,
        refresher,
        Arc::clone(&store),
        GateOptions {
            refresh_timeout: Duration::from_millis(50),
        },
    );

    let result = gate.execute(ApiRequest::get("/slow")).await;

    assert!(matches!(result, Err(ApiError::SessionExpired)));
    assert!(store.read().await.is_none());
}

#[tokio::test]
async fn test_forbidden_without_session_is_terminal() {
    let server = MockServer::new("access-2");
    let store = Arc::new(CountingStore::new());
    let gate = make_gate(&server, &store, RefreshBehavior::Succeed, Duration::ZERO);

    let result = gate.execute(ApiRequest::get("/anonymous")).await;

    // No refresh token to refresh with: surfaced as a session end, and the
    // refresh operation itself is never invoked.
    assert!(matches!(result, Err(ApiError::SessionExpired)));
    assert_eq!(server.refresh_calls(), 0);
}

#[tokio::test]
async fn test_gate_reopens_after_failure() {
    let server = MockServer::new("access-2");
    let store = logged_in_store().await;
    let gate = make_gate(
        &server,
        &store,
        RefreshBehavior::FailTransport,
        Duration::from_millis(10),
    );

    let result = gate.execute(ApiRequest::get("/doomed")).await;
    assert!(matches!(result, Err(ApiError::SessionExpired)));

    // The gate must not stay shut after the failed cycle: a later login can
    // start over. Log back in and verify traffic flows.
    store.start(stale_session()).await.unwrap();
    server.state.lock().valid_access = "stale-access".into();

    let response = gate.execute(ApiRequest::get("/after")).await.unwrap();
    assert_eq!(response.status, 200);
}
