//! Transport and token-refresh seams consumed by the gate.

use async_trait::async_trait;

use crate::core::{ApiRequest, ApiResponse, Credentials, RefreshError, TransportError, UserId};

/// Abstraction for issuing one HTTP request.
///
/// Implementations classify outcomes: a reachable server always yields an
/// [`ApiResponse`] (whatever the status), a transport-level failure yields a
/// [`TransportError`]. The gate inspects only the status code.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send `request`, bearer-authorized with `access_token` when present.
    async fn send(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> Result<ApiResponse, TransportError>;
}

/// Abstraction for the token refresh call.
///
/// Deliberately a separate seam from [`Transport`]: the refresh call must not
/// be routed back through the gate, or a 403 from the refresh endpoint would
/// recurse into another refresh.
#[async_trait]
pub trait TokenRefresher: Send + Sync + 'static {
    /// Exchange `refresh_token` for a complete new token pair.
    async fn refresh(
        &self,
        refresh_token: &str,
        user_id: UserId,
    ) -> Result<Credentials, RefreshError>;
}
