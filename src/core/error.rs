//! Error types for the session client.

use thiserror::Error;

/// Failures of the underlying HTTP call. Never interpreted or retried by the
/// refresh gate; passed through to the caller as-is.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request did not complete within the transport deadline.
    #[error("request timed out")]
    Timeout,
    /// Connection could not be established (DNS, refused, TLS).
    #[error("connect error: {0}")]
    Connect(String),
    /// Request could not be built or sent.
    #[error("request error: {0}")]
    Request(String),
    /// Response body could not be read.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Failures of the token refresh call. Terminal for the session; surfaced to
/// callers only as [`ApiError::SessionExpired`].
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The refresh call itself failed at the transport level.
    #[error("refresh transport error: {0}")]
    Transport(#[from] TransportError),
    /// The refresh endpoint answered with a non-success status.
    #[error("refresh rejected with status {0}")]
    Rejected(u16),
    /// The refresh response is missing the access or the refresh token.
    #[error("refresh response missing tokens")]
    IncompletePair,
    /// The refresh call exceeded the configured deadline.
    #[error("refresh timed out")]
    Timeout,
    /// No session in the store to refresh from.
    #[error("no active session")]
    NoSession,
}

/// Failures of a session store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying i/o failure.
    #[error("i/o error: {0}")]
    Io(String),
    /// Stored session data could not be parsed.
    #[error("invalid session data: {0}")]
    Invalid(String),
}

/// Errors surfaced by [`SessionGate::execute`](crate::core::SessionGate::execute)
/// and the API façade built on top of it.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure unrelated to authorization.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// The session ended: the token refresh failed and the operator must log
    /// in again.
    #[error("session expired, log in again")]
    SessionExpired,
    /// Session store failure.
    #[error("session store error: {0}")]
    Store(#[from] StoreError),
    /// The server answered a façade operation with a non-success status.
    #[error("request failed with status {0}")]
    Status(u16),
    /// A response body did not match the expected shape.
    #[error("response decode error: {0}")]
    Decode(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
