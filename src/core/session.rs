//! Session state: credentials, operator identity, and the store seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::StoreError;

/// Operator identifier.
pub type UserId = u64;
/// Organization (print shop) identifier.
pub type OrgId = u64;
/// Numeric operator role.
pub type Role = u32;

/// Token pair authorizing API calls. Always replaced as a whole: the access
/// and refresh tokens from one grant never mix with those of another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Short-lived token sent with every API call.
    pub access_token: String,
    /// Longer-lived token used to obtain a new access token.
    pub refresh_token: String,
}

/// Who the session belongs to. Lifecycle tied to login/logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Operator id.
    pub user_id: UserId,
    /// Organization id.
    pub org_id: OrgId,
    /// Operator role.
    pub role: Role,
}

/// A logged-in session: credentials plus identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Current token pair.
    pub credentials: Credentials,
    /// Operator identity.
    pub identity: Identity,
}

/// Abstraction for session storage backends.
///
/// The store is the only shared mutable resource of the client: credentials
/// are read at request-send time and written exactly once per successful
/// refresh cycle, under the gate's exclusivity.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Current session, if logged in.
    async fn read(&self) -> Option<Session>;

    /// Begin a session after login.
    async fn start(&self, session: Session) -> Result<(), StoreError>;

    /// Replace the token pair after a successful refresh. Both tokens are
    /// updated together; identity is untouched.
    async fn write_credentials(&self, credentials: Credentials) -> Result<(), StoreError>;

    /// End the session: drop credentials and identity.
    async fn clear(&self) -> Result<(), StoreError>;
}
