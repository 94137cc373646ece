//! Core abstractions: wire models, session state, collaborator seams, and
//! the refresh gate.

pub mod error;
pub mod gate;
pub mod request;
pub mod session;
pub mod transport;

pub use error::{ApiError, AppResult, RefreshError, StoreError, TransportError};
pub use gate::{GateOptions, SessionGate};
pub use request::{ApiRequest, ApiResponse, Method, REAUTH_SENTINEL_STATUS};
pub use session::{Credentials, Identity, OrgId, Role, Session, SessionStore, UserId};
pub use transport::{TokenRefresher, Transport};
