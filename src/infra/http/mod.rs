//! HTTP transport backends.

#[cfg(feature = "reqwest-transport")]
pub mod reqwest;

#[cfg(feature = "reqwest-transport")]
pub use self::reqwest::{ReqwestRefresher, ReqwestTransport};
