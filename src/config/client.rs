//! Client configuration structures.

use serde::{Deserialize, Serialize};

/// Session store backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackendConfig {
    /// In-memory store for development/testing.
    InMemory,
    /// Durable JSON-file store.
    File {
        /// Path of the session file.
        path: String,
    },
}

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Absolute base URL of the scheduling-board API.
    pub base_url: String,
    /// Per-request transport timeout in seconds.
    pub request_timeout_secs: u64,
    /// Upper bound on the token refresh call in seconds.
    pub refresh_timeout_secs: u64,
    /// Session store backend selection.
    pub store: StoreBackendConfig,
}

impl ClientConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url must not be empty".into());
        }
        if !self.base_url.contains("://") {
            return Err("base_url must be an absolute URL".into());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".into());
        }
        if self.refresh_timeout_secs == 0 {
            return Err("refresh_timeout_secs must be greater than 0".into());
        }
        if let StoreBackendConfig::File { path } = &self.store {
            if path.is_empty() {
                return Err("store file path must not be empty".into());
            }
        }
        Ok(())
    }

    /// Parse client configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: ClientConfig =
            serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
