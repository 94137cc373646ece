//! API-facing request/response models.

use serde::{Deserialize, Serialize};

use crate::core::TransportError;

/// Status code the server uses to signal an expired or invalid access token.
pub const REAUTH_SENTINEL_STATUS: u16 = 403;

/// HTTP method of an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP DELETE.
    Delete,
}

impl Method {
    /// Wire name of the method.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// One API request: enough to issue it now and to re-issue it after a token
/// refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the API base URL, query string included.
    pub path: String,
    /// Optional JSON body.
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Build a GET request for `path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    /// Build a POST request for `path` with a JSON body.
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// One API response: the status code drives gate decisions, the body is kept
/// opaque until a façade operation decodes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body. `Null` when the server sent none.
    pub body: serde_json::Value,
}

impl ApiResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the status is the expired-credential sentinel.
    pub fn is_auth_expired(&self) -> bool {
        self.status == REAUTH_SENTINEL_STATUS
    }

    /// Decode the body into a typed value.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_value(self.body.clone()).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
