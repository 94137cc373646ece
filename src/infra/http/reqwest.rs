//! Reqwest-backed transport and token refresher.

use std::time::Duration;

use async_trait::async_trait;

use crate::core::{
    ApiRequest, ApiResponse, Credentials, Method, RefreshError, TokenRefresher, Transport,
    TransportError, UserId,
};

/// Path of the token refresh endpoint, relative to the API base URL.
const REFRESH_PATH: &str = "/UpdateUserAccessToken";

fn classify(error: &reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Request(error.to_string())
    }
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client, TransportError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| TransportError::Request(e.to_string()))
}

fn validate_base_url(base_url: &str) -> Result<String, TransportError> {
    reqwest::Url::parse(base_url).map_err(|e| TransportError::Request(e.to_string()))?;
    Ok(base_url.trim_end_matches('/').to_owned())
}

/// HTTP transport over a pooled [`reqwest::Client`].
///
/// Request paths are appended to the base URL verbatim, JSON bodies are sent
/// as-is, and the access token travels as a bearer header. Any reachable
/// server yields an [`ApiResponse`]; connection-level failures are
/// classified into [`TransportError`].
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Create a transport for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: validate_base_url(base_url)?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(http_method(request.method), &url);
        if let Some(token) = access_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| classify(&e))?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        // Bodies are JSON in the happy case, but error pages and empty
        // responses must not fail the transport: the caller inspects the
        // status first.
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        Ok(ApiResponse { status, body })
    }
}

/// Wire shape of the refresh endpoint's answer. Both fields must be present
/// and non-empty for the pair to count.
#[derive(serde::Deserialize)]
struct RefreshReply {
    access: Option<String>,
    refresh: Option<String>,
}

/// Token refresher talking to the refresh endpoint directly.
///
/// Not routed through the gate: a 403 from the refresh endpoint must surface
/// as a refresh failure, not recurse into another refresh. The refresh token
/// itself authorizes the call.
pub struct ReqwestRefresher {
    client: reqwest::Client,
    refresh_url: String,
}

impl ReqwestRefresher {
    /// Create a refresher for the refresh endpoint under `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base = validate_base_url(base_url)?;
        Ok(Self {
            client: build_client(timeout)?,
            refresh_url: format!("{base}{REFRESH_PATH}"),
        })
    }
}

#[async_trait]
impl TokenRefresher for ReqwestRefresher {
    async fn refresh(
        &self,
        refresh_token: &str,
        user_id: UserId,
    ) -> Result<Credentials, RefreshError> {
        let response = self
            .client
            .post(&self.refresh_url)
            .bearer_auth(refresh_token)
            .json(&serde_json::json!({
                "refreshToken": refresh_token,
                "userId": user_id,
            }))
            .send()
            .await
            .map_err(|e| RefreshError::Transport(classify(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RefreshError::Rejected(status.as_u16()));
        }

        let reply: RefreshReply = response
            .json()
            .await
            .map_err(|e| RefreshError::Transport(TransportError::Decode(e.to_string())))?;

        match (reply.access, reply.refresh) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                Ok(Credentials {
                    access_token: access,
                    refresh_token: refresh,
                })
            }
            _ => Err(RefreshError::IncompletePair),
        }
    }
}
