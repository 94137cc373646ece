//! Login and logout operations.

use serde_json::json;

use super::{BoardClient, LoginResponse};
use crate::core::{
    ApiError, ApiRequest, Credentials, Identity, Session, SessionStore, TokenRefresher, Transport,
};

impl<T, R, S> BoardClient<T, R, S>
where
    T: Transport,
    R: TokenRefresher,
    S: SessionStore,
{
    /// Authenticate the operator and begin a session.
    ///
    /// Goes straight to the transport: there is no session to gate yet, and
    /// a 403 here means bad credentials, not an expired token.
    pub async fn login(&self, login: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = ApiRequest::post(
            "/AuthorizeUser/",
            json!({ "login": login, "password": password }),
        );
        let response = self.transport.send(&request, None).await?;
        if !response.is_success() {
            return Err(ApiError::Status(response.status));
        }
        let reply: LoginResponse = response
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        self.store
            .start(Session {
                credentials: Credentials {
                    access_token: reply.access_token.clone(),
                    refresh_token: reply.refresh_token.clone(),
                },
                identity: Identity {
                    user_id: reply.user_id,
                    org_id: reply.company_id,
                    role: reply.role,
                },
            })
            .await?;

        tracing::info!(user_id = reply.user_id, "operator logged in");
        Ok(reply)
    }

    /// End the session locally.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.store.clear().await?;
        tracing::info!("operator logged out");
        Ok(())
    }
}
