//! Authentication seam
//!
//! Session handling is an external collaborator; this module only defines
//! the boundary: a bearer token goes in, an owner identity comes out.

use async_trait::async_trait;
use scenery_store::OwnerId;
use serde::Deserialize;

/// Errors raised while resolving a caller identity
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The collaborator rejected the token
    #[error("token rejected")]
    TokenRejected,

    /// The collaborator could not be reached
    #[error("auth service unavailable: {0}")]
    Unavailable(String),
}

/// Black box producing an authenticated user identity
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolve a bearer token to the owning user
    async fn authenticate(&self, token: &str) -> Result<OwnerId, AuthError>;
}

/// Delegates token verification to a remote auth endpoint.
pub struct RemoteAuthenticator {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyResponse {
    user_id: OwnerId,
}

impl RemoteAuthenticator {
    /// Create new authenticator against the given service URL
    #[inline]
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Authenticator for RemoteAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<OwnerId, AuthError> {
        let response = self
            .http
            .get(format!("{}/verify", self.base_url.trim_end_matches('/')))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::TokenRejected);
        }

        let verified: VerifyResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Unavailable(format!("malformed verify response: {e}")))?;

        Ok(verified.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warp::http::StatusCode;
    use warp::Filter;

    #[test]
    fn verify_response_parses_camel_case() {
        let parsed: VerifyResponse = serde_json::from_str(
            r#"{"userId": "7f5f7c4e-9f2e-4b57-a2da-1f3c8f2d9b61"}"#,
        )
        .unwrap();
        assert_eq!(
            parsed.user_id.to_string(),
            "7f5f7c4e-9f2e-4b57-a2da-1f3c8f2d9b61"
        );
    }

    #[tokio::test]
    async fn remote_authenticator_round_trip() {
        let owner = OwnerId::new();
        let owner_str = owner.to_string();

        let verify = warp::get()
            .and(warp::path!("verify"))
            .and(warp::header::<String>("authorization"))
            .map(move |header: String| {
                if header == "Bearer good-token" {
                    warp::reply::with_status(
                        warp::reply::json(&serde_json::json!({"userId": owner_str.clone()})),
                        StatusCode::OK,
                    )
                } else {
                    warp::reply::with_status(
                        warp::reply::json(&serde_json::json!({"message": "nope"})),
                        StatusCode::UNAUTHORIZED,
                    )
                }
            });
        let (addr, server) = warp::serve(verify).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let auth = RemoteAuthenticator::new(format!("http://{addr}"));

        let resolved = auth.authenticate("good-token").await.unwrap();
        assert_eq!(resolved, owner);

        let rejected = auth.authenticate("bad-token").await;
        assert!(matches!(rejected, Err(AuthError::TokenRejected)));
    }
}
