//! Bearer-token introspection (RFC 7662).
//!
//! The network call is a black box behind [`TokenIntrospector`]: it either
//! succeeds with an identity or fails. [`HttpIntrospector`] is the reqwest
//! implementation against a real introspection endpoint.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::AuthError;
use crate::identity::AuthIdentity;

/// Verifies a bearer token against an external authority.
#[async_trait]
pub trait TokenIntrospector: Send + Sync {
    /// Introspects `token`, returning the identity it represents.
    ///
    /// # Errors
    ///
    /// `AuthError::Unauthorized` when the authority reports the token
    /// inactive; `AuthError::Provider` when the authority is unreachable.
    async fn introspect(&self, token: &str) -> Result<AuthIdentity, AuthError>;
}

/// Token introspection response per RFC 7662. `active` is the only
/// required field; the authority never reveals why a token is inactive.
#[derive(Debug, Deserialize)]
struct IntrospectionResponse {
    active: bool,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    iss: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

/// RFC 7662 introspection over HTTP with client-credential authentication.
pub struct HttpIntrospector {
    client: reqwest::Client,
    introspection_url: String,
    client_id: String,
    client_secret: String,
}

impl HttpIntrospector {
    pub fn new(
        introspection_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            introspection_url: introspection_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

#[async_trait]
impl TokenIntrospector for HttpIntrospector {
    async fn introspect(&self, token: &str) -> Result<AuthIdentity, AuthError> {
        let response = self
            .client
            .post(&self.introspection_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("token", token)])
            .send()
            .await
            .map_err(|e| AuthError::provider(format!("introspection request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AuthError::provider(format!(
                "introspection endpoint returned {}",
                response.status()
            )));
        }

        let body: IntrospectionResponse = response
            .json()
            .await
            .map_err(|e| AuthError::provider(format!("invalid introspection response: {e}")))?;

        if !body.active {
            return Err(AuthError::unauthorized("token is not active"));
        }

        let scopes = body
            .scope
            .as_deref()
            .unwrap_or("")
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let subject = body
            .sub
            .or(body.username)
            .ok_or_else(|| AuthError::provider("introspection response carries no subject"))?;

        let mut identity = AuthIdentity::introspected(subject, scopes);
        if let Some(iss) = body.iss {
            identity = identity.with_issuer(iss);
        }
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing() {
        let body: IntrospectionResponse = serde_json::from_str(
            r#"{"active": true, "scope": "user/Goal.read user/Goal.write", "sub": "alice", "iss": "https://op"}"#,
        )
        .unwrap();
        assert!(body.active);
        assert_eq!(body.sub.as_deref(), Some("alice"));
        assert_eq!(body.scope.as_deref(), Some("user/Goal.read user/Goal.write"));
    }

    #[test]
    fn test_inactive_response_needs_only_active() {
        let body: IntrospectionResponse = serde_json::from_str(r#"{"active": false}"#).unwrap();
        assert!(!body.active);
        assert!(body.sub.is_none());
        assert!(body.iss.is_none());
        assert!(body.username.is_none());
    }
}
