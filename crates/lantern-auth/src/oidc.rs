//! OpenID Connect provider collaborator.
//!
//! The authorization-code exchange and the user-info fetch are black boxes
//! behind [`OidcProvider`]; [`HttpOidcProvider`] implements them against a
//! real provider with reqwest.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::identity::AuthIdentity;

/// The OpenID provider as seen by the session flow.
#[async_trait]
pub trait OidcProvider: Send + Sync {
    /// The URL to send an unauthenticated browser to.
    fn authorization_url(&self, redirect_uri: &str) -> String;

    /// Exchanges an authorization code for an access token.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<String, AuthError>;

    /// Fetches identity information for an access token.
    async fn user_info(&self, access_token: &str) -> Result<AuthIdentity, AuthError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    iss: Option<String>,
}

/// OIDC provider over HTTP, configured from the auth settings.
pub struct HttpOidcProvider {
    client: reqwest::Client,
    authorization_url: String,
    token_url: String,
    userinfo_url: String,
    client_id: String,
    client_secret: String,
}

impl HttpOidcProvider {
    pub fn from_config(cfg: &AuthConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            authorization_url: cfg.authorization_url.clone(),
            token_url: cfg.token_url.clone(),
            userinfo_url: cfg.userinfo_url.clone(),
            client_id: cfg.client_id.clone(),
            client_secret: cfg.client_secret.clone(),
        }
    }
}

#[async_trait]
impl OidcProvider for HttpOidcProvider {
    fn authorization_url(&self, redirect_uri: &str) -> String {
        match url::Url::parse(&self.authorization_url) {
            Ok(mut url) => {
                url.query_pairs_mut()
                    .append_pair("response_type", "code")
                    .append_pair("scope", "openid profile")
                    .append_pair("client_id", &self.client_id)
                    .append_pair("redirect_uri", redirect_uri);
                url.to_string()
            }
            // Validated at startup; an unparsable URL can only mean the
            // config changed underneath us, so fall through verbatim.
            Err(_) => self.authorization_url.clone(),
        }
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<String, AuthError> {
        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| AuthError::provider(format!("code exchange failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AuthError::unauthorized(format!(
                "authorization code rejected ({})",
                response.status()
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::provider(format!("invalid token response: {e}")))?;
        Ok(body.access_token)
    }

    async fn user_info(&self, access_token: &str) -> Result<AuthIdentity, AuthError> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::provider(format!("user info request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AuthError::unauthorized(format!(
                "user info rejected ({})",
                response.status()
            )));
        }

        let body: UserInfoResponse = response
            .json()
            .await
            .map_err(|e| AuthError::provider(format!("invalid user info response: {e}")))?;

        let mut identity = AuthIdentity::session(body.sub);
        if let Some(name) = body.name {
            identity = identity.with_name(name);
        }
        if let Some(email) = body.email {
            identity = identity.with_email(email);
        }
        if let Some(iss) = body.iss {
            identity = identity.with_issuer(iss);
        }
        Ok(identity)
    }
}
