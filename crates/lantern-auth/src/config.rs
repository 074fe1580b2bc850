//! Authentication configuration.

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Which security model is active for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// No authentication; every request reaches the controllers.
    #[default]
    None,
    /// OpenID Connect authorization-code flow with a server-side session,
    /// plus bearer-token introspection for requests that carry an
    /// `Authorization` header.
    Oidc,
    /// HEART profile, delegated wholesale to the HEART route setup.
    Heart,
}

impl std::fmt::Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Oidc => write!(f, "oidc"),
            Self::Heart => write!(f, "heart"),
        }
    }
}

/// Authentication configuration.
///
/// Only the fields required by the selected method have to be set;
/// `validate()` enforces the per-method requirements at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub method: AuthMode,

    /// OAuth client credentials at the provider.
    pub client_id: String,
    pub client_secret: String,

    /// OIDC endpoints.
    pub authorization_url: String,
    pub token_url: String,
    pub introspection_url: String,
    pub userinfo_url: String,

    /// Secret protecting the session cookie store.
    pub session_secret: String,

    /// HEART: path to the client's JWK file.
    pub jwk_path: String,
    /// HEART: the OpenID provider base URL.
    pub op_url: String,
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), AuthError> {
        match self.method {
            AuthMode::None => Ok(()),
            AuthMode::Oidc => {
                for (name, value) in [
                    ("auth.client_id", &self.client_id),
                    ("auth.authorization_url", &self.authorization_url),
                    ("auth.token_url", &self.token_url),
                    ("auth.introspection_url", &self.introspection_url),
                    ("auth.userinfo_url", &self.userinfo_url),
                    ("auth.session_secret", &self.session_secret),
                ] {
                    if value.is_empty() {
                        return Err(AuthError::configuration(format!(
                            "{name} is required for auth.method = \"oidc\""
                        )));
                    }
                }
                Ok(())
            }
            AuthMode::Heart => {
                for (name, value) in [
                    ("auth.client_id", &self.client_id),
                    ("auth.jwk_path", &self.jwk_path),
                    ("auth.op_url", &self.op_url),
                    ("auth.session_secret", &self.session_secret),
                ] {
                    if value.is_empty() {
                        return Err(AuthError::configuration(format!(
                            "{name} is required for auth.method = \"heart\""
                        )));
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oidc_config() -> AuthConfig {
        AuthConfig {
            method: AuthMode::Oidc,
            client_id: "lantern".into(),
            client_secret: "secret".into(),
            authorization_url: "https://op.example.com/authorize".into(),
            token_url: "https://op.example.com/token".into(),
            introspection_url: "https://op.example.com/introspect".into(),
            userinfo_url: "https://op.example.com/userinfo".into(),
            session_secret: "0123456789abcdef".into(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_mode_default_is_none() {
        assert_eq!(AuthMode::default(), AuthMode::None);
        assert!(AuthConfig::default().validate().is_ok());
    }

    #[test]
    fn test_mode_deserializes_lowercase() {
        let cfg: AuthConfig = serde_json::from_str(r#"{"method": "oidc"}"#).unwrap();
        assert_eq!(cfg.method, AuthMode::Oidc);
        let cfg: AuthConfig = serde_json::from_str(r#"{"method": "heart"}"#).unwrap();
        assert_eq!(cfg.method, AuthMode::Heart);
    }

    #[test]
    fn test_oidc_validation() {
        assert!(oidc_config().validate().is_ok());

        let mut cfg = oidc_config();
        cfg.introspection_url.clear();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("introspection_url"));
    }

    #[test]
    fn test_heart_validation() {
        let cfg = AuthConfig {
            method: AuthMode::Heart,
            client_id: "lantern".into(),
            jwk_path: "/etc/lantern/client.jwk".into(),
            op_url: "https://op.example.com".into(),
            session_secret: "s".into(),
            ..AuthConfig::default()
        };
        assert!(cfg.validate().is_ok());

        let mut cfg = cfg;
        cfg.jwk_path.clear();
        assert!(cfg.validate().is_err());
    }
}
