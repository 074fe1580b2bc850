use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Errors raised by the authentication chain.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The request carried no usable credentials, or they failed validation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Valid credentials without the scope the resource requires.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A provider call (introspection, code exchange, user info) failed.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The auth configuration is unusable for the selected method.
    #[error("Auth configuration error: {0}")]
    Configuration(String),
}

impl AuthError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) | Self::Provider(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = match &self {
            Self::Forbidden(_) => "forbidden",
            Self::Configuration(_) => "exception",
            _ => "login",
        };
        let body = json!({
            "resourceType": "OperationOutcome",
            "issue": [{
                "severity": "error",
                "code": code,
                "diagnostics": self.to_string(),
            }]
        });

        if status == StatusCode::UNAUTHORIZED {
            (status, [("WWW-Authenticate", "Bearer")], Json(body)).into_response()
        } else {
            (status, Json(body)).into_response()
        }
    }
}
