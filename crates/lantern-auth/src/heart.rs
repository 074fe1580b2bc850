//! HEART profile route setup.
//!
//! In HEART mode the whole chain is delegated to this collaborator: it is
//! handed the JWK path, client id, provider URL, server URL and session
//! secret, and owns both the middleware and its extra routes. Lantern's core
//! does not branch on anything HEART-specific beyond calling `setup` once at
//! startup and `setup_routes` while building the route table.
//!
//! The profile is bearer-only: every request must present an `Authorization`
//! header and every token is introspected at the provider. The client
//! authenticates to the introspection endpoint with its JWK-bound key; key
//! material is loaded (and required to exist) at startup.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;

use crate::error::AuthError;
use crate::introspect::{HttpIntrospector, TokenIntrospector};

/// Shared state of the HEART strategy.
pub struct HeartState {
    pub introspector: Arc<dyn TokenIntrospector>,
    pub server_url: String,
}

/// Builds the HEART state from its configuration inputs.
///
/// # Errors
///
/// `AuthError::Configuration` when the JWK file is missing or unreadable.
pub fn setup(
    jwk_path: &str,
    client_id: &str,
    op_url: &str,
    server_url: &str,
    _session_secret: &str,
) -> Result<HeartState, AuthError> {
    let jwk = std::fs::read_to_string(jwk_path).map_err(|e| {
        AuthError::configuration(format!("cannot read JWK file '{jwk_path}': {e}"))
    })?;
    if jwk.trim().is_empty() {
        return Err(AuthError::configuration(format!(
            "JWK file '{jwk_path}' is empty"
        )));
    }

    let introspection_url = format!("{}/introspect", op_url.trim_end_matches('/'));
    Ok(HeartState {
        introspector: Arc::new(HttpIntrospector::new(introspection_url, client_id, jwk)),
        server_url: server_url.trim_end_matches('/').to_string(),
    })
}

/// Installs the HEART middleware chain and routes onto the route table.
pub fn setup_routes(state: Arc<HeartState>, router: Router) -> Router {
    let heart_routes = Router::new()
        .route("/logout", get(logout_handler))
        .with_state(state.clone());
    router
        .merge(heart_routes)
        .layer(middleware::from_fn_with_state(state, heart_gate))
}

fn skip_auth(path: &str) -> bool {
    matches!(path, "/logout" | "/healthz" | "/readyz")
}

/// Bearer-only gate: no `Authorization` header means 401, and every token is
/// introspected at the provider.
async fn heart_gate(
    State(state): State<Arc<HeartState>>,
    mut req: Request,
    next: Next,
) -> Response {
    if skip_auth(req.uri().path()) {
        return next.run(req).await;
    }

    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty());
    let Some(token) = token else {
        return AuthError::unauthorized("Bearer token required").into_response();
    };

    match state.introspector.introspect(token).await {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

async fn logout_handler() -> Redirect {
    // Bearer clients have no server-side session to drop.
    Redirect::to("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::AuthIdentity;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use std::io::Write;
    use tower::ServiceExt;

    struct StaticIntrospector;

    #[async_trait]
    impl TokenIntrospector for StaticIntrospector {
        async fn introspect(&self, token: &str) -> Result<AuthIdentity, AuthError> {
            if token == "good-token" {
                Ok(AuthIdentity::introspected("m2m", vec!["user/*.*".into()]))
            } else {
                Err(AuthError::unauthorized("token is not active"))
            }
        }
    }

    fn app() -> Router {
        let state = Arc::new(HeartState {
            introspector: Arc::new(StaticIntrospector),
            server_url: "http://localhost:3001".into(),
        });
        setup_routes(state, Router::new().route("/Goal", get(|| async { "ok" })))
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let req = HttpRequest::builder()
            .uri("/Goal")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_bearer_token_passes() {
        let req = HttpRequest::builder()
            .uri("/Goal")
            .header("Authorization", "Bearer good-token")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_logout_route_is_open() {
        let req = HttpRequest::builder()
            .uri("/logout")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }

    #[test]
    fn test_setup_requires_jwk_file() {
        let err = setup(
            "/definitely/not/here.jwk",
            "client",
            "https://op.example.com",
            "http://localhost:3001",
            "secret",
        )
        .unwrap_err();
        assert!(err.to_string().contains("JWK"));

        let mut jwk = tempfile::NamedTempFile::new().unwrap();
        write!(jwk, "{{\"kty\":\"RSA\"}}").unwrap();
        let state = setup(
            jwk.path().to_str().unwrap(),
            "client",
            "https://op.example.com",
            "http://localhost:3001/",
            "secret",
        )
        .unwrap();
        assert_eq!(state.server_url, "http://localhost:3001");
    }
}
