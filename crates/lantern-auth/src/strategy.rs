//! The auth strategy dispatcher.
//!
//! Resolved once at process start from [`AuthConfig`]; the selected strategy
//! installs a fixed middleware chain (and, for the session flow, the login
//! callback and logout routes) onto the route table. The mode never changes
//! at runtime and there are no per-route mode overrides — only per-resource
//! scope checks layered on top of the active base mode.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum_extra::extract::CookieJar;
use cookie::Cookie;
use serde::Deserialize;

use crate::config::{AuthConfig, AuthMode};
use crate::error::AuthError;
use crate::heart::{self, HeartState};
use crate::introspect::{HttpIntrospector, TokenIntrospector};
use crate::oidc::{HttpOidcProvider, OidcProvider};
use crate::scopes::{ScopeCheck, scope_gate};
use crate::session::{SESSION_COOKIE, SessionStore};

/// Shared state of the OIDC session strategy.
pub struct OidcState {
    pub provider: Arc<dyn OidcProvider>,
    pub introspector: Arc<dyn TokenIntrospector>,
    pub sessions: Arc<SessionStore>,
    pub server_url: String,
}

impl OidcState {
    fn redirect_uri(&self) -> String {
        format!("{}/redirect", self.server_url)
    }
}

/// One of the three mutually exclusive security models, resolved at startup.
pub enum AuthStrategy {
    /// No middleware, no extra routes.
    Disabled,
    /// Session flow with a bearer-introspection branch.
    Oidc(Arc<OidcState>),
    /// Delegated HEART bearer profile.
    Heart(Arc<HeartState>),
}

impl AuthStrategy {
    /// Resolves the strategy from configuration. `server_url` is the public
    /// base URL used to build the login redirect URI.
    pub fn from_config(cfg: &AuthConfig, server_url: &str) -> Result<Self, AuthError> {
        cfg.validate()?;
        let server_url = server_url.trim_end_matches('/');
        match cfg.method {
            AuthMode::None => Ok(Self::Disabled),
            AuthMode::Oidc => Ok(Self::Oidc(Arc::new(OidcState {
                provider: Arc::new(HttpOidcProvider::from_config(cfg)),
                introspector: Arc::new(HttpIntrospector::new(
                    &cfg.introspection_url,
                    &cfg.client_id,
                    &cfg.client_secret,
                )),
                sessions: Arc::new(SessionStore::new()),
                server_url: server_url.to_string(),
            }))),
            AuthMode::Heart => Ok(Self::Heart(Arc::new(heart::setup(
                &cfg.jwk_path,
                &cfg.client_id,
                &cfg.op_url,
                server_url,
                &cfg.session_secret,
            )?))),
        }
    }

    /// Builds an OIDC strategy from injected collaborators. Used by tests
    /// and by deployments that bring their own provider integration.
    pub fn oidc_with(
        provider: Arc<dyn OidcProvider>,
        introspector: Arc<dyn TokenIntrospector>,
        server_url: impl Into<String>,
    ) -> Self {
        Self::Oidc(Arc::new(OidcState {
            provider,
            introspector,
            sessions: Arc::new(SessionStore::new()),
            server_url: server_url.into(),
        }))
    }

    pub fn mode(&self) -> AuthMode {
        match self {
            Self::Disabled => AuthMode::None,
            Self::Oidc(_) => AuthMode::Oidc,
            Self::Heart(_) => AuthMode::Heart,
        }
    }

    /// Installs the strategy's middleware chain and extra routes.
    pub fn apply(&self, router: Router) -> Router {
        match self {
            Self::Disabled => router,
            Self::Oidc(state) => {
                let auth_routes = Router::new()
                    .route("/redirect", get(redirect_handler))
                    .route("/logout", get(logout_handler))
                    .with_state(state.clone());
                router
                    .merge(auth_routes)
                    .layer(middleware::from_fn_with_state(state.clone(), oidc_gate))
            }
            Self::Heart(state) => heart::setup_routes(state.clone(), router),
        }
    }

    /// Layers the per-resource scope check onto a resource group, when the
    /// active mode performs authorization at all.
    pub fn apply_scopes(&self, resource: &str, router: Router) -> Router {
        match self {
            Self::Disabled => router,
            Self::Oidc(_) | Self::Heart(_) => router.layer(middleware::from_fn_with_state(
                ScopeCheck::new(resource),
                scope_gate,
            )),
        }
    }
}

/// Paths the auth gate never intercepts: the login callback and logout
/// themselves, plus health probes.
fn skip_auth(path: &str) -> bool {
    matches!(path, "/redirect" | "/logout" | "/healthz" | "/readyz")
}

/// The per-request branch of the OIDC mode.
///
/// The same route table serves interactive browser clients (no
/// `Authorization` header, session cookie with redirect-based login) and
/// machine clients (bearer token, stateless introspection). A bearer token
/// always selects the introspection path, even when a session cookie is also
/// present.
async fn oidc_gate(
    State(state): State<Arc<OidcState>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    if skip_auth(req.uri().path()) {
        return next.run(req).await;
    }

    if let Some(header) = req.headers().get(AUTHORIZATION) {
        let token = header
            .to_str()
            .ok()
            .and_then(|h| h.strip_prefix("Bearer "))
            .filter(|t| !t.is_empty());
        let Some(token) = token else {
            return AuthError::unauthorized("Invalid Authorization header format").into_response();
        };
        return match state.introspector.introspect(token).await {
            Ok(identity) => {
                tracing::debug!(subject = %identity.subject, "Bearer token introspected");
                req.extensions_mut().insert(identity);
                next.run(req).await
            }
            Err(e) => e.into_response(),
        };
    }

    if let Some(cookie) = jar.get(SESSION_COOKIE)
        && let Some(identity) = state.sessions.get(cookie.value())
    {
        req.extensions_mut().insert(identity);
        return next.run(req).await;
    }

    // Not logged in: hand the browser to the provider.
    let login = state.provider.authorization_url(&state.redirect_uri());
    Redirect::temporary(&login).into_response()
}

#[derive(Debug, Deserialize)]
struct RedirectParams {
    code: String,
}

/// Takes the redirect from the provider after the user logs in: exchanges
/// the code, fetches identity information, stores it in a fresh session, and
/// sends the user back to the server root.
async fn redirect_handler(
    State(state): State<Arc<OidcState>>,
    Query(params): Query<RedirectParams>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AuthError> {
    let token = state
        .provider
        .exchange_code(&params.code, &state.redirect_uri())
        .await?;
    let identity = state.provider.user_info(&token).await?;
    tracing::info!(subject = %identity.subject, "User logged in");

    let session_id = state.sessions.create(identity);
    let jar = jar.add(
        Cookie::build((SESSION_COOKIE, session_id))
            .path("/")
            .http_only(true)
            .build(),
    );
    Ok((jar, Redirect::to("/")))
}

async fn logout_handler(
    State(state): State<Arc<OidcState>>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.remove(cookie.value());
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/").build());
    (jar, Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::AuthIdentity;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct FakeProvider;

    #[async_trait]
    impl OidcProvider for FakeProvider {
        fn authorization_url(&self, redirect_uri: &str) -> String {
            format!("https://op.example.com/authorize?redirect_uri={redirect_uri}")
        }

        async fn exchange_code(&self, code: &str, _redirect_uri: &str) -> Result<String, AuthError> {
            if code == "good-code" {
                Ok("access-token".into())
            } else {
                Err(AuthError::unauthorized("authorization code rejected"))
            }
        }

        async fn user_info(&self, _access_token: &str) -> Result<AuthIdentity, AuthError> {
            Ok(AuthIdentity::session("alice").with_name("Alice"))
        }
    }

    #[derive(Default)]
    struct CountingIntrospector {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TokenIntrospector for CountingIntrospector {
        async fn introspect(&self, token: &str) -> Result<AuthIdentity, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if token == "good-token" {
                Ok(AuthIdentity::introspected("m2m", vec!["user/*.*".into()]))
            } else {
                Err(AuthError::unauthorized("token is not active"))
            }
        }
    }

    fn protected_app(strategy: &AuthStrategy) -> Router {
        let router = Router::new().route("/Goal", get(|| async { "reached controller" }));
        strategy.apply(router)
    }

    fn get_request(uri: &str) -> HttpRequest<Body> {
        HttpRequest::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_disabled_mode_installs_nothing() {
        let strategy = AuthStrategy::Disabled;
        assert_eq!(strategy.mode(), AuthMode::None);

        let resp = protected_app(&strategy)
            .oneshot(get_request("/Goal"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_oidc_redirects_anonymous_browser() {
        let strategy = AuthStrategy::oidc_with(
            Arc::new(FakeProvider),
            Arc::new(CountingIntrospector::default()),
            "http://localhost:3001",
        );

        let resp = protected_app(&strategy)
            .oneshot(get_request("/Goal"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        let location = resp.headers().get("location").unwrap().to_str().unwrap();
        assert!(location.starts_with("https://op.example.com/authorize"));
        assert!(location.contains("http://localhost:3001/redirect"));
    }

    #[tokio::test]
    async fn test_bearer_header_selects_introspection_even_with_cookie() {
        let introspector = Arc::new(CountingIntrospector::default());
        let strategy = AuthStrategy::oidc_with(
            Arc::new(FakeProvider),
            introspector.clone(),
            "http://localhost:3001",
        );

        let req = HttpRequest::builder()
            .uri("/Goal")
            .header("Authorization", "Bearer good-token")
            .header("Cookie", format!("{SESSION_COOKIE}=stale-session"))
            .body(Body::empty())
            .unwrap();
        let resp = protected_app(&strategy).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(introspector.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_bad_bearer_token_is_unauthorized() {
        let strategy = AuthStrategy::oidc_with(
            Arc::new(FakeProvider),
            Arc::new(CountingIntrospector::default()),
            "http://localhost:3001",
        );

        let req = HttpRequest::builder()
            .uri("/Goal")
            .header("Authorization", "Bearer bad-token")
            .body(Body::empty())
            .unwrap();
        let resp = protected_app(&strategy).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_callback_establishes_session() {
        let strategy = AuthStrategy::oidc_with(
            Arc::new(FakeProvider),
            Arc::new(CountingIntrospector::default()),
            "http://localhost:3001",
        );
        let app = protected_app(&strategy);

        // The callback exchanges the code and sets the session cookie
        let resp = app
            .clone()
            .oneshot(get_request("/redirect?code=good-code"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let set_cookie = resp
            .headers()
            .get("set-cookie")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(set_cookie.starts_with(SESSION_COOKIE));
        let cookie_pair = set_cookie.split(';').next().unwrap().to_string();

        // The session now reaches the controller without a bearer token
        let req = HttpRequest::builder()
            .uri("/Goal")
            .header("Cookie", &cookie_pair)
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        // Logout drops the session; the next request redirects to login
        let req = HttpRequest::builder()
            .uri("/logout")
            .header("Cookie", &cookie_pair)
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);

        let req = HttpRequest::builder()
            .uri("/Goal")
            .header("Cookie", &cookie_pair)
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    #[tokio::test]
    async fn test_rejected_code_does_not_create_session() {
        let strategy = AuthStrategy::oidc_with(
            Arc::new(FakeProvider),
            Arc::new(CountingIntrospector::default()),
            "http://localhost:3001",
        );

        let resp = protected_app(&strategy)
            .oneshot(get_request("/redirect?code=bad-code"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_scope_layer_only_for_authenticating_modes() {
        // Disabled mode attaches no scope middleware: anonymous requests pass
        let strategy = AuthStrategy::Disabled;
        let router = Router::new().route("/Goal", get(|| async { "ok" }));
        let router = strategy.apply_scopes("Goal", router);
        let resp = router.oneshot(get_request("/Goal")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
