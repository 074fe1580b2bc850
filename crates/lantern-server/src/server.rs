use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use lantern_auth::{AuthError, AuthStrategy};
use lantern_db_memory::MemoryStore;
use lantern_storage::DocumentStore;

use crate::{
    config::AppConfig, context, handlers, middleware as app_middleware,
    routes::{self, ResourceMiddleware},
};

/// Builds the application with the default in-memory store and the auth
/// strategy resolved from configuration.
pub fn build_app(cfg: &AppConfig) -> Result<Router, AuthError> {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let strategy = AuthStrategy::from_config(&cfg.auth, &cfg.base_url())?;
    Ok(build_app_with(cfg, store, strategy))
}

/// Builds the application from injected collaborators. Tests substitute an
/// in-memory fake store and a pre-resolved strategy here.
pub fn build_app_with(
    cfg: &AppConfig,
    store: Arc<dyn DocumentStore>,
    strategy: AuthStrategy,
) -> Router {
    let resource_middleware = ResourceMiddleware::new();
    let api = routes::register_routes(store, cfg, &strategy, &resource_middleware);

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .merge(api)
        // Middleware stack (order: request id -> context channel -> cors/compression/trace -> body limit)
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(middleware::from_fn(context::request_context))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<_>| {
                let req_id = req
                    .extensions()
                    .get::<axum::http::HeaderValue>()
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                tracing::info_span!(
                    "http.request",
                    http.method = %req.method(),
                    http.target = %req.uri(),
                    request_id = %req_id
                )
            }),
        )
        .layer(axum::extract::DefaultBodyLimit::max(cfg.server.body_limit_bytes))
}

pub struct LanternServer {
    addr: SocketAddr,
    app: Router,
}

impl LanternServer {
    pub async fn run(self) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!(addr = %self.addr, "Lantern server listening");
        axum::serve(listener, self.app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutdown signal received");
            })
            .await
    }
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub fn build(self) -> Result<LanternServer, AuthError> {
        let app = build_app(&self.config)?;
        Ok(LanternServer {
            addr: self.addr,
            app,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
