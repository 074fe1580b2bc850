//! Route registration for the resource catalog.
//!
//! For each resource name the registrar builds a route group bound to one
//! generic controller instance, attaches any configured per-resource
//! middleware, layers the scope check implied by the active auth method, and
//! binds the six CRUD routes plus the collection-level conditional
//! operations. The batch route is registered once, outside the loop.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use lantern_auth::AuthStrategy;
use lantern_storage::DocumentStore;

use crate::batch::BatchController;
use crate::config::AppConfig;
use crate::controller::ResourceController;
use crate::registry::{self, ResourceSpec};

/// A transformation applied to one resource's route group, for cross-cutting
/// concerns configured outside this core.
pub type RouterHook = Box<dyn Fn(Router) -> Router + Send + Sync>;

/// Per-resource middleware lists, keyed by resource name. The batch route
/// reads the `"Batch"` entry.
#[derive(Default)]
pub struct ResourceMiddleware {
    hooks: HashMap<String, Vec<RouterHook>>,
}

impl ResourceMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, resource: impl Into<String>, hook: RouterHook) {
        self.hooks.entry(resource.into()).or_default().push(hook);
    }

    fn apply(&self, resource: &str, mut router: Router) -> Router {
        if let Some(hooks) = self.hooks.get(resource) {
            for hook in hooks {
                router = hook(router);
            }
        }
        router
    }
}

/// Builds the route group for one resource and merges it into `router`.
pub fn register_resource(
    spec: &'static ResourceSpec,
    store: Arc<dyn DocumentStore>,
    cfg: &AppConfig,
    strategy: &AuthStrategy,
    middleware: &ResourceMiddleware,
    router: Router,
) -> Router {
    let rc = ResourceController::new(spec, store, &cfg.base_url(), cfg.search.page_cap);

    let group = Router::new()
        .route(
            &format!("/{}", spec.name),
            get(ResourceController::index)
                .post(ResourceController::create)
                .put(ResourceController::conditional_update)
                .delete(ResourceController::conditional_delete),
        )
        .route(
            &format!("/{}/{{id}}", spec.name),
            get(ResourceController::show)
                .put(ResourceController::update)
                .delete(ResourceController::delete),
        )
        .with_state(rc);

    let group = middleware.apply(spec.name, group);
    let group = strategy.apply_scopes(spec.name, group);
    router.merge(group)
}

/// Registers the route groups for every resource in the registry, the batch
/// route, and the active auth strategy's chain.
pub fn register_routes(
    store: Arc<dyn DocumentStore>,
    cfg: &AppConfig,
    strategy: &AuthStrategy,
    middleware: &ResourceMiddleware,
) -> Router {
    let mut router = Router::new();
    for spec in registry::RESOURCES {
        router = register_resource(spec, store.clone(), cfg, strategy, middleware, router);
    }

    // Batch support, outside the per-resource loop
    let batch = Router::new()
        .route("/", post(BatchController::post))
        .with_state(BatchController::new(store, &cfg.base_url()));
    router = router.merge(middleware.apply("Batch", batch));

    strategy.apply(router)
}
