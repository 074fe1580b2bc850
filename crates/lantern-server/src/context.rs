//! Per-request side channel between the controller and later middleware.
//!
//! The controller records what it did (resource, action, the entity it
//! touched); middleware running after it in the same chain — audit,
//! authorization — reads the entries back instead of re-deriving them. The
//! channel is typed and request-scoped: an `Arc<RequestContext>` in the
//! request extensions, never a global or a string-keyed map.

use std::sync::{Arc, OnceLock};

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use serde_json::Value;

/// The action a controller operation performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Search,
    Read,
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Search => write!(f, "search"),
            Self::Read => write!(f, "read"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// The entity a controller operation touched. Deletes record the bare id —
/// the record no longer exists at that point.
#[derive(Debug, Clone)]
pub enum ContextPayload {
    Matches(Vec<Value>),
    Record(Value),
    DeletedId(String),
}

/// Request-scoped context entries, each written once per request.
///
/// The controller sets resource and action on entry — before any store I/O —
/// so a failure mid-operation still leaves the attempted action readable.
/// Entries are never rolled back; repeated writes are ignored.
#[derive(Debug, Default)]
pub struct RequestContext {
    resource: OnceLock<String>,
    action: OnceLock<Action>,
    payload: OnceLock<ContextPayload>,
}

impl RequestContext {
    pub fn set_resource(&self, resource: &str) {
        let _ = self.resource.set(resource.to_string());
    }

    pub fn set_action(&self, action: Action) {
        let _ = self.action.set(action);
    }

    pub fn set_payload(&self, payload: ContextPayload) {
        let _ = self.payload.set(payload);
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource.get().map(String::as_str)
    }

    pub fn action(&self) -> Option<Action> {
        self.action.get().copied()
    }

    pub fn payload(&self) -> Option<&ContextPayload> {
        self.payload.get()
    }
}

/// Installs a fresh context ahead of the controller and reads it back after
/// the inner service completes, emitting the audit log line.
pub async fn request_context(mut req: Request, next: Next) -> Response {
    let ctx = Arc::new(RequestContext::default());
    req.extensions_mut().insert(ctx.clone());

    let resp = next.run(req).await;

    if let (Some(resource), Some(action)) = (ctx.resource(), ctx.action()) {
        let entity = match ctx.payload() {
            Some(ContextPayload::Record(record)) => {
                record.get("id").and_then(|v| v.as_str()).map(str::to_string)
            }
            Some(ContextPayload::DeletedId(id)) => Some(id.clone()),
            Some(ContextPayload::Matches(matches)) => Some(format!("{} matches", matches.len())),
            None => None,
        };
        tracing::info!(
            resource,
            action = %action,
            entity = entity.as_deref().unwrap_or("-"),
            status = resp.status().as_u16(),
            "resource operation"
        );
    }

    resp
}
