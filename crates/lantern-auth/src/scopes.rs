//! Per-resource authorization scope checks.
//!
//! Authorization is resource-name-scoped, not globally uniform: each resource
//! group carries its own check, layered on top of whichever base auth mode is
//! active.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AuthError;
use crate::identity::{AccessKind, AuthIdentity};

/// State for the scope-check middleware of one resource group.
#[derive(Debug, Clone)]
pub struct ScopeCheck {
    resource: String,
}

impl ScopeCheck {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }
}

/// Middleware enforcing the resource scope implied by the active auth mode.
///
/// Expects the base auth chain to have attached an [`AuthIdentity`] to the
/// request; a request that reached this point without one is unauthorized.
pub async fn scope_gate(
    State(check): State<ScopeCheck>,
    req: Request,
    next: Next,
) -> Response {
    let Some(identity) = req.extensions().get::<AuthIdentity>() else {
        return AuthError::unauthorized("Authentication required").into_response();
    };

    let access = AccessKind::from_method(req.method());
    if !identity.allows(&check.resource, access) {
        tracing::info!(
            subject = %identity.subject,
            resource = %check.resource,
            "Access denied: missing scope"
        );
        return AuthError::forbidden(format!(
            "no scope grants {:?} access to {}",
            access, check.resource
        ))
        .into_response();
    }

    next.run(req).await
}
