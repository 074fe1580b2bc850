//! The authenticated principal attached to a request.

use serde::{Deserialize, Serialize};

/// Where an identity came from. Scope enforcement only applies to
/// introspected bearer tokens; interactive users were authorized at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentitySource {
    /// Established by the session cookie (interactive browser client).
    Session,
    /// Established by bearer-token introspection (machine client).
    Introspection,
}

/// The kind of access a request performs, derived from its method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

impl AccessKind {
    pub fn from_method(method: &axum::http::Method) -> Self {
        if method == axum::http::Method::GET || method == axum::http::Method::HEAD {
            Self::Read
        } else {
            Self::Write
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// Opaque principal information attached to the request for its lifetime.
/// Never persisted by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthIdentity {
    /// Subject identifier at the provider.
    pub subject: String,
    /// Token or identity issuer.
    #[serde(default)]
    pub issuer: String,
    /// Display name, when the provider supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Granted scopes of the form `user/<Resource>.<read|write>`; `*`
    /// wildcards both positions.
    #[serde(default)]
    pub scopes: Vec<String>,
    pub source: IdentitySource,
}

impl AuthIdentity {
    pub fn session(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            issuer: String::new(),
            name: None,
            email: None,
            scopes: Vec::new(),
            source: IdentitySource::Session,
        }
    }

    pub fn introspected(subject: impl Into<String>, scopes: Vec<String>) -> Self {
        Self {
            subject: subject.into(),
            issuer: String::new(),
            name: None,
            email: None,
            scopes,
            source: IdentitySource::Introspection,
        }
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Whether this identity may perform `access` on `resource`.
    ///
    /// Session identities pass: the interactive login flow authorized them.
    /// Introspected identities must hold a matching scope.
    pub fn allows(&self, resource: &str, access: AccessKind) -> bool {
        if self.source == IdentitySource::Session {
            return true;
        }
        self.scopes
            .iter()
            .any(|scope| scope_matches(scope, resource, access))
    }
}

fn scope_matches(scope: &str, resource: &str, access: AccessKind) -> bool {
    let Some(rest) = scope.strip_prefix("user/") else {
        return false;
    };
    let Some((scope_resource, scope_access)) = rest.split_once('.') else {
        return false;
    };
    let resource_ok = scope_resource == "*" || scope_resource == resource;
    let access_ok = scope_access == "*" || scope_access == access.as_str();
    resource_ok && access_ok
}
