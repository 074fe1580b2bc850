//! Authentication strategies for the Lantern server.
//!
//! Exactly one of three mutually exclusive security models is resolved from
//! configuration at process start and installed onto the route table:
//! no authentication, an OpenID Connect session flow (with a bearer-token
//! introspection branch for machine clients), or the delegated HEART bearer
//! profile.

pub mod config;
pub mod error;
pub mod heart;
pub mod identity;
pub mod introspect;
pub mod oidc;
pub mod scopes;
pub mod session;
pub mod strategy;

pub use config::{AuthConfig, AuthMode};
pub use error::AuthError;
pub use identity::{AccessKind, AuthIdentity, IdentitySource};
pub use introspect::{HttpIntrospector, TokenIntrospector};
pub use oidc::{HttpOidcProvider, OidcProvider};
pub use session::SessionStore;
pub use strategy::AuthStrategy;
