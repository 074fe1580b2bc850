//! In-memory session store for the interactive OIDC flow.

use std::collections::HashMap;
use std::sync::RwLock;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

use crate::identity::AuthIdentity;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "lantern_session";

/// Maps opaque session ids to the identity established at login.
///
/// Session ids are 32 random bytes, base64url-encoded (43 characters),
/// generated from the system CSPRNG. The store lives for the process
/// lifetime; sessions are dropped on logout.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, AuthIdentity>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates a fresh session id.
    #[must_use]
    pub fn generate_id() -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Stores an identity under a fresh session id and returns the id.
    pub fn create(&self, identity: AuthIdentity) -> String {
        let id = Self::generate_id();
        self.sessions
            .write()
            .expect("session store lock poisoned")
            .insert(id.clone(), identity);
        id
    }

    /// Looks up the identity for a session id.
    pub fn get(&self, id: &str) -> Option<AuthIdentity> {
        self.sessions
            .read()
            .expect("session store lock poisoned")
            .get(id)
            .cloned()
    }

    /// Drops a session. Unknown ids are ignored.
    pub fn remove(&self, id: &str) {
        self.sessions
            .write()
            .expect("session store lock poisoned")
            .remove(id);
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .expect("session store lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_lifecycle() {
        let store = SessionStore::new();
        assert!(store.is_empty());

        let id = store.create(AuthIdentity::session("alice"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id).unwrap().subject, "alice");

        store.remove(&id);
        assert!(store.get(&id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_unknown_session_is_noop() {
        let store = SessionStore::new();
        store.remove("no-such-session");
        assert!(store.is_empty());
    }

    #[test]
    fn test_session_ids_are_unique_and_urlsafe() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            let id = SessionStore::generate_id();
            assert_eq!(id.len(), 43);
            assert!(id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));
            assert!(seen.insert(id));
        }
    }
}
