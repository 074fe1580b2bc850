//! Record identifier generation and validation.
//!
//! Ids are 24 lower-hex characters: a 4-byte big-endian unix-seconds prefix,
//! a 5-byte random component chosen once per process, and a 3-byte rolling
//! counter. Lexicographic order therefore follows creation time, and the id
//! is safe to embed in a URL path unescaped.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};

use rand::RngCore;

use crate::error::{CoreError, Result};

static PROCESS_RANDOM: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

fn process_random() -> &'static [u8; 5] {
    PROCESS_RANDOM.get_or_init(|| {
        let mut bytes = [0u8; 5];
        rand::thread_rng().fill_bytes(&mut bytes);
        bytes
    })
}

fn counter() -> &'static AtomicU32 {
    COUNTER.get_or_init(|| AtomicU32::new(rand::thread_rng().next_u32()))
}

/// Generates a fresh record id.
///
/// Ids are globally unique across processes (random component) and sortable
/// by creation second within a process.
pub fn generate_id() -> String {
    let seconds = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0);
    let count = counter().fetch_add(1, Ordering::Relaxed);

    let mut bytes = [0u8; 12];
    bytes[..4].copy_from_slice(&seconds.to_be_bytes());
    bytes[4..9].copy_from_slice(process_random());
    bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
    hex::encode(bytes)
}

/// Validates the syntactic form of a record id: exactly 24 hex characters.
///
/// Route ids that fail this check must be rejected before any store access.
pub fn validate_id(id: &str) -> Result<()> {
    if id.len() == 24 && id.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(CoreError::invalid_id(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_is_valid() {
        let id = generate_id();
        assert_eq!(id.len(), 24);
        assert!(validate_id(&id).is_ok());
        assert!(id.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(generate_id()));
        }
    }

    #[test]
    fn test_generated_ids_share_time_prefix() {
        let a = generate_id();
        let b = generate_id();
        // Same second, give or take a tick
        let ta = u32::from_str_radix(&a[..8], 16).unwrap();
        let tb = u32::from_str_radix(&b[..8], 16).unwrap();
        assert!(tb.wrapping_sub(ta) <= 1);
    }

    #[test]
    fn test_validate_rejects_malformed_ids() {
        assert!(validate_id("").is_err());
        assert!(validate_id("bad-id").is_err());
        assert!(validate_id("123").is_err());
        assert!(validate_id(&"g".repeat(24)).is_err());
        assert!(validate_id(&"a".repeat(23)).is_err());
        assert!(validate_id(&"a".repeat(25)).is_err());
    }

    #[test]
    fn test_validate_accepts_uppercase_hex() {
        assert!(validate_id(&"A1B2C3D4E5F6A1B2C3D4E5F6".to_string()).is_ok());
    }

    #[test]
    fn test_validate_error_carries_input() {
        match validate_id("nope") {
            Err(CoreError::InvalidId(id)) => assert_eq!(id, "nope"),
            other => panic!("expected InvalidId, got {other:?}"),
        }
    }
}
