//! State Hashing
//!
//! Deterministic SHA-256 over session state. Displays compare the hash to
//! skip redraws, and tests use it to prove a query has no side effects.

use sha2::{Digest, Sha256};

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for session state.
///
/// Order of updates is part of the hash; callers must feed fields in a fixed
/// order and iterate ordered collections only.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for session snapshots.
    pub fn for_session() -> Self {
        Self::new(b"DARTS_PARTY_SESSION_V1")
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i64 value (little-endian).
    #[inline]
    pub fn update_i64(&mut self, value: i64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a usize, widened to u64 so the hash is platform-independent.
    #[inline]
    pub fn update_usize(&mut self, value: usize) {
        self.update_u64(value as u64);
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Update with a length-prefixed string.
    ///
    /// The prefix keeps `["ab", "c"]` and `["a", "bc"]` apart.
    #[inline]
    pub fn update_str(&mut self, value: &str) {
        self.update_usize(value.len());
        self.hasher.update(value.as_bytes());
    }

    /// Update with an optional string; `None` and `Some("")` hash differently.
    #[inline]
    pub fn update_opt_str(&mut self, value: Option<&str>) {
        match value {
            Some(s) => {
                self.update_u8(1);
                self.update_str(s);
            }
            None => self.update_u8(0),
        }
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute a session state hash.
///
/// The closure feeds the session-specific fields after the domain separator.
pub fn compute_state_hash<F>(add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_session();
    add_state(&mut hasher);
    hasher.finalize()
}

/// Hex form of a hash, as shipped in snapshots.
pub fn to_hex(hash: &StateHash) -> String {
    hex::encode(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_hasher_determinism() {
        let make_hash = || {
            compute_state_hash(|hasher| {
                hasher.update_str("Alice");
                hasher.update_i64(-40);
                hasher.update_bool(true);
                hasher.update_opt_str(None);
            })
        };

        assert_eq!(make_hash(), make_hash());
    }

    #[test]
    fn test_hash_order_matters() {
        let hash1 = compute_state_hash(|h| {
            h.update_i64(1);
            h.update_i64(2);
        });
        let hash2 = compute_state_hash(|h| {
            h.update_i64(2);
            h.update_i64(1);
        });

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_string_boundaries_matter() {
        let hash1 = compute_state_hash(|h| {
            h.update_str("ab");
            h.update_str("c");
        });
        let hash2 = compute_state_hash(|h| {
            h.update_str("a");
            h.update_str("bc");
        });

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_none_differs_from_empty() {
        let none = compute_state_hash(|h| h.update_opt_str(None));
        let empty = compute_state_hash(|h| h.update_opt_str(Some("")));

        assert_ne!(none, empty);
    }

    #[test]
    fn test_hex_length() {
        let hash = compute_state_hash(|h| h.update_u8(7));
        assert_eq!(to_hex(&hash).len(), 64);
    }
}
