//! Deterministic Random Number Generator
//!
//! Xorshift128+ seeded through SplitMix64. The only consumer is bracket
//! pairing, which must be random at a party and reproducible under test.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Deterministic PRNG using the Xorshift128+ algorithm.
///
/// Given the same seed, produces the same sequence on every platform, so a
/// bracket shuffled from a recorded seed can be rebuilt exactly.
///
/// # Example
///
/// ```
/// use darts_party::core::rng::DeterministicRng;
///
/// let mut a = DeterministicRng::new(7);
/// let mut b = DeterministicRng::new(7);
/// assert_eq!(a.next_u64(), b.next_u64());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // Xorshift never leaves the all-zero state
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Create an RNG from a freshly derived, unpredictable seed.
    pub fn from_entropy() -> Self {
        Self::new(fresh_seed())
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a random index in range [0, max).
    ///
    /// Returns 0 when `max` is 0.
    #[inline]
    pub fn next_index(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        // Modulo bias is negligible for roster-sized ranges
        (self.next_u64() % max as u64) as usize
    }

    /// Shuffle a slice in place (Fisher-Yates).
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_index(i + 1);
            slice.swap(i, j);
        }
    }
}

/// SplitMix64 for seed initialization.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive a seed from a nonce and the wall-clock time.
///
/// The nonce is typically a v4 UUID; mixing in the timestamp keeps two
/// servers started from the same image from shuffling identically.
pub fn derive_seed(nonce: &[u8; 16], timestamp_nanos: i64) -> u64 {
    let mut hasher = Sha256::new();

    // Domain separator
    hasher.update(b"DARTS_PARTY_SEED_V1");
    hasher.update(nonce);
    hasher.update(timestamp_nanos.to_le_bytes());

    let hash = hasher.finalize();

    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash[0..8]);
    u64::from_le_bytes(seed)
}

/// Produce a seed nobody can predict ahead of the party.
pub fn fresh_seed() -> u64 {
    let nonce = uuid::Uuid::new_v4().into_bytes();
    let now = Utc::now();
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_millis().saturating_mul(1_000_000));
    derive_seed(&nonce, nanos)
}
