//! Deterministic track RNG.
//!
//! Wraps `ChaCha8Rng` so that a given seed always produces the same track on
//! every platform. The session owns the only instance and re-seeds it on
//! reset; nothing in the crate touches `rand::thread_rng()`.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Default seed used when no explicit seed is provided.
pub const DEFAULT_SEED: u64 = 42;

pub struct TrackRng(pub ChaCha8Rng);

impl Default for TrackRng {
    fn default() -> Self {
        Self::from_seed_u64(DEFAULT_SEED)
    }
}

impl TrackRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Restart the stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.0 = ChaCha8Rng::seed_from_u64(seed);
    }
}
