//! Shared pseudo-random source for session tokens and nonces.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use cx_domain::params::SystemParameters;
use cx_domain::protocol::Nonce;

/// A seeded `StdRng` behind a mutex so one source can be shared by every
/// caller in the process.
pub struct RandomSource {
    rng: Mutex<StdRng>,
}

impl RandomSource {
    /// Seed once from operating-system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic source, for tests.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Uniform index in `0..bound`.
    pub fn index(&self, bound: usize) -> usize {
        self.rng.lock().gen_range(0..bound)
    }

    /// A random value below `2^lstatzk` for the given parameter set.
    pub fn nonce(&self, params: &SystemParameters) -> Nonce {
        let mut bytes = vec![0u8; params.nonce_bytes()];
        self.rng.lock().fill_bytes(&mut bytes);
        let excess = (bytes.len() as u32 * 8) - params.lstatzk;
        if excess > 0 {
            bytes[0] &= 0xff >> excess;
        }
        Nonce::from_bytes(bytes)
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}
