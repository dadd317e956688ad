//! Cryptographic system parameters, keyed by public-key size.
//!
//! Only the statistical zero-knowledge security parameter is needed by the
//! session layer: it bounds the size of session nonces.

use serde::Serialize;

use crate::error::{Error, Result};

/// Parameters for one key size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SystemParameters {
    /// Public-key modulus size in bits.
    pub key_size: u32,
    /// Statistical zero-knowledge security parameter, in bits.
    pub lstatzk: u32,
}

impl SystemParameters {
    /// Number of bytes needed to hold a value below `2^lstatzk`.
    pub fn nonce_bytes(&self) -> usize {
        self.lstatzk.div_ceil(8) as usize
    }
}

pub const DEFAULT_KEY_SIZE: u32 = 2048;

static DEFAULT_SYSTEM_PARAMETERS: [SystemParameters; 3] = [
    SystemParameters { key_size: 1024, lstatzk: 80 },
    SystemParameters { key_size: 2048, lstatzk: 128 },
    SystemParameters { key_size: 4096, lstatzk: 128 },
];

/// Look up the parameter set for `key_size`.
pub fn system_parameters(key_size: u32) -> Result<&'static SystemParameters> {
    DEFAULT_SYSTEM_PARAMETERS
        .iter()
        .find(|p| p.key_size == key_size)
        .ok_or(Error::UnknownKeySize(key_size))
}

/// All supported key sizes, ascending.
pub fn supported_key_sizes() -> impl Iterator<Item = u32> {
    DEFAULT_SYSTEM_PARAMETERS.iter().map(|p| p.key_size)
}
