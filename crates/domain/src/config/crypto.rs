use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::params::{system_parameters, SystemParameters, DEFAULT_KEY_SIZE};

/// Which cryptographic parameter set session nonces are drawn for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoConfig {
    /// Issuer key size in bits (1024, 2048 or 4096).
    #[serde(default = "d_key_size")]
    pub key_size: u32,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            key_size: d_key_size(),
        }
    }
}

impl CryptoConfig {
    pub fn system_parameters(&self) -> Result<&'static SystemParameters> {
        system_parameters(self.key_size)
    }
}

fn d_key_size() -> u32 {
    DEFAULT_KEY_SIZE
}
