mod crypto;
mod observability;
mod sessions;

pub use crypto::*;
pub use observability::*;
pub use sessions::*;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::params::supported_key_sizes;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub crypto: CryptoConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.sessions.expiry_interval_secs == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "sessions.expiry_interval_secs".into(),
                message: "sweep interval must be greater than 0".into(),
            });
        }

        if self.sessions.max_session_lifetime_secs == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "sessions.max_session_lifetime_secs".into(),
                message: "session lifetime must be greater than 0".into(),
            });
        }

        if self.sessions.max_session_lifetime_secs > MAX_SESSION_LIFETIME_SECS {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "sessions.max_session_lifetime_secs".into(),
                message: format!(
                    "session lifetime must be at most {MAX_SESSION_LIFETIME_SECS} seconds"
                ),
            });
        }

        // A session must survive at least one sweep after expiring.
        if self.sessions.max_session_lifetime_secs < self.sessions.expiry_interval_secs {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "sessions.max_session_lifetime_secs".into(),
                message: "lifetime is shorter than the sweep interval".into(),
            });
        }

        if self.sessions.min_protocol_version > self.sessions.max_protocol_version {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "sessions.min_protocol_version".into(),
                message: format!(
                    "min version {} is above max version {}",
                    self.sessions.min_protocol_version, self.sessions.max_protocol_version
                ),
            });
        }

        if let Err(e) = self.crypto.system_parameters() {
            let supported: Vec<String> =
                supported_key_sizes().map(|size| size.to_string()).collect();
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "crypto.key_size".into(),
                message: format!("{e} (supported: {})", supported.join(", ")),
            });
        }

        if !(0.0..=1.0).contains(&self.observability.sample_rate) {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "observability.sample_rate".into(),
                message: "sample rate must be within 0.0..=1.0".into(),
            });
        }

        errors
    }
}
