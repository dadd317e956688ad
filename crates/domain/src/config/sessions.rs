use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::protocol::{ProtocolVersion, VersionRange};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sessions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Upper bound accepted for `max_session_lifetime_secs`: one year.
pub const MAX_SESSION_LIFETIME_SECS: u64 = 365 * 24 * 60 * 60;

/// Session registry configuration: expiry policy and the protocol versions
/// this server accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// How often the expiry sweeper runs.
    #[serde(default = "d_expiry_interval")]
    pub expiry_interval_secs: u64,

    /// Idle time after which a session is timed out, unless the request
    /// carries its own client timeout and the session is still initialized.
    #[serde(default = "d_max_lifetime")]
    pub max_session_lifetime_secs: u64,

    #[serde(default = "d_min_version")]
    pub min_protocol_version: ProtocolVersion,

    #[serde(default = "d_max_version")]
    pub max_protocol_version: ProtocolVersion,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            expiry_interval_secs: d_expiry_interval(),
            max_session_lifetime_secs: d_max_lifetime(),
            min_protocol_version: d_min_version(),
            max_protocol_version: d_max_version(),
        }
    }
}

impl SessionsConfig {
    pub fn expiry_interval(&self) -> Duration {
        Duration::from_secs(self.expiry_interval_secs)
    }

    /// The configured lifetime, clamped to [`MAX_SESSION_LIFETIME_SECS`].
    pub fn max_session_lifetime(&self) -> chrono::Duration {
        let secs = self.max_session_lifetime_secs.min(MAX_SESSION_LIFETIME_SECS);
        chrono::Duration::seconds(secs as i64)
    }

    pub fn version_range(&self) -> VersionRange {
        VersionRange::new(self.min_protocol_version, self.max_protocol_version)
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_expiry_interval() -> u64 {
    10
}
fn d_max_lifetime() -> u64 {
    5 * 60
}
fn d_min_version() -> ProtocolVersion {
    ProtocolVersion::new(2, 4)
}
fn d_max_version() -> ProtocolVersion {
    ProtocolVersion::new(2, 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = SessionsConfig::default();
        assert_eq!(cfg.expiry_interval(), Duration::from_secs(10));
        assert_eq!(cfg.max_session_lifetime(), chrono::Duration::minutes(5));
        assert_eq!(cfg.version_range().min, ProtocolVersion::new(2, 4));
    }

    #[test]
    fn oversized_lifetime_is_clamped() {
        let cfg = SessionsConfig {
            max_session_lifetime_secs: u64::MAX,
            ..SessionsConfig::default()
        };
        assert_eq!(cfg.max_session_lifetime(), chrono::Duration::days(365));
    }

    #[test]
    fn versions_parse_from_strings() {
        let cfg: SessionsConfig = toml::from_str(
            r#"
            min_protocol_version = "2.3"
            max_protocol_version = "2.5"
        "#,
        )
        .unwrap();
        assert_eq!(cfg.min_protocol_version, ProtocolVersion::new(2, 3));
        assert_eq!(cfg.max_protocol_version, ProtocolVersion::new(2, 5));
        assert_eq!(cfg.expiry_interval_secs, 10);
    }
}
