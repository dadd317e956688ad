use serde::Serialize;

use crate::protocol::{Action, ProtocolVersion, Status};

/// Structured trace events emitted across all credex crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    SessionStarted {
        token: String,
        action: Action,
        client_timeout: u64,
    },
    VersionNegotiated {
        token: String,
        version: ProtocolVersion,
    },
    StatusChanged {
        token: String,
        from: Status,
        to: Status,
    },
    SessionExpired {
        token: String,
        status: Status,
        timeout_secs: i64,
    },
    SessionRemoved {
        token: String,
    },
    SweepCompleted {
        scanned: usize,
        timed_out: usize,
        removed: usize,
        duration_ms: u64,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "cx_event");
    }
}
