//! Session store: the token to session registry.
//!
//! # Locking contract
//!
//! Two levels of locks are involved and every implementation must keep
//! them in this order:
//!
//! 1. The store lock guards only the map structure.  It is never held while
//!    a caller mutates session fields.
//! 2. Each session's own mutex guards its fields.
//!
//! Callers fetch a handle with [`SessionStore::get`], drop the store lock,
//! then lock the session.  The sweeper is the only code that holds both:
//! it takes the store *read* lock and then each session lock in turn,
//! releases all of them, and only then takes the store *write* lock to
//! delete.  A session lock is never held together with the store write lock.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use cx_domain::protocol::Status;
use cx_domain::trace::TraceEvent;

use crate::clock::Clock;
use crate::expiry::{ExpiryDecision, ExpiryPolicy};
use crate::session::SessionHandle;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Store trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A keyed registry of sessions.
pub trait SessionStore: Send + Sync {
    /// Look up a session.  `None` means the token is unknown (never issued,
    /// or already reclaimed).
    fn get(&self, token: &str) -> Option<SessionHandle>;

    /// Register a new session under `token`.
    fn add(&self, token: &str, session: SessionHandle);

    /// Persist changes made to `session` through its lock.
    ///
    /// Stores that hold shared handles see every change immediately and may
    /// treat this as a no-op.  Stores that keep copies (serialized or
    /// remote) must write the session back here.
    fn update(&self, token: &str, session: &SessionHandle);

    /// One expiry pass: time out idle sessions, then remove idle finished
    /// ones.
    fn delete_expired(&self) -> SweepReport;

    /// Number of sessions currently registered.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of one expiry pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    /// Tokens moved to `Timeout` this pass.
    pub timed_out: Vec<String>,
    /// Tokens deleted from the store this pass.
    pub removed: Vec<String>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.timed_out.is_empty() && self.removed.is_empty()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-memory store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process-local store: a map of shared handles behind one `RwLock`.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    clock: Arc<dyn Clock>,
    policy: ExpiryPolicy,
}

impl MemorySessionStore {
    pub fn new(clock: Arc<dyn Clock>, policy: ExpiryPolicy) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            clock,
            policy,
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, token: &str) -> Option<SessionHandle> {
        self.sessions.read().get(token).cloned()
    }

    fn add(&self, token: &str, session: SessionHandle) {
        self.sessions.write().insert(token.to_owned(), session);
    }

    fn update(&self, _token: &str, _session: &SessionHandle) {
        // The map holds the same `Arc` the caller mutated.
    }

    fn delete_expired(&self) -> SweepReport {
        let mut report = SweepReport::default();
        let now = self.clock.now();

        // Phase 1: read lock only, so get/add keep flowing during the scan.
        {
            let sessions = self.sessions.read();
            report.scanned = sessions.len();
            for (token, handle) in sessions.iter() {
                let mut session = handle.lock();
                match self.policy.evaluate(&session, now) {
                    Some(ExpiryDecision::TimeOut) => {
                        let status = session.status();
                        let timeout_secs = self
                            .policy
                            .timeout_for(&session)
                            .map(|t| t.num_seconds())
                            .unwrap_or_default();
                        if let Err(e) = session.set_status(Status::Timeout) {
                            tracing::warn!(token = %token, error = %e, "session timeout rejected");
                            continue;
                        }
                        TraceEvent::SessionExpired {
                            token: token.clone(),
                            status,
                            timeout_secs,
                        }
                        .emit();
                        report.timed_out.push(token.clone());
                    }
                    Some(ExpiryDecision::Remove) => {
                        report.removed.push(token.clone());
                    }
                    None => {}
                }
            }
        }

        // Phase 2: every session lock is released; take the write lock once.
        if !report.removed.is_empty() {
            let mut sessions = self.sessions.write();
            for token in &report.removed {
                sessions.remove(token);
                TraceEvent::SessionRemoved {
                    token: token.clone(),
                }
                .emit();
            }
        }

        report
    }

    fn len(&self) -> usize {
        self.sessions.read().len()
    }
}
