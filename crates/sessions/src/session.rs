//! The session entity: the mutable record of one protocol run.
//!
//! A [`Session`] is always reached through a [`SessionHandle`], so every
//! field read or write happens with the session's own mutex held.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use cx_domain::error::{Error, Result};
use cx_domain::protocol::{
    Action, ProofP, ProtocolVersion, RequestorRequest, SessionRequest, SessionResult, Status,
};
use cx_domain::scheme::SchemeManagerIdentifier;
use cx_domain::trace::TraceEvent;

use crate::clock::Clock;

/// Shared, lockable session.  The store holds one clone, callers borrow
/// others for the duration of a protocol step.
pub type SessionHandle = Arc<Mutex<Session>>;

pub struct Session {
    token: String,
    action: Action,
    version: Option<ProtocolVersion>,
    rrequest: RequestorRequest,

    status: Status,
    last_active: DateTime<Utc>,
    returned: bool,
    result: SessionResult,

    /// Keyshare proofs collected so far, one per scheme manager.
    kss_proofs: HashMap<SchemeManagerIdentifier, ProofP>,

    clock: Arc<dyn Clock>,
}

impl Session {
    /// Create a session in the `Initialized` state.  The request should
    /// already carry its nonce and context.
    pub fn new(
        token: String,
        action: Action,
        rrequest: RequestorRequest,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let result = SessionResult::new(token.clone(), action);
        Self {
            token,
            action,
            version: None,
            rrequest,
            status: Status::Initialized,
            last_active: clock.now(),
            returned: false,
            result,
            kss_proofs: HashMap::new(),
            clock,
        }
    }

    pub fn into_handle(self) -> SessionHandle {
        Arc::new(Mutex::new(self))
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn version(&self) -> Option<ProtocolVersion> {
        self.version
    }

    /// Fix the protocol version for this session.  Only the first call
    /// succeeds.
    pub fn set_version(&mut self, version: ProtocolVersion) -> Result<()> {
        if let Some(existing) = self.version {
            return Err(Error::VersionAlreadySet(existing));
        }
        self.version = Some(version);
        TraceEvent::VersionNegotiated {
            token: self.token.clone(),
            version,
        }
        .emit();
        Ok(())
    }

    pub fn requestor_request(&self) -> &RequestorRequest {
        &self.rrequest
    }

    /// The session-bound protocol request (nonce and context filled in).
    pub fn request(&self) -> &SessionRequest {
        self.rrequest.session_request()
    }

    /// Client timeout from the requestor, in seconds.  `0` means none.
    pub fn client_timeout(&self) -> u64 {
        self.rrequest.base().client_timeout
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    /// Record protocol activity so the sweeper leaves the session alone.
    pub fn mark_alive(&mut self) {
        self.last_active = self.clock.now();
    }

    /// Move the session to `status`.  Every status write also marks the
    /// session alive.
    ///
    /// Finished sessions never change status, and a session never moves
    /// back to an earlier state.
    pub fn set_status(&mut self, status: Status) -> Result<()> {
        let from = self.status;
        if !from.can_transition_to(status) {
            return Err(Error::InvalidTransition { from, to: status });
        }
        self.mark_alive();
        self.status = status;
        self.result.status = status;
        if from != status {
            TraceEvent::StatusChanged {
                token: self.token.clone(),
                from,
                to: status,
            }
            .emit();
        }
        Ok(())
    }

    pub fn returned(&self) -> bool {
        self.returned
    }

    pub fn result(&self) -> &SessionResult {
        &self.result
    }

    /// Fill in disclosed attributes, signature or error as the protocol
    /// progresses.
    pub fn result_mut(&mut self) -> &mut SessionResult {
        &mut self.result
    }

    /// Hand out the result once the session has finished.  Returns `None`
    /// while the session is still running or if the result was already
    /// delivered.
    pub fn take_result(&mut self) -> Option<SessionResult> {
        if !self.is_finished() || self.returned {
            return None;
        }
        self.returned = true;
        Some(self.result.clone())
    }

    /// Store the keyshare proof for `scheme`, replacing any earlier one.
    pub fn add_proof(&mut self, scheme: SchemeManagerIdentifier, proof: ProofP) {
        self.kss_proofs.insert(scheme, proof);
    }

    pub fn proof(&self, scheme: &SchemeManagerIdentifier) -> Option<&ProofP> {
        self.kss_proofs.get(scheme)
    }

    pub fn proofs(&self) -> &HashMap<SchemeManagerIdentifier, ProofP> {
        &self.kss_proofs
    }

    #[cfg(test)]
    pub(crate) fn set_last_active(&mut self, at: DateTime<Utc>) {
        self.last_active = at;
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token)
            .field("action", &self.action)
            .field("version", &self.version)
            .field("status", &self.status)
            .field("last_active", &self.last_active)
            .field("returned", &self.returned)
            .field("kss_proofs", &self.kss_proofs.len())
            .finish_non_exhaustive()
    }
}
