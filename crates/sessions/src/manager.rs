//! Session manager: starts sessions and hands out the registry.
//!
//! The manager owns the collaborators a session needs at birth (clock,
//! random source, system parameters, supported protocol versions) and the
//! store every later protocol step looks sessions up in.

use std::sync::Arc;

use cx_domain::config::{CryptoConfig, SessionsConfig};
use cx_domain::error::Result;
use cx_domain::params::SystemParameters;
use cx_domain::protocol::{
    Action, ProtocolVersion, RequestorRequest, VersionRange, SESSION_CONTEXT,
};
use cx_domain::trace::TraceEvent;

use crate::clock::{Clock, SystemClock};
use crate::expiry::ExpiryPolicy;
use crate::random::RandomSource;
use crate::session::{Session, SessionHandle};
use crate::store::{MemorySessionStore, SessionStore};
use crate::sweeper::Sweeper;
use crate::token::new_session_token;

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    rng: Arc<RandomSource>,
    params: SystemParameters,
    versions: VersionRange,
}

impl SessionManager {
    /// Build a manager over an in-memory store, using wall-clock time and an
    /// entropy-seeded random source.
    pub fn from_config(sessions: &SessionsConfig, crypto: &CryptoConfig) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let policy = ExpiryPolicy::new(sessions.max_session_lifetime());
        let store = Arc::new(MemorySessionStore::new(clock.clone(), policy));
        Ok(Self::new(
            store,
            clock,
            Arc::new(RandomSource::from_entropy()),
            *crypto.system_parameters()?,
            sessions.version_range(),
        ))
    }

    /// Build a manager from explicit parts.
    pub fn new(
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        rng: Arc<RandomSource>,
        params: SystemParameters,
        versions: VersionRange,
    ) -> Self {
        Self {
            store,
            clock,
            rng,
            params,
            versions,
        }
    }

    /// Start a session for `action`.
    ///
    /// Takes ownership of the request: a fresh nonce and the session
    /// context are written into it, binding it to this session.
    pub fn start(&self, action: Action, mut rrequest: RequestorRequest) -> SessionHandle {
        let token = new_session_token(&self.rng);

        let request = rrequest.session_request_mut();
        request.set_nonce(self.rng.nonce(&self.params));
        request.set_context(SESSION_CONTEXT);

        let client_timeout = rrequest.base().client_timeout;
        let handle = Session::new(token.clone(), action, rrequest, self.clock.clone()).into_handle();
        self.store.add(&token, handle.clone());

        TraceEvent::SessionStarted {
            token,
            action,
            client_timeout,
        }
        .emit();

        handle
    }

    pub fn get(&self, token: &str) -> Option<SessionHandle> {
        self.store.get(token)
    }

    /// Write back a session after a protocol step.  No-op for the in-memory
    /// store; required for stores that keep copies.
    pub fn update(&self, session: &SessionHandle) {
        let token = session.lock().token().to_owned();
        self.store.update(&token, session);
    }

    /// Agree on a protocol version with a client supporting
    /// `[client_min, client_max]` and fix it on `session`.
    pub fn negotiate_version(
        &self,
        session: &mut Session,
        client_min: ProtocolVersion,
        client_max: ProtocolVersion,
    ) -> Result<ProtocolVersion> {
        let version = self.versions.negotiate(client_min, client_max)?;
        session.set_version(version)?;
        Ok(version)
    }

    pub fn versions(&self) -> VersionRange {
        self.versions
    }

    pub fn system_parameters(&self) -> &SystemParameters {
        &self.params
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// A sweeper over this manager's store.
    pub fn sweeper(&self, interval: std::time::Duration) -> Sweeper {
        Sweeper::new(self.store.clone(), interval)
    }
}
