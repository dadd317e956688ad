//! Session coordination for credential issuance, disclosure and signing.
//!
//! A [`SessionManager`] starts sessions: it mints an unpredictable token,
//! binds a fresh nonce into the request and registers the session in a
//! [`SessionStore`].  Protocol handlers then fetch the session by token,
//! lock it, and advance its status.  A [`Sweeper`] runs alongside and times
//! out idle sessions, removing them one sweep after they finish.
//!
//! Locking is two-level: the store's lock guards only the token → session
//! map, and each session carries its own mutex for its fields.  See
//! [`store`] for the acquisition order.

pub mod clock;
pub mod expiry;
pub mod manager;
pub mod random;
pub mod session;
pub mod store;
pub mod sweeper;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use expiry::{ExpiryDecision, ExpiryPolicy};
pub use manager::SessionManager;
pub use random::RandomSource;
pub use session::{Session, SessionHandle};
pub use store::{MemorySessionStore, SessionStore, SweepReport};
pub use sweeper::Sweeper;
pub use token::{is_session_token, new_session_token};
