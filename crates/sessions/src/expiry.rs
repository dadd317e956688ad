//! Expiry policy: decides what the sweeper does with an idle session.
//!
//! An idle unfinished session is first moved to `Timeout` (which refreshes
//! `last_active`), so its result stays fetchable for one more lifetime.
//! Only a finished session that has been idle past its timeout is removed.

use chrono::{DateTime, Utc};

use cx_domain::protocol::Status;

use crate::session::Session;

/// What to do with a session whose timeout has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryDecision {
    /// Still running: transition to `Timeout`.
    TimeOut,
    /// Already finished: remove from the store.
    Remove,
}

#[derive(Debug, Clone, Copy)]
pub struct ExpiryPolicy {
    max_lifetime: chrono::Duration,
}

impl ExpiryPolicy {
    pub fn new(max_lifetime: chrono::Duration) -> Self {
        Self { max_lifetime }
    }

    /// The idle timeout for `session`.  A client timeout on the request
    /// overrides the default while the session is still initialized.
    ///
    /// `None` means the timeout is too large to represent: the session has
    /// no deadline.
    pub fn timeout_for(&self, session: &Session) -> Option<chrono::Duration> {
        let client_timeout = session.client_timeout();
        if session.status() == Status::Initialized && client_timeout != 0 {
            return i64::try_from(client_timeout)
                .ok()
                .and_then(chrono::Duration::try_seconds);
        }
        Some(self.max_lifetime)
    }

    /// Evaluate `session` at `now`.  Returns `None` while it is within its
    /// timeout.
    pub fn evaluate(&self, session: &Session, now: DateTime<Utc>) -> Option<ExpiryDecision> {
        let deadline = session
            .last_active()
            .checked_add_signed(self.timeout_for(session)?)?;
        if deadline >= now {
            return None;
        }
        if session.is_finished() {
            Some(ExpiryDecision::Remove)
        } else {
            Some(ExpiryDecision::TimeOut)
        }
    }
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self::new(chrono::Duration::minutes(5))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::clock::{Clock, ManualClock};
    use cx_domain::protocol::{Action, RequestorRequest, SessionRequest};

    fn session(clock: &Arc<ManualClock>, client_timeout: u64) -> Session {
        let rr = RequestorRequest::new(SessionRequest::new(
            Action::Issuing,
            serde_json::Value::Null,
        ))
        .with_client_timeout(client_timeout);
        Session::new("tok".into(), Action::Issuing, rr, clock.clone())
    }

    #[test]
    fn fresh_session_is_kept() {
        let clock = Arc::new(ManualClock::default());
        let s = session(&clock, 0);
        clock.advance(chrono::Duration::minutes(4));
        assert_eq!(ExpiryPolicy::default().evaluate(&s, clock.now()), None);
    }

    #[test]
    fn idle_session_times_out() {
        let clock = Arc::new(ManualClock::default());
        let s = session(&clock, 0);
        clock.advance(chrono::Duration::minutes(6));
        assert_eq!(
            ExpiryPolicy::default().evaluate(&s, clock.now()),
            Some(ExpiryDecision::TimeOut)
        );
    }

    #[test]
    fn idle_finished_session_is_removed() {
        let clock = Arc::new(ManualClock::default());
        let mut s = session(&clock, 0);
        s.set_status(Status::Done).unwrap();
        clock.advance(chrono::Duration::minutes(6));
        assert_eq!(
            ExpiryPolicy::default().evaluate(&s, clock.now()),
            Some(ExpiryDecision::Remove)
        );
    }

    #[test]
    fn client_timeout_overrides_while_initialized() {
        let clock = Arc::new(ManualClock::default());
        let s = session(&clock, 2);
        assert_eq!(
            ExpiryPolicy::default().timeout_for(&s),
            Some(chrono::Duration::seconds(2))
        );
        clock.advance(chrono::Duration::seconds(3));
        assert_eq!(
            ExpiryPolicy::default().evaluate(&s, clock.now()),
            Some(ExpiryDecision::TimeOut)
        );
    }

    #[test]
    fn client_timeout_ignored_once_connected() {
        let clock = Arc::new(ManualClock::default());
        let mut s = session(&clock, 2);
        s.set_status(Status::Connected).unwrap();
        assert_eq!(
            ExpiryPolicy::default().timeout_for(&s),
            Some(chrono::Duration::minutes(5))
        );
        clock.advance(chrono::Duration::seconds(3));
        assert_eq!(ExpiryPolicy::default().evaluate(&s, clock.now()), None);
    }

    #[test]
    fn oversized_client_timeout_means_no_deadline() {
        let clock = Arc::new(ManualClock::default());
        for client_timeout in [u64::MAX, 10u64.pow(16), i64::MAX as u64] {
            let s = session(&clock, client_timeout);
            assert_eq!(ExpiryPolicy::default().timeout_for(&s), None);
            assert_eq!(ExpiryPolicy::default().evaluate(&s, clock.now()), None);
        }
    }

    #[test]
    fn deadline_past_end_of_time_never_expires() {
        let clock = Arc::new(ManualClock::default());
        // Representable as a duration, but last_active + timeout overflows.
        let s = session(&clock, 9_000_000_000_000);
        assert!(ExpiryPolicy::default().timeout_for(&s).is_some());
        clock.advance(chrono::Duration::days(365));
        assert_eq!(ExpiryPolicy::default().evaluate(&s, clock.now()), None);
    }
}
