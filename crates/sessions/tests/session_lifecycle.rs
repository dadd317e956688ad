//! End-to-end session lifecycle through the public API: start, protocol
//! steps, expiry, reclamation.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use cx_domain::params::system_parameters;
use cx_domain::protocol::{
    Action, ProofP, ProtocolVersion, RequestorRequest, SessionRequest, Status, VersionRange,
};
use cx_sessions::{
    Clock, ExpiryPolicy, ManualClock, MemorySessionStore, RandomSource, SessionManager,
    SessionStore,
};

struct Harness {
    clock: Arc<ManualClock>,
    manager: Arc<SessionManager>,
}

fn harness() -> Harness {
    let clock = Arc::new(ManualClock::default());
    let store = Arc::new(MemorySessionStore::new(clock.clone(), ExpiryPolicy::default()));
    let manager = SessionManager::new(
        store,
        clock.clone(),
        Arc::new(RandomSource::from_seed(2024)),
        *system_parameters(2048).unwrap(),
        VersionRange::new(ProtocolVersion::new(2, 4), ProtocolVersion::new(2, 4)),
    );
    Harness {
        clock,
        manager: Arc::new(manager),
    }
}

fn request(action: Action, client_timeout: u64) -> RequestorRequest {
    RequestorRequest::new(SessionRequest::new(action, serde_json::Value::Null))
        .with_client_timeout(client_timeout)
}

fn start(h: &Harness, action: Action, client_timeout: u64) -> String {
    let handle = h.manager.start(action, request(action, client_timeout));
    let token = handle.lock().token().to_owned();
    token
}

#[test]
fn full_disclosure_run() {
    let h = harness();
    let token = start(&h, Action::Disclosing, 0);

    // Client connects and negotiates.
    {
        let handle = h.manager.get(&token).unwrap();
        let mut session = handle.lock();
        h.manager
            .negotiate_version(&mut session, ProtocolVersion::new(2, 4), ProtocolVersion::new(2, 5))
            .unwrap();
        session.set_status(Status::Connected).unwrap();
    }

    // Keyshare proof arrives, then the disclosure completes.
    h.clock.advance(chrono::Duration::seconds(20));
    {
        let handle = h.manager.get(&token).unwrap();
        let mut session = handle.lock();
        session.add_proof(
            "pbdf".into(),
            ProofP {
                p: "5".into(),
                c: "6".into(),
                s_response: "7".into(),
            },
        );
        session.result_mut().disclosed = Some(serde_json::json!([["pbdf.pbdf.email.email"]]));
        session.set_status(Status::Done).unwrap();
        drop(session);
        h.manager.update(&handle);
    }

    let handle = h.manager.get(&token).unwrap();
    let result = handle.lock().take_result().unwrap();
    assert_eq!(result.status, Status::Done);
    assert!(result.disclosed.is_some());
    assert!(handle.lock().take_result().is_none());
}

#[test]
fn abandoned_session_times_out_then_disappears() {
    let h = harness();
    let sweeper = h.manager.sweeper(std::time::Duration::from_secs(10));
    let token = start(&h, Action::Issuing, 0);

    h.clock.advance(chrono::Duration::minutes(6));
    let report = sweeper.sweep_once();
    assert_eq!(report.timed_out, vec![token.clone()]);

    // The timeout result can still be fetched.
    let handle = h.manager.get(&token).unwrap();
    assert_eq!(handle.lock().status(), Status::Timeout);
    assert_eq!(handle.lock().result().status, Status::Timeout);
    drop(handle);

    // A sweep within the next lifetime keeps it.
    h.clock.advance(chrono::Duration::seconds(10));
    assert!(sweeper.sweep_once().is_empty());
    assert!(h.manager.get(&token).is_some());

    h.clock.advance(chrono::Duration::minutes(6));
    let report = sweeper.sweep_once();
    assert_eq!(report.removed, vec![token.clone()]);
    assert!(h.manager.get(&token).is_none());
}

#[test]
fn client_timeout_beats_default_lifetime() {
    let h = harness();
    let sweeper = h.manager.sweeper(std::time::Duration::from_secs(10));
    let short = start(&h, Action::Disclosing, 2);
    let normal = start(&h, Action::Disclosing, 0);

    h.clock.advance(chrono::Duration::seconds(3));
    let report = sweeper.sweep_once();
    assert_eq!(report.timed_out, vec![short.clone()]);
    assert_eq!(
        h.manager.get(&normal).unwrap().lock().status(),
        Status::Initialized
    );
}

#[test]
fn cancelled_session_is_never_timed_out() {
    let h = harness();
    let sweeper = h.manager.sweeper(std::time::Duration::from_secs(10));
    let token = start(&h, Action::Signing, 0);
    h.manager
        .get(&token)
        .unwrap()
        .lock()
        .set_status(Status::Cancelled)
        .unwrap();

    h.clock.advance(chrono::Duration::minutes(6));
    let report = sweeper.sweep_once();
    assert!(report.timed_out.is_empty());
    assert_eq!(report.removed, vec![token]);
}

#[test]
fn tokens_are_unique_across_many_sessions() {
    let h = harness();
    let tokens: HashSet<String> = (0..5_000)
        .map(|_| start(&h, Action::Disclosing, 0))
        .collect();
    assert_eq!(tokens.len(), 5_000);
    assert_eq!(h.manager.store().len(), 5_000);
}

#[test]
fn parallel_protocol_steps_and_sweeps() {
    let h = harness();
    let mut workers = Vec::new();
    for _ in 0..8 {
        let manager = h.manager.clone();
        workers.push(thread::spawn(move || {
            let mut tokens = Vec::new();
            for _ in 0..200 {
                let handle = manager.start(Action::Issuing, request(Action::Issuing, 0));
                let token = handle.lock().token().to_owned();
                let fetched = manager.get(&token).unwrap();
                fetched.lock().set_status(Status::Connected).unwrap();
                tokens.push(token);
            }
            tokens
        }));
    }
    let sweeper = h.manager.sweeper(std::time::Duration::from_secs(10));
    for _ in 0..50 {
        sweeper.sweep_once();
    }

    let tokens: Vec<String> = workers
        .into_iter()
        .flat_map(|w| w.join().unwrap())
        .collect();
    assert_eq!(tokens.len(), 1_600);
    for token in &tokens {
        let handle = h.manager.get(token).unwrap();
        assert_eq!(handle.lock().status(), Status::Connected);
        assert_eq!(handle.lock().last_active(), h.clock.now());
    }
}
