//! Expiry sweeper: periodic background pass over the session store.
//!
//! Runs [`SessionStore::delete_expired`] on a fixed interval until its
//! cancellation token fires.  A single pass can also be triggered directly
//! with [`Sweeper::sweep_once`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use cx_domain::trace::TraceEvent;

use crate::store::{SessionStore, SweepReport};

/// Default time between sweeps.
pub const DEFAULT_EXPIRY_INTERVAL: Duration = Duration::from_secs(10);

pub struct Sweeper {
    store: Arc<dyn SessionStore>,
    interval: Duration,
}

impl Sweeper {
    /// A zero `interval` falls back to [`DEFAULT_EXPIRY_INTERVAL`].
    pub fn new(store: Arc<dyn SessionStore>, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            tracing::warn!("zero expiry interval, using the default");
            DEFAULT_EXPIRY_INTERVAL
        } else {
            interval
        };
        Self { store, interval }
    }

    /// Run one expiry pass.
    pub fn sweep_once(&self) -> SweepReport {
        let started = Instant::now();
        let report = self.store.delete_expired();

        if !report.is_empty() {
            TraceEvent::SweepCompleted {
                scanned: report.scanned,
                timed_out: report.timed_out.len(),
                removed: report.removed.len(),
                duration_ms: started.elapsed().as_millis() as u64,
            }
            .emit();
        } else {
            tracing::trace!(scanned = report.scanned, "expiry sweep: nothing to do");
        }

        report
    }

    /// Sweep every `interval` until `shutdown` is cancelled.  The first pass
    /// runs immediately.  Returns the number of passes made.
    pub async fn run(self, shutdown: CancellationToken) -> u64 {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut passes = 0u64;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    let pass = panic::catch_unwind(AssertUnwindSafe(|| self.sweep_once()));
                    if pass.is_err() {
                        tracing::error!("expiry sweep panicked, retrying next interval");
                    }
                    passes += 1;
                }
            }
        }

        tracing::debug!(passes, "expiry sweeper stopped");
        passes
    }

    /// Spawn [`Sweeper::run`] on the current tokio runtime.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<u64> {
        tracing::info!(
            interval_secs = self.interval.as_secs_f64(),
            "expiry sweeper started"
        );
        tokio::spawn(self.run(shutdown))
    }
}
