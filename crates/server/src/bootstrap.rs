//! Process wiring: build the session manager from config and spawn the
//! background loops that keep it healthy.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use cx_domain::config::{Config, ConfigSeverity};
use cx_sessions::SessionManager;

/// Handles for the background tasks, awaited on shutdown.
pub struct BackgroundTasks {
    pub sweeper: JoinHandle<u64>,
    pub stats: JoinHandle<()>,
}

/// Build the session manager described by `config`.  Fails when config
/// validation reports any error.
pub fn build_session_manager(config: &Config) -> anyhow::Result<Arc<SessionManager>> {
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let error_count = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if error_count > 0 {
        anyhow::bail!("config validation failed with {error_count} error(s)");
    }

    let manager = SessionManager::from_config(&config.sessions, &config.crypto)
        .map_err(|e| anyhow::anyhow!("building session manager: {e}"))?;

    let versions = manager.versions();
    tracing::info!(
        min_version = %versions.min,
        max_version = %versions.max,
        key_size = manager.system_parameters().key_size,
        lifetime_secs = config.sessions.max_session_lifetime_secs,
        "session manager ready"
    );

    Ok(Arc::new(manager))
}

/// Spawn the expiry sweeper and a periodic session-count log.  Both stop
/// when `shutdown` is cancelled.
pub fn spawn_background_tasks(
    manager: &SessionManager,
    config: &Config,
    shutdown: CancellationToken,
) -> BackgroundTasks {
    let sweeper = manager
        .sweeper(config.sessions.expiry_interval())
        .spawn(shutdown.clone());

    // ── Periodic session count ───────────────────────────────────────
    let stats = {
        let store = manager.store().clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = interval.tick() => {
                        tracing::debug!(sessions = store.len(), "session registry size");
                    }
                }
            }
        })
    };

    tracing::info!("background tasks spawned");
    BackgroundTasks { sweeper, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cx_domain::protocol::{Action, RequestorRequest, SessionRequest};

    #[test]
    fn builds_from_default_config() {
        let manager = build_session_manager(&Config::default()).unwrap();
        assert_eq!(manager.system_parameters().key_size, 2048);
        assert!(manager.store().is_empty());
    }

    #[test]
    fn unknown_key_size_fails() {
        let mut config = Config::default();
        config.crypto.key_size = 1536;
        assert!(build_session_manager(&config).is_err());
    }

    #[test]
    fn zero_sweep_interval_fails() {
        let mut config = Config::default();
        config.sessions.expiry_interval_secs = 0;
        let err = build_session_manager(&config).err().unwrap();
        assert!(err.to_string().contains("1 error(s)"));
    }

    #[test]
    fn oversized_lifetime_fails() {
        let mut config = Config::default();
        config.sessions.max_session_lifetime_secs = u64::MAX;
        assert!(build_session_manager(&config).is_err());
    }

    #[test]
    fn warnings_do_not_block_startup() {
        let mut config = Config::default();
        config.sessions.max_session_lifetime_secs = 5;
        assert!(build_session_manager(&config).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn background_tasks_stop_on_shutdown() {
        let config = Config::default();
        let manager = build_session_manager(&config).unwrap();
        manager.start(
            Action::Disclosing,
            RequestorRequest::new(SessionRequest::new(Action::Disclosing, Default::default())),
        );

        let shutdown = CancellationToken::new();
        let tasks = spawn_background_tasks(&manager, &config, shutdown.clone());

        // The first sweep is immediate; the next one is due at t=10s.
        tokio::time::sleep(Duration::from_secs(5)).await;
        shutdown.cancel();

        let passes = tasks.sweeper.await.unwrap();
        tasks.stats.await.unwrap();
        assert_eq!(passes, 1);
        assert_eq!(manager.store().len(), 1);
    }
}
