//! Background task that periodically syncs every cached tenant.
//!
//! Errors are logged and never stop the loop or evict a tenant. The worker
//! stops when [`AutoSyncWorker::shutdown`] is called or the worker is dropped;
//! a tick already in progress runs to completion first.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::manager::TenantManager;

/// Shortest interval the worker will tick at; matches config validation.
pub const MIN_SYNC_INTERVAL: Duration = Duration::from_secs(1);

pub struct AutoSyncWorker {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl AutoSyncWorker {
    /// Start the loop on the current tokio runtime.
    ///
    /// The first sync happens one `interval` after spawning. Each tick runs
    /// on the blocking pool since syncing does disk and network I/O. A zero
    /// `interval` is raised to [`MIN_SYNC_INTERVAL`].
    pub fn spawn(manager: Arc<TenantManager>, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            warn!("zero auto-sync interval, using {:?}", MIN_SYNC_INTERVAL);
            MIN_SYNC_INTERVAL
        } else {
            interval
        };
        let (stop, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(
            async move {
                info!(interval_secs = interval.as_secs_f64(), "starting auto-sync worker");
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                ticker.tick().await;

                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            let manager = Arc::clone(&manager);
                            match tokio::task::spawn_blocking(move || manager.sync_all()).await {
                                Ok(summary) => debug!(
                                    synced = summary.synced,
                                    skipped = summary.skipped,
                                    failed = summary.failed.len(),
                                    "auto-sync tick complete"
                                ),
                                Err(err) => error!("auto-sync tick aborted: {err}"),
                            }
                        }
                        changed = stop_rx.changed() => {
                            if changed.is_err() || *stop_rx.borrow() {
                                break;
                            }
                        }
                    }
                }
                info!("auto-sync worker stopped");
            }
            .instrument(info_span!("auto_sync")),
        );

        Self { stop, task }
    }

    /// Signal the loop to stop and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        if let Err(err) = self.task.await {
            error!("auto-sync worker ended abnormally: {err}");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
