//! Periodic process list refresh.
//!
//! The poller drives [`ProcessRegistry`] on a fixed interval until it is told to
//! shut down. Each refresh runs on the blocking pool and is bounded by a timeout.
//! A refresh that times out keeps running; the next cycle waits for it first, so
//! at most one refresh is ever in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::error::{PollError, RefreshError};
use crate::process::{ProcessRegistry, ProcessSnapshot, ProcessSource, RefreshReport};

/// Registry shared between the poller and its readers.
pub type SharedProcessRegistry = Arc<RwLock<ProcessRegistry>>;

/// Called with the new process list after every successful refresh.
pub type ProcessListener = Box<dyn Fn(&[ProcessSnapshot]) + Send + Sync>;

/// Counters describing the poller's health.
#[derive(Debug, Default)]
pub struct PollerStats {
    pub refreshes_ok: AtomicU64,
    pub refreshes_failed: AtomicU64,
    pub timeouts: AtomicU64,
    pub skipped_processes: AtomicU64,
}

impl PollerStats {
    pub fn record_success(&self, report: &RefreshReport) {
        self.refreshes_ok.fetch_add(1, Ordering::Relaxed);
        self.skipped_processes
            .fetch_add(report.skipped.len() as u64, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.refreshes_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }
}

pub struct ProcessPoller {
    registry: SharedProcessRegistry,
    source: Arc<dyn ProcessSource>,
    interval: Duration,
    timeout: Duration,
    listener: Option<Arc<ProcessListener>>,
    stats: Arc<PollerStats>,
    in_flight: Option<JoinHandle<Result<RefreshReport, RefreshError>>>,
}

impl ProcessPoller {
    pub fn new(
        registry: SharedProcessRegistry,
        source: Arc<dyn ProcessSource>,
        interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            source,
            interval,
            timeout,
            listener: None,
            stats: Arc::new(PollerStats::default()),
            in_flight: None,
        }
    }

    pub fn with_listener(mut self, listener: ProcessListener) -> Self {
        self.listener = Some(Arc::new(listener));
        self
    }

    pub fn stats(&self) -> Arc<PollerStats> {
        Arc::clone(&self.stats)
    }

    /// Runs one refresh cycle.
    pub async fn refresh_once(&mut self) -> Result<RefreshReport, PollError> {
        if let Some(previous) = self.in_flight.take() {
            debug!("Waiting for the previous refresh to finish");
            // its outcome was already reported as a timeout
            let _ = previous.await;
        }

        let registry = Arc::clone(&self.registry);
        let source = Arc::clone(&self.source);
        let listener = self.listener.clone();

        let mut handle = tokio::task::spawn_blocking(move || -> Result<RefreshReport, RefreshError> {
            // readers keep the old list while the new one is built
            let (table, report) = {
                let current = registry.read().unwrap_or_else(PoisonError::into_inner);
                current.reconcile(source.as_ref())?
            };
            registry
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .install(table);

            if let Some(listener) = listener {
                let current = registry.read().unwrap_or_else(PoisonError::into_inner);
                (*listener)(current.processes());
            }
            Ok(report)
        });

        let result = match tokio::time::timeout(self.timeout, &mut handle).await {
            Ok(Ok(outcome)) => outcome.map_err(PollError::from),
            Ok(Err(join)) => Err(PollError::from(join)),
            Err(_) => {
                self.in_flight = Some(handle);
                self.stats.record_timeout();
                return Err(PollError::Timeout(self.timeout));
            }
        };

        match &result {
            Ok(report) => self.stats.record_success(report),
            Err(_) => self.stats.record_failure(),
        }
        result
    }

    /// Refreshes on every tick until `shutdown` turns true or its sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Process poller started (interval {:?}, timeout {:?})",
            self.interval, self.timeout
        );
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    match self.refresh_once().await {
                        Ok(report) => debug!("Refresh cycle finished: {} processes", report.total()),
                        Err(PollError::Timeout(t)) => warn!("Process list refresh exceeded {:?}, keeping previous list", t),
                        Err(e) => error!("Process list refresh failed: {}", e),
                    }
                }
            }
        }

        if let Some(pending) = self.in_flight.take() {
            let _ = pending.await;
        }
        info!("Process poller stopped");
    }
}
