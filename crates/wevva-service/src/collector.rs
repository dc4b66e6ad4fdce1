//! Background refresh scheduler.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tracing::{debug, error, info, warn};

use wevva_store::Store;

use crate::error::Result;
use crate::pipeline::{CycleSummary, run_cycle};
use crate::source::DataSource;

/// Failures logged at `warn` before the collector goes quiet.
const LOUD_FAILURES: u32 = 3;

/// Runs a refresh cycle immediately and then once per interval.
///
/// The store mutex is held for a whole cycle, so cycles never overlap even
/// when [`run_once`](Self::run_once) is called alongside the schedule.
pub struct Collector<S> {
    store: Arc<Mutex<Store>>,
    source: S,
    interval: Duration,
}

impl<S: DataSource> Collector<S> {
    /// Create a new collector.
    pub fn new(store: Arc<Mutex<Store>>, source: S, interval: Duration) -> Self {
        Self {
            store,
            source,
            interval,
        }
    }

    /// The data source this collector polls.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run a single refresh cycle.
    pub async fn run_once(&self) -> Result<CycleSummary> {
        let store = self.store.lock().await;
        run_cycle(&self.source, &store).await
    }

    /// Run cycles forever.
    pub async fn run(&self) {
        let (_keep_alive, shutdown) = watch::channel(false);
        self.run_until(shutdown).await;
    }

    /// Run cycles until `shutdown` turns `true` or its sender is dropped.
    ///
    /// A failed cycle is logged and the schedule carries on.
    pub async fn run_until(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Starting collector for {} (interval: {}s)",
            self.source.name(),
            self.interval.as_secs()
        );

        let mut timer = interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut failures = FailureTracker::default();
        let mut cycle = 0u64;

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    cycle += 1;
                    match self.run_once().await {
                        Ok(summary) => {
                            failures.record_success(cycle);
                            debug!("Cycle {} complete: {}", cycle, summary);
                        }
                        Err(e) => {
                            failures.record_failure(cycle, &e);
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Collector stopping after {} cycles", cycle);
                        break;
                    }
                }
            }
        }
    }
}

impl<S: DataSource + 'static> Collector<S> {
    /// Start the schedule on a background task.
    pub fn spawn(self) -> CollectorHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(async move { self.run_until(stop_rx).await });
        CollectorHandle { stop_tx, task }
    }
}

/// A collector running on a background task.
pub struct CollectorHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl CollectorHandle {
    /// Signal the collector to stop and wait up to `grace` for it.
    ///
    /// A cycle still running when `grace` expires is aborted, which releases
    /// the store and kills a spawned data source process. Returns `true` when
    /// the collector stopped on its own.
    pub async fn shutdown(mut self, grace: Duration) -> bool {
        let _ = self.stop_tx.send(true);

        match timeout(grace, &mut self.task).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!("Collector task ended abnormally: {}", e);
                true
            }
            Err(_) => {
                warn!(
                    "Collector did not stop within {}s, aborting the running cycle",
                    grace.as_secs()
                );
                self.task.abort();
                // Wait for the aborted future to be dropped.
                let _ = (&mut self.task).await;
                false
            }
        }
    }
}

/// Counts consecutive failures to keep a dead source from flooding the log.
#[derive(Debug, Default)]
struct FailureTracker {
    consecutive: u32,
}

impl FailureTracker {
    fn record_success(&mut self, cycle: u64) {
        if self.consecutive > LOUD_FAILURES {
            info!(
                "Cycle {} succeeded after {} failures",
                cycle, self.consecutive
            );
        }
        self.consecutive = 0;
    }

    /// Log the failure and return whether anything was logged.
    fn record_failure(&mut self, cycle: u64, err: &dyn std::fmt::Display) -> bool {
        self.consecutive += 1;
        if self.consecutive <= LOUD_FAILURES {
            warn!(
                "Cycle {} failed: {} (attempt {})",
                cycle, err, self.consecutive
            );
            true
        } else if self.consecutive == LOUD_FAILURES + 1 {
            error!(
                "Cycle {} failed after {} attempts, will continue trying silently: {}",
                cycle, self.consecutive, err
            );
            true
        } else {
            false
        }
    }
}
