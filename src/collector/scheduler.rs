//! Periodic launch of scrape cycles.

use crate::{
    Cancellation,
    collector::{scrape::ScrapeOrchestrator, source::DeviceSource},
    config::CollectorConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Fires a scrape cycle immediately, then once per scrape interval.
///
/// Each cycle runs in its own task with a deadline of one interval. By
/// default a tick launches a cycle even if the previous one is still
/// running; with `skip_overlapping` such a tick is skipped instead.
pub struct Scheduler<S> {
    orchestrator: Arc<ScrapeOrchestrator<S>>,
    interval: Duration,
    skip_overlapping: bool,
    in_flight: Arc<Mutex<()>>,
}

impl<S: DeviceSource> Scheduler<S> {
    pub fn new(orchestrator: Arc<ScrapeOrchestrator<S>>, config: &CollectorConfig) -> Self {
        Self {
            orchestrator,
            interval: config.scrape_interval,
            skip_overlapping: config.skip_overlapping,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    /// Runs the schedule on a background task until `shutdown` fires.
    pub fn spawn(self, shutdown: Cancellation) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Runs the schedule until `shutdown` fires.
    ///
    /// Cycles already launched keep running to their own deadline.
    pub async fn run(self, shutdown: Cancellation) {
        info!(interval = ?self.interval, "Starting scrape schedule");
        let mut ticker = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.fire();
                }
            }
        }
        debug!("Scrape schedule stopped");
    }

    /// Launches one cycle, unless overlap is disallowed and one is running.
    pub fn fire(&self) -> Option<JoinHandle<()>> {
        let guard = if self.skip_overlapping {
            match Arc::clone(&self.in_flight).try_lock_owned() {
                Ok(guard) => Some(guard),
                Err(_) => {
                    warn!("Previous scrape cycle still running, skipping tick");
                    return None;
                }
            }
        } else {
            None
        };

        let orchestrator = Arc::clone(&self.orchestrator);
        let deadline = Cancellation::with_timeout(self.interval);
        Some(tokio::spawn(async move {
            // The list failure is already logged and counted.
            if let Err(e) = orchestrator.run(&deadline).await {
                debug!(error = %e, "Scrape cycle ended without a device list");
            }
            drop(guard);
        }))
    }
}
