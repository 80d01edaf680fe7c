//! One scrape cycle: refresh the device list, then fan the per-device
//! fetches out over a fixed pool of workers.

use crate::{
    Cancellation, VmanageResult,
    collector::{cache::SnapshotCache, error_counter::ErrorCounter, source::DeviceSource},
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Outcome of a completed scrape cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrapeReport {
    /// Devices in the refreshed list.
    pub devices: usize,
    /// Devices whose fetches were attempted.
    pub refreshed: usize,
    /// Devices skipped because the cycle was cancelled first.
    pub skipped: usize,
    /// Per-device fetches that failed and were counted as errors.
    pub failures: usize,
    pub duration: Duration,
}

#[derive(Debug, Default)]
struct WorkerTally {
    refreshed: usize,
    skipped: usize,
    failures: usize,
}

/// Runs scrape cycles against a [`DeviceSource`], writing into a
/// [`SnapshotCache`].
///
/// Cycles are independent; several may run on the same orchestrator at once.
pub struct ScrapeOrchestrator<S> {
    source: Arc<S>,
    cache: SnapshotCache,
    errors: ErrorCounter,
    workers: usize,
}

impl<S: DeviceSource> ScrapeOrchestrator<S> {
    pub fn new(source: Arc<S>, cache: SnapshotCache, errors: ErrorCounter, workers: usize) -> Self {
        Self {
            source,
            cache,
            errors,
            workers: workers.max(1),
        }
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    pub fn errors(&self) -> &ErrorCounter {
        &self.errors
    }

    /// Runs one cycle to completion.
    ///
    /// Per-device failures are logged and counted but never abort the cycle.
    /// Once `cancel` fires, devices not yet started are skipped without
    /// counting an error.
    ///
    /// # Errors
    /// Returns the device-list error if the list could not be fetched. The
    /// error counter is incremented and the cache is left untouched.
    pub async fn run(&self, cancel: &Cancellation) -> VmanageResult<ScrapeReport> {
        let start = Instant::now();
        info!("Refreshing device list");

        let devices = match self.source.devices(cancel).await {
            Ok(devices) => devices,
            Err(e) => {
                error!(error = %e, "Error fetching device list");
                self.errors.inc();
                return Err(e);
            }
        };

        let devices: BTreeMap<String, _> = devices
            .into_iter()
            .map(|device| (device.device_id.clone(), device))
            .collect();
        let count = devices.len();
        info!(count, "Refreshed device list");

        let (queue, receiver) = mpsc::channel(count.max(1));
        for device_id in devices.keys() {
            // Sized to the device count, so this never finds the queue full.
            if queue.try_send(device_id.clone()).is_err() {
                warn!(device_id = %device_id, "Scrape queue rejected device");
            }
        }
        drop(queue);

        // Published before the fan-out so readers see the new device set
        // while per-device work is still running.
        self.cache.set_devices(devices).await;

        let receiver = Arc::new(Mutex::new(receiver));
        let mut workers = JoinSet::new();
        for _ in 0..self.workers.min(count) {
            workers.spawn(drain_queue(
                Arc::clone(&self.source),
                self.cache.clone(),
                self.errors.clone(),
                Arc::clone(&receiver),
                cancel.clone(),
            ));
        }

        let mut report = ScrapeReport {
            devices: count,
            ..Default::default()
        };
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(tally) => {
                    report.refreshed += tally.refreshed;
                    report.skipped += tally.skipped;
                    report.failures += tally.failures;
                }
                Err(e) => error!(error = %e, "Scrape worker terminated abnormally"),
            }
        }

        report.duration = start.elapsed();
        if report.skipped > 0 {
            warn!(
                skipped = report.skipped,
                "Scrape deadline reached before all devices were refreshed"
            );
        }
        info!(
            duration = ?report.duration,
            devices = report.devices,
            failures = report.failures,
            "Refresh done"
        );
        Ok(report)
    }
}

async fn drain_queue<S: DeviceSource>(
    source: Arc<S>,
    cache: SnapshotCache,
    errors: ErrorCounter,
    receiver: Arc<Mutex<mpsc::Receiver<String>>>,
    cancel: Cancellation,
) -> WorkerTally {
    let mut tally = WorkerTally::default();
    loop {
        let next = receiver.lock().await.recv().await;
        let Some(device_id) = next else {
            break;
        };

        if cancel.is_cancelled() {
            warn!(device_id = %device_id, "Timed out, skipping device refresh");
            tally.skipped += 1;
            continue;
        }

        tally.refreshed += 1;
        tally.failures += refresh_device(source.as_ref(), &cache, &errors, &device_id, &cancel).await;
    }
    tally
}

/// Fetches interfaces, then system status, for one device.
///
/// Returns the number of failed fetches.
async fn refresh_device<S: DeviceSource>(
    source: &S,
    cache: &SnapshotCache,
    errors: &ErrorCounter,
    device_id: &str,
    cancel: &Cancellation,
) -> usize {
    let mut failures = 0;

    debug!(device_id, "Refreshing interface statistics");
    match source.interfaces(device_id, cancel).await {
        Ok(interfaces) => cache.set_interfaces(device_id, interfaces).await,
        Err(e) if e.is_cancelled() => {
            warn!(device_id, "Timed out refreshing interface statistics");
        }
        Err(e) => {
            warn!(device_id, error = %e, "Error fetching interface statistics");
            errors.inc();
            failures += 1;
        }
    }

    debug!(device_id, "Refreshing system statistics");
    match source.system_status(device_id, cancel).await {
        Ok(mut records) if records.len() == 1 => {
            let status = records.swap_remove(0);
            cache.set_system_status(device_id, status).await;
        }
        Ok(records) => {
            warn!(
                device_id,
                count = records.len(),
                "Error fetching system statistics: expected a single entry"
            );
            errors.inc();
            failures += 1;
        }
        Err(e) if e.is_cancelled() => {
            warn!(device_id, "Timed out refreshing system statistics");
        }
        Err(e) => {
            warn!(device_id, error = %e, "Error fetching system statistics");
            errors.inc();
            failures += 1;
        }
    }

    failures
}
