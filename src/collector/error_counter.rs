use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide count of failed fetches.
///
/// Only ever increases. Clones share the same count; it backs both the
/// health check and the `vmanage_exporter_scrape_errors` metric.
#[derive(Debug, Clone, Default)]
pub struct ErrorCounter(Arc<AtomicU64>);

impl ErrorCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}
