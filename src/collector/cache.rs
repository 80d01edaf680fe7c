//! Time-to-live store for the latest scrape results.

use crate::core::domain::model::{
    device::Device, device_interface::DeviceInterface, device_system_status::DeviceSystemStatus,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

const DEVICES_KEY: &str = "devices";

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// A string-keyed map whose entries expire `ttl` after they were written.
///
/// Expired entries read as absent straight away; they are only removed from
/// memory by [`TtlCache::purge_expired`], which the sweeper calls.
pub struct TtlCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stores `value`, replacing whatever was there and restarting its TTL.
    pub async fn set(&self, key: impl Into<String>, value: V) {
        let entry = Entry {
            value,
            inserted_at: Instant::now(),
        };
        self.entries.write().await.insert(key.into(), entry);
    }

    /// Returns the value if present and not expired.
    pub async fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.inserted_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    /// Drops expired entries and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.inserted_at.elapsed() < self.ttl);
        before - entries.len()
    }

    /// Number of stored entries, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// One cached scrape result.
#[derive(Debug, Clone)]
enum Snapshot {
    Devices(Arc<BTreeMap<String, Device>>),
    Interfaces(Arc<Vec<DeviceInterface>>),
    SystemStatus(Arc<DeviceSystemStatus>),
}

/// Typed view over the scrape cache.
///
/// Keys are `devices`, `interfaces:<deviceId>` and `systemStatus:<deviceId>`.
/// Clones share the same store.
#[derive(Clone)]
pub struct SnapshotCache {
    inner: Arc<TtlCache<Snapshot>>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(TtlCache::new(ttl)),
        }
    }

    pub async fn set_devices(&self, devices: BTreeMap<String, Device>) {
        self.inner
            .set(DEVICES_KEY, Snapshot::Devices(Arc::new(devices)))
            .await;
    }

    /// Devices of the last successful list fetch, keyed by device id.
    pub async fn devices(&self) -> Option<Arc<BTreeMap<String, Device>>> {
        match self.inner.get(DEVICES_KEY).await {
            Some(Snapshot::Devices(devices)) => Some(devices),
            _ => None,
        }
    }

    pub async fn set_interfaces(&self, device_id: &str, interfaces: Vec<DeviceInterface>) {
        self.inner
            .set(
                interfaces_key(device_id),
                Snapshot::Interfaces(Arc::new(interfaces)),
            )
            .await;
    }

    pub async fn interfaces(&self, device_id: &str) -> Option<Arc<Vec<DeviceInterface>>> {
        match self.inner.get(&interfaces_key(device_id)).await {
            Some(Snapshot::Interfaces(interfaces)) => Some(interfaces),
            _ => None,
        }
    }

    pub async fn set_system_status(&self, device_id: &str, status: DeviceSystemStatus) {
        self.inner
            .set(
                system_status_key(device_id),
                Snapshot::SystemStatus(Arc::new(status)),
            )
            .await;
    }

    pub async fn system_status(&self, device_id: &str) -> Option<Arc<DeviceSystemStatus>> {
        match self.inner.get(&system_status_key(device_id)).await {
            Some(Snapshot::SystemStatus(status)) => Some(status),
            _ => None,
        }
    }

    pub async fn purge_expired(&self) -> usize {
        self.inner.purge_expired().await
    }

    /// Spawns a task that purges expired entries every `every`.
    ///
    /// The first sweep happens one full period after the call.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
            loop {
                ticker.tick().await;
                let removed = cache.purge_expired().await;
                debug!(removed, "Swept expired cache entries");
            }
        })
    }
}

impl std::fmt::Debug for SnapshotCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotCache")
            .field("ttl", &self.inner.ttl())
            .finish_non_exhaustive()
    }
}

fn interfaces_key(device_id: &str) -> String {
    format!("interfaces:{device_id}")
}

fn system_status_key(device_id: &str) -> String {
    format!("systemStatus:{device_id}")
}
