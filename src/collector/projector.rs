//! Read-side transform from the snapshot cache to flat metric samples.

use crate::{
    collector::{cache::SnapshotCache, error_counter::ErrorCounter},
    core::domain::model::{device::Device, device_interface::DeviceInterface},
};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

/// A metric family: name, help text and kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Family {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
}

const fn gauge(name: &'static str, help: &'static str) -> Family {
    Family {
        name,
        help,
        kind: MetricKind::Gauge,
    }
}

const fn counter(name: &'static str, help: &'static str) -> Family {
    Family {
        name,
        help,
        kind: MetricKind::Counter,
    }
}

pub const SCRAPE_ERRORS: Family = gauge("vmanage_exporter_scrape_errors", "Number of scrape errors");
pub const DEVICES: Family = gauge("vmanage_devices", "Number of devices managed by vmanage");
pub const DEVICE_INFO: Family = gauge("vmanage_device_info", "Info about device");
pub const DEVICE_STATUS: Family = gauge("vmanage_device_status", "Status of device");
pub const DEVICE_REACHABILITY: Family =
    gauge("vmanage_device_reachability", "Reachability of device");
pub const DEVICE_UPTIME: Family = counter("vmanage_device_uptime", "Uptime of device");

pub const MEM_USED: Family = gauge("vmanage_device_mem_used", "Memory Used");
pub const MEM_FREE: Family = gauge("vmanage_device_mem_free", "Memory Free");
pub const MEM_TOTAL: Family = gauge("vmanage_device_mem_total", "Memory Total");
pub const MEM_BUFFERS: Family = gauge("vmanage_device_mem_buffers", "Memory Buffers");
pub const MEM_CACHED: Family = gauge("vmanage_device_mem_cached", "Memory Cached");
pub const CPU_USER: Family = gauge("vmanage_device_cpu_user_percentage", "CPU User(%)");
pub const CPU_SYSTEM: Family = gauge("vmanage_device_cpu_system_percentage", "CPU System(%)");
pub const CPU_IDLE: Family = gauge("vmanage_device_cpu_idle_percentage", "CPU Idle(%)");
pub const LOAD_AVG_1: Family = gauge("vmanage_device_load_avg1", "Load Average 1 min");
pub const LOAD_AVG_5: Family = gauge("vmanage_device_load_avg5", "Load Average 5 min");
pub const LOAD_AVG_15: Family = gauge("vmanage_device_load_avg15", "Load Average 15 min");

pub const IF_TX_OCTETS: Family = counter("vmanage_device_interface_tx_octets", "Interface TX Octets");
pub const IF_RX_OCTETS: Family = counter("vmanage_device_interface_rx_octets", "Interface RX Octets");
pub const IF_TX_PACKETS: Family = counter(
    "vmanage_device_interface_tx_packets",
    "Interface TX Unicast Packets",
);
pub const IF_RX_PACKETS: Family = counter(
    "vmanage_device_interface_rx_packets",
    "Interface RX Unicast Packets",
);
pub const IF_TX_ERRORS: Family = counter("vmanage_device_interface_tx_errors", "Interface Tx Errors");
pub const IF_RX_ERRORS: Family = counter("vmanage_device_interface_rx_errors", "Interface Rx Errors");
pub const IF_TX_DROPS: Family = counter("vmanage_device_interface_tx_drops", "Interface Tx Drops");
pub const IF_RX_DROPS: Family = counter("vmanage_device_interface_rx_drops", "Interface Rx Drops");
pub const IF_ADMIN_UP: Family = gauge(
    "vmanage_device_interface_admin_up",
    "Interface administratively up",
);
pub const IF_OPER_UP: Family = gauge(
    "vmanage_device_interface_oper_up",
    "Interface operationally up",
);

pub type Labels = Vec<(&'static str, String)>;

/// One projected fact.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub family: Family,
    pub labels: Labels,
    pub value: f64,
}

impl MetricSample {
    pub fn name(&self) -> &'static str {
        self.family.name
    }

    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Builds metric samples from whatever the cache currently holds.
///
/// Projection never fails: a device without a cached interface list or
/// system status simply has no samples for that family.
#[derive(Debug, Clone)]
pub struct MetricsProjector {
    cache: SnapshotCache,
    errors: ErrorCounter,
}

impl MetricsProjector {
    pub fn new(cache: SnapshotCache, errors: ErrorCounter) -> Self {
        Self { cache, errors }
    }

    pub async fn project(&self) -> Vec<MetricSample> {
        self.project_at(now_ms()).await
    }

    /// Projects with `now_ms` as the reference time for uptime.
    pub async fn project_at(&self, now_ms: i64) -> Vec<MetricSample> {
        let mut out = Vec::new();
        push(&mut out, SCRAPE_ERRORS, Vec::new(), self.errors.get() as f64);

        let devices = self.cache.devices().await;
        let device_count = devices.as_ref().map_or(0, |d| d.len());
        push(&mut out, DEVICES, Vec::new(), device_count as f64);

        let Some(devices) = devices else {
            return out;
        };

        for device in devices.values() {
            self.project_device(&mut out, device, now_ms).await;
        }
        out
    }

    async fn project_device(&self, out: &mut Vec<MetricSample>, device: &Device, now_ms: i64) {
        let status_value = bool_value(device.is_normal());

        push(out, DEVICE_INFO, info_labels(device), status_value);
        push(
            out,
            DEVICE_STATUS,
            with_label(identity_labels(device), "status", &device.status),
            status_value,
        );
        push(
            out,
            DEVICE_REACHABILITY,
            with_label(identity_labels(device), "reachability", &device.reachability),
            bool_value(device.is_reachable()),
        );
        if let Some(uptime) = device.uptime_ms(now_ms) {
            push(out, DEVICE_UPTIME, identity_labels(device), uptime as f64);
        }

        if let Some(status) = self.cache.system_status(&device.device_id).await {
            let memory = status.memory();
            let cpu = status.cpu();
            for (family, value) in [
                (MEM_USED, memory.used),
                (MEM_FREE, memory.free),
                (MEM_TOTAL, memory.total),
                (MEM_BUFFERS, memory.buffers),
                (MEM_CACHED, memory.cached),
                (CPU_USER, cpu.user_percentage),
                (CPU_SYSTEM, cpu.system_percentage),
                (CPU_IDLE, cpu.idle_percentage),
                (LOAD_AVG_1, cpu.load_avg_1),
                (LOAD_AVG_5, cpu.load_avg_5),
                (LOAD_AVG_15, cpu.load_avg_15),
            ] {
                push(out, family, identity_labels(device), value);
            }
        }

        if let Some(interfaces) = self.cache.interfaces(&device.device_id).await {
            for interface in interfaces.iter() {
                project_interface(out, device, interface);
            }
        }
    }
}

fn project_interface(out: &mut Vec<MetricSample>, device: &Device, interface: &DeviceInterface) {
    let labels = interface_labels(device, interface);
    for (family, value) in [
        (IF_TX_OCTETS, interface.tx_octets as f64),
        (IF_RX_OCTETS, interface.rx_octets as f64),
        (IF_TX_PACKETS, interface.tx_packets as f64),
        (IF_RX_PACKETS, interface.rx_packets as f64),
        (IF_TX_ERRORS, interface.tx_errors as f64),
        (IF_RX_ERRORS, interface.rx_errors as f64),
        (IF_TX_DROPS, interface.tx_drops as f64),
        (IF_RX_DROPS, interface.rx_drops as f64),
        (IF_ADMIN_UP, bool_value(interface.is_admin_up())),
        (IF_OPER_UP, bool_value(interface.is_oper_up())),
    ] {
        push(out, family, labels.clone(), value);
    }
}

fn push(out: &mut Vec<MetricSample>, family: Family, labels: Labels, value: f64) {
    let value = match family.kind {
        MetricKind::Counter => value.max(0.0),
        MetricKind::Gauge => value,
    };
    out.push(MetricSample {
        family,
        labels,
        value,
    });
}

fn identity_labels(device: &Device) -> Labels {
    vec![
        ("DeviceID", device.device_id.clone()),
        ("Hostname", device.hostname.clone()),
    ]
}

fn info_labels(device: &Device) -> Labels {
    vec![
        ("DeviceID", device.device_id.clone()),
        ("SystemIP", device.system_ip.clone()),
        ("Hostname", device.hostname.clone()),
        ("DeviceModel", device.device_model.clone()),
        ("Version", device.version.clone()),
        ("DeviceOS", device.device_os.clone()),
    ]
}

fn interface_labels(device: &Device, interface: &DeviceInterface) -> Labels {
    vec![
        ("DeviceID", device.device_id.clone()),
        ("VdeviceName", interface.vdevice_name.clone()),
        ("Ifname", interface.ifname.clone()),
        ("IfIndex", interface.ifindex.to_string()),
        ("AfType", interface.af_type.clone()),
        ("VdeviceDataKey", interface.vdevice_data_key.clone()),
    ]
}

fn with_label(mut labels: Labels, name: &'static str, value: &str) -> Labels {
    labels.push((name, value.to_string()));
    labels
}

fn bool_value(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::model::device_system_status::DeviceSystemStatus;
    use std::collections::BTreeMap;
    use std::time::Duration;

    const NOW_MS: i64 = 1_700_000_360_000;

    fn device(value: serde_json::Value) -> Device {
        serde_json::from_value(value).unwrap()
    }

    fn edge_a() -> Device {
        device(serde_json::json!({
            "deviceId": "10.0.0.1",
            "system-ip": "10.0.0.1",
            "host-name": "edge-a",
            "status": "normal",
            "reachability": "reachable",
            "device-model": "vedge-C8000V",
            "version": "17.9.3a",
            "device-os": "ios-xe",
            "uptime-date": 1_700_000_000_000_i64
        }))
    }

    fn edge_b() -> Device {
        device(serde_json::json!({
            "deviceId": "10.0.0.2",
            "host-name": "edge-b",
            "status": "degraded",
            "reachability": "unreachable"
        }))
    }

    async fn projector_with(devices: Vec<Device>) -> (MetricsProjector, SnapshotCache) {
        let cache = SnapshotCache::new(Duration::from_secs(75));
        let map: BTreeMap<String, Device> = devices
            .into_iter()
            .map(|d| (d.device_id.clone(), d))
            .collect();
        cache.set_devices(map).await;
        (
            MetricsProjector::new(cache.clone(), ErrorCounter::new()),
            cache,
        )
    }

    fn find<'a>(samples: &'a [MetricSample], name: &str, device_id: &str) -> Vec<&'a MetricSample> {
        samples
            .iter()
            .filter(|s| s.name() == name && s.label("DeviceID") == Some(device_id))
            .collect()
    }

    fn single(samples: &[MetricSample], name: &str) -> f64 {
        samples
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.value)
            .unwrap()
    }

    #[tokio::test]
    async fn test_empty_cache_projects_counts_only() {
        let errors = ErrorCounter::new();
        errors.inc();
        let projector =
            MetricsProjector::new(SnapshotCache::new(Duration::from_secs(75)), errors);

        let samples = projector.project_at(NOW_MS).await;
        assert_eq!(samples.len(), 2);
        assert_eq!(single(&samples, "vmanage_devices"), 0.0);
        assert_eq!(single(&samples, "vmanage_exporter_scrape_errors"), 1.0);
    }

    #[tokio::test]
    async fn test_status_and_reachability() {
        let (projector, _) = projector_with(vec![edge_a(), edge_b()]).await;
        let samples = projector.project_at(NOW_MS).await;

        assert_eq!(single(&samples, "vmanage_devices"), 2.0);

        let a_status = find(&samples, "vmanage_device_status", "10.0.0.1");
        assert_eq!(a_status.len(), 1);
        assert_eq!(a_status[0].value, 1.0);
        assert_eq!(a_status[0].label("status"), Some("normal"));
        assert_eq!(a_status[0].label("Hostname"), Some("edge-a"));

        let b_status = find(&samples, "vmanage_device_status", "10.0.0.2");
        assert_eq!(b_status[0].value, 0.0);
        assert_eq!(b_status[0].label("status"), Some("degraded"));

        let a_reach = find(&samples, "vmanage_device_reachability", "10.0.0.1");
        assert_eq!(a_reach[0].value, 1.0);
        let b_reach = find(&samples, "vmanage_device_reachability", "10.0.0.2");
        assert_eq!(b_reach[0].value, 0.0);
        assert_eq!(b_reach[0].label("reachability"), Some("unreachable"));
    }

    #[tokio::test]
    async fn test_info_labels() {
        let (projector, _) = projector_with(vec![edge_a()]).await;
        let samples = projector.project_at(NOW_MS).await;

        let info = find(&samples, "vmanage_device_info", "10.0.0.1");
        let names: Vec<_> = info[0].labels.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            names,
            ["DeviceID", "SystemIP", "Hostname", "DeviceModel", "Version", "DeviceOS"]
        );
        assert_eq!(info[0].label("DeviceModel"), Some("vedge-C8000V"));
        assert_eq!(info[0].value, 1.0);
    }

    #[tokio::test]
    async fn test_uptime_counter() {
        let (projector, _) = projector_with(vec![edge_a(), edge_b()]).await;
        let samples = projector.project_at(NOW_MS).await;

        let a_uptime = find(&samples, "vmanage_device_uptime", "10.0.0.1");
        assert_eq!(a_uptime[0].value, 360_000.0);
        assert_eq!(a_uptime[0].family.kind, MetricKind::Counter);
        // No boot timestamp, no uptime.
        assert!(find(&samples, "vmanage_device_uptime", "10.0.0.2").is_empty());

        // Controller clock ahead of ours.
        let early = projector.project_at(1_600_000_000_000).await;
        assert_eq!(find(&early, "vmanage_device_uptime", "10.0.0.1")[0].value, 0.0);
    }

    #[tokio::test]
    async fn test_system_status_only_when_cached() {
        let (projector, cache) = projector_with(vec![edge_a(), edge_b()]).await;
        cache
            .set_system_status(
                "10.0.0.1",
                DeviceSystemStatus {
                    mem_used: "2048".to_string(),
                    mem_total: "8192".to_string(),
                    mem_free: "not-a-number".to_string(),
                    cpu_user: "12.5".to_string(),
                    min15_avg: "0.42".to_string(),
                    ..Default::default()
                },
            )
            .await;

        let samples = projector.project_at(NOW_MS).await;

        assert_eq!(find(&samples, "vmanage_device_mem_used", "10.0.0.1")[0].value, 2048.0);
        assert_eq!(find(&samples, "vmanage_device_mem_total", "10.0.0.1")[0].value, 8192.0);
        assert_eq!(find(&samples, "vmanage_device_mem_free", "10.0.0.1")[0].value, 0.0);
        assert_eq!(
            find(&samples, "vmanage_device_cpu_user_percentage", "10.0.0.1")[0].value,
            12.5
        );
        assert_eq!(find(&samples, "vmanage_device_load_avg15", "10.0.0.1")[0].value, 0.42);

        for name in ["vmanage_device_mem_used", "vmanage_device_cpu_idle_percentage"] {
            assert!(find(&samples, name, "10.0.0.2").is_empty());
        }
    }

    #[tokio::test]
    async fn test_interface_counters_and_labels() {
        let (projector, cache) = projector_with(vec![edge_a()]).await;
        let interfaces: Vec<DeviceInterface> = serde_json::from_value(serde_json::json!([
            {
                "vdevice-name": "10.0.0.1",
                "vdevice-dataKey": "10.0.0.1-0-ge0/0-ipv4",
                "ifname": "ge0/0",
                "ifindex": "14",
                "af-type": "ipv4",
                "if-admin-status": "if-state-up",
                "if-oper-status": "if-oper-state-down",
                "tx-octets": 1000,
                "rx-octets": 2000,
                "rx-drops": 3
            },
            {
                "vdevice-name": "10.0.0.1",
                "vdevice-dataKey": "10.0.0.1-0-ge0/1-ipv4",
                "ifname": "ge0/1",
                "ifindex": 14.0,
                "af-type": "ipv4",
                "if-admin-status": "Up",
                "if-oper-status": "Up"
            }
        ]))
        .unwrap();
        cache.set_interfaces("10.0.0.1", interfaces).await;

        let samples = projector.project_at(NOW_MS).await;

        let tx = find(&samples, "vmanage_device_interface_tx_octets", "10.0.0.1");
        assert_eq!(tx.len(), 2);
        assert_eq!(tx[0].value, 1000.0);
        assert_eq!(tx[0].label("Ifname"), Some("ge0/0"));
        assert_eq!(tx[0].label("IfIndex"), Some("14"));
        assert_eq!(tx[1].label("IfIndex"), Some("14"));
        assert_eq!(tx[0].label("VdeviceDataKey"), Some("10.0.0.1-0-ge0/0-ipv4"));
        let names: Vec<_> = tx[0].labels.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            names,
            ["DeviceID", "VdeviceName", "Ifname", "IfIndex", "AfType", "VdeviceDataKey"]
        );

        let rx_drops = find(&samples, "vmanage_device_interface_rx_drops", "10.0.0.1");
        assert_eq!(rx_drops[0].value, 3.0);
        assert_eq!(rx_drops[1].value, 0.0);

        let admin = find(&samples, "vmanage_device_interface_admin_up", "10.0.0.1");
        assert_eq!((admin[0].value, admin[1].value), (1.0, 1.0));
        let oper = find(&samples, "vmanage_device_interface_oper_up", "10.0.0.1");
        assert_eq!((oper[0].value, oper[1].value), (0.0, 1.0));
    }

    #[test]
    fn test_counters_never_negative() {
        let mut out = Vec::new();
        push(&mut out, DEVICE_UPTIME, Vec::new(), -5.0);
        push(&mut out, CPU_USER, Vec::new(), -5.0);
        assert_eq!(out[0].value, 0.0);
        assert_eq!(out[1].value, -5.0);
    }
}
