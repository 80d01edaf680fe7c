//! Domain model for interface statistics from `/dataservice/device/interface[/synced]`.

use super::lenient;
use serde::Deserialize;

/// Statistics for one interface of one device.
///
/// Identified by `(deviceId, vdevice-dataKey, ifname)`. The traffic counters
/// are cumulative on the device side; fields the controller leaves out or
/// sends as `null` decode as zero.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceInterface {
    #[serde(rename = "vdevice-name", default, deserialize_with = "lenient::text")]
    pub vdevice_name: String,
    #[serde(rename = "vdevice-host-name", default, deserialize_with = "lenient::text")]
    pub vdevice_host_name: String,
    #[serde(rename = "vdevice-dataKey", default, deserialize_with = "lenient::text")]
    pub vdevice_data_key: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub ifname: String,
    /// Interface index, normalized from the string or numeric wire form.
    #[serde(default, deserialize_with = "lenient::integer")]
    pub ifindex: i64,
    /// Address family (`ipv4`, `ipv6`).
    #[serde(rename = "af-type", default, deserialize_with = "lenient::text")]
    pub af_type: String,
    #[serde(rename = "vpn-id", default, deserialize_with = "lenient::text")]
    pub vpn_id: String,
    #[serde(rename = "if-admin-status", default, deserialize_with = "lenient::text")]
    pub if_admin_status: String,
    #[serde(rename = "if-oper-status", default, deserialize_with = "lenient::text")]
    pub if_oper_status: String,
    #[serde(rename = "ip-address", default, deserialize_with = "lenient::text")]
    pub ip_address: String,
    #[serde(rename = "tx-octets", default, deserialize_with = "lenient::counter")]
    pub tx_octets: u64,
    #[serde(rename = "rx-octets", default, deserialize_with = "lenient::counter")]
    pub rx_octets: u64,
    #[serde(rename = "tx-packets", default, deserialize_with = "lenient::counter")]
    pub tx_packets: u64,
    #[serde(rename = "rx-packets", default, deserialize_with = "lenient::counter")]
    pub rx_packets: u64,
    #[serde(rename = "tx-errors", default, deserialize_with = "lenient::counter")]
    pub tx_errors: u64,
    #[serde(rename = "rx-errors", default, deserialize_with = "lenient::counter")]
    pub rx_errors: u64,
    #[serde(rename = "tx-drops", default, deserialize_with = "lenient::counter")]
    pub tx_drops: u64,
    #[serde(rename = "rx-drops", default, deserialize_with = "lenient::counter")]
    pub rx_drops: u64,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub lastupdated: Option<i64>,
}

impl DeviceInterface {
    /// Returns true if the interface is administratively up.
    pub fn is_admin_up(&self) -> bool {
        is_up(&self.if_admin_status)
    }

    /// Returns true if the interface is operationally up.
    pub fn is_oper_up(&self) -> bool {
        is_up(&self.if_oper_status)
    }
}

// vEdge reports "Up", IOS-XE cEdge reports "if-state-up".
fn is_up(status: &str) -> bool {
    matches!(status, "Up" | "if-state-up")
}

/// Query options for the interface listing endpoints.
///
/// Empty fields are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInterfaceListOptions {
    pub device_id: String,
    pub vpn_id: String,
    pub ifname: String,
    pub af_type: String,
}

impl DeviceInterfaceListOptions {
    pub fn for_device(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            ..Default::default()
        }
    }
}
