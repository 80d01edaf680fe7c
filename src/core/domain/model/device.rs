//! Domain model for the device inventory from the `/dataservice/device` endpoint.

use super::lenient;
use serde::Deserialize;

/// Status string the controller reports for a healthy device.
pub const STATUS_NORMAL: &str = "normal";
/// Reachability string the controller reports for a reachable device.
pub const REACHABILITY_REACHABLE: &str = "reachable";

/// A device managed by vManage (edge router, vSmart, vBond or vManage itself).
///
/// Returned by the `/dataservice/device` endpoint. Only `deviceId` is
/// required; every other field defaults when the controller omits it or sends
/// `null`, which it does routinely depending on the device personality.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Device {
    /// Stable device identifier (the system IP for most personalities).
    #[serde(rename = "deviceId")]
    pub device_id: String,
    /// Overlay system IP.
    #[serde(rename = "system-ip", default, deserialize_with = "lenient::text")]
    pub system_ip: String,
    /// Configured host name.
    #[serde(rename = "host-name", default, deserialize_with = "lenient::text")]
    pub hostname: String,
    /// `reachable` or `unreachable`.
    #[serde(default, deserialize_with = "lenient::text")]
    pub reachability: String,
    /// `normal`, `warning`, `error`, ...
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: String,
    /// `vedge`, `vsmart`, `vbond`, `vmanage`.
    #[serde(default, deserialize_with = "lenient::text")]
    pub personality: String,
    #[serde(rename = "device-type", default, deserialize_with = "lenient::text")]
    pub device_type: String,
    #[serde(rename = "device-model", default, deserialize_with = "lenient::text")]
    pub device_model: String,
    /// Software version.
    #[serde(default, deserialize_with = "lenient::text")]
    pub version: String,
    #[serde(rename = "device-os", default, deserialize_with = "lenient::text")]
    pub device_os: String,
    #[serde(rename = "site-id", default, deserialize_with = "lenient::text")]
    pub site_id: String,
    #[serde(rename = "board-serial", default, deserialize_with = "lenient::text")]
    pub board_serial: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub uuid: String,
    /// Boot timestamp in milliseconds since the UNIX epoch.
    #[serde(rename = "uptime-date", default, deserialize_with = "lenient::timestamp")]
    pub uptime_date: Option<i64>,
    /// Last time the controller refreshed this record (ms since epoch).
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub lastupdated: Option<i64>,
}

impl Device {
    /// Returns true if the controller reports this device as `normal`.
    pub fn is_normal(&self) -> bool {
        self.status == STATUS_NORMAL
    }

    /// Returns true if the controller can currently reach this device.
    pub fn is_reachable(&self) -> bool {
        self.reachability == REACHABILITY_REACHABLE
    }

    /// Milliseconds since boot at `now_ms`, or `None` without a boot timestamp.
    ///
    /// Clamped at zero when the controller clock is ahead of ours.
    pub fn uptime_ms(&self, now_ms: i64) -> Option<i64> {
        self.uptime_date.map(|boot| (now_ms - boot).max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::model::collection::Collection;

    #[test]
    fn test_device_deserialize() {
        let device: Device = serde_json::from_value(serde_json::json!({
            "deviceId": "10.10.1.5",
            "system-ip": "10.10.1.5",
            "host-name": "edge-zrh-01",
            "reachability": "reachable",
            "status": "normal",
            "personality": "vedge",
            "device-type": "vedge",
            "device-model": "vedge-C8000V",
            "version": "17.9.3a",
            "device-os": "ios-xe",
            "uptime-date": 1700000000000_i64,
            "device-groups": ["No groups"],
            "statusOrder": 4
        }))
        .unwrap();

        assert_eq!(device.device_id, "10.10.1.5");
        assert_eq!(device.hostname, "edge-zrh-01");
        assert_eq!(device.device_model, "vedge-C8000V");
        assert_eq!(device.device_os, "ios-xe");
        assert_eq!(device.uptime_date, Some(1700000000000));
        assert!(device.is_normal());
        assert!(device.is_reachable());
    }

    #[test]
    fn test_device_minimal() {
        let device: Device =
            serde_json::from_value(serde_json::json!({"deviceId": "1.1.1.1"})).unwrap();
        assert_eq!(device.hostname, "");
        assert_eq!(device.uptime_date, None);
        assert!(!device.is_normal());
        assert!(!device.is_reachable());
    }

    #[test]
    fn test_uptime() {
        let device: Device = serde_json::from_value(serde_json::json!({
            "deviceId": "1.1.1.1",
            "uptime-date": 1_000
        }))
        .unwrap();
        assert_eq!(device.uptime_ms(61_000), Some(60_000));
        assert_eq!(device.uptime_ms(500), Some(0));
    }

    #[test]
    fn test_null_and_numeric_fields_decode() {
        let device: Device = serde_json::from_value(serde_json::json!({
            "deviceId": "10.10.1.6",
            "host-name": null,
            "site-id": 100,
            "status": "normal",
            "version": null,
            "uptime-date": "1700000000000",
            "lastupdated": null
        }))
        .unwrap();

        assert_eq!(device.hostname, "");
        assert_eq!(device.site_id, "100");
        assert_eq!(device.version, "");
        assert_eq!(device.uptime_date, Some(1700000000000));
        assert_eq!(device.lastupdated, None);
        assert!(device.is_normal());
    }

    #[test]
    fn test_one_odd_device_keeps_the_list() {
        let collection: Collection<Device> = serde_json::from_value(serde_json::json!({
            "data": [
                {"deviceId": "10.0.0.1", "host-name": "edge-a", "status": "normal"},
                {"deviceId": "10.0.0.2", "host-name": null, "reachability": false},
                {"deviceId": "10.0.0.3", "host-name": "edge-c", "uptime-date": "soon"}
            ]
        }))
        .unwrap();

        let devices = collection.into_inner();
        assert_eq!(devices.len(), 3);
        assert_eq!(devices[1].hostname, "");
        assert_eq!(devices[1].reachability, "false");
        assert!(!devices[1].is_reachable());
        assert_eq!(devices[2].uptime_date, None);
    }
}
