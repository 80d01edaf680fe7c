//! Domain model for system status from `/dataservice/device/system[/synced]/status`.
//!
//! The controller normally encodes every numeric field of this record as a
//! string.
//! Parsing happens on read through [`parse_or_zero`], so one malformed field
//! only zeroes that field.

use super::lenient;
use serde::Deserialize;

/// System status of one device, raw as the controller sends it.
///
/// Numeric fields are usually strings, but numbers and `null` are accepted
/// too and kept in their text form.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DeviceSystemStatus {
    #[serde(rename = "vdevice-name", deserialize_with = "lenient::text")]
    pub vdevice_name: String,
    #[serde(rename = "vdevice-host-name", deserialize_with = "lenient::text")]
    pub vdevice_host_name: String,
    #[serde(rename = "vdevice-dataKey", deserialize_with = "lenient::text")]
    pub vdevice_data_key: String,
    #[serde(deserialize_with = "lenient::text")]
    pub mem_used: String,
    #[serde(deserialize_with = "lenient::text")]
    pub mem_free: String,
    #[serde(deserialize_with = "lenient::text")]
    pub mem_total: String,
    #[serde(deserialize_with = "lenient::text")]
    pub mem_buffers: String,
    #[serde(deserialize_with = "lenient::text")]
    pub mem_cached: String,
    #[serde(deserialize_with = "lenient::text")]
    pub cpu_user: String,
    #[serde(deserialize_with = "lenient::text")]
    pub cpu_system: String,
    #[serde(deserialize_with = "lenient::text")]
    pub cpu_idle: String,
    #[serde(deserialize_with = "lenient::text")]
    pub min1_avg: String,
    #[serde(deserialize_with = "lenient::text")]
    pub min5_avg: String,
    #[serde(deserialize_with = "lenient::text")]
    pub min15_avg: String,
    #[serde(deserialize_with = "lenient::text")]
    pub total_cpu_count: String,
    #[serde(deserialize_with = "lenient::text")]
    pub procs: String,
    #[serde(deserialize_with = "lenient::text")]
    pub version: String,
    #[serde(deserialize_with = "lenient::text")]
    pub state: String,
    #[serde(deserialize_with = "lenient::text")]
    pub uptime: String,
    #[serde(deserialize_with = "lenient::timestamp")]
    pub lastupdated: Option<i64>,
}

/// Memory figures in the unit the controller reports (KiB).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MemoryUsage {
    pub used: f64,
    pub free: f64,
    pub total: f64,
    pub buffers: f64,
    pub cached: f64,
}

/// CPU percentages and load averages.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CpuUsage {
    pub user_percentage: f64,
    pub system_percentage: f64,
    pub idle_percentage: f64,
    pub load_avg_1: f64,
    pub load_avg_5: f64,
    pub load_avg_15: f64,
}

impl DeviceSystemStatus {
    pub fn memory(&self) -> MemoryUsage {
        MemoryUsage {
            used: parse_or_zero(&self.mem_used),
            free: parse_or_zero(&self.mem_free),
            total: parse_or_zero(&self.mem_total),
            buffers: parse_or_zero(&self.mem_buffers),
            cached: parse_or_zero(&self.mem_cached),
        }
    }

    pub fn cpu(&self) -> CpuUsage {
        CpuUsage {
            user_percentage: parse_or_zero(&self.cpu_user),
            system_percentage: parse_or_zero(&self.cpu_system),
            idle_percentage: parse_or_zero(&self.cpu_idle),
            load_avg_1: parse_or_zero(&self.min1_avg),
            load_avg_5: parse_or_zero(&self.min5_avg),
            load_avg_15: parse_or_zero(&self.min15_avg),
        }
    }
}

/// Parses a string-encoded number, returning 0.0 for anything unparsable.
///
/// Non-finite results (`"NaN"`, `"inf"`) also collapse to 0.0.
pub fn parse_or_zero(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Query options for the system status endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSystemStatusListOptions {
    pub device_id: String,
}

impl DeviceSystemStatusListOptions {
    pub fn for_device(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
        }
    }
}
