//! Query-string options for collection endpoints.

use crate::core::domain::model::{
    device_interface::DeviceInterfaceListOptions,
    device_system_status::DeviceSystemStatusListOptions,
};

/// Options that render as URL query parameters.
///
/// Implementors return only the parameters that are set; the fetcher
/// URL-encodes them.
pub trait FetchOptions: Send + Sync {
    fn params(&self) -> Vec<(&'static str, String)>;
}

fn push_non_empty(params: &mut Vec<(&'static str, String)>, key: &'static str, value: &str) {
    if !value.is_empty() {
        params.push((key, value.to_string()));
    }
}

impl FetchOptions for DeviceInterfaceListOptions {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(4);
        push_non_empty(&mut params, "vpn-id", &self.vpn_id);
        push_non_empty(&mut params, "ifname", &self.ifname);
        push_non_empty(&mut params, "af-type", &self.af_type);
        push_non_empty(&mut params, "deviceId", &self.device_id);
        params
    }
}

impl FetchOptions for DeviceSystemStatusListOptions {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(1);
        push_non_empty(&mut params, "deviceId", &self.device_id);
        params
    }
}
