use crate::{
    Cancellation, VmanageClient, VmanageResult,
    core::domain::model::{
        device::Device,
        device_interface::{DeviceInterface, DeviceInterfaceListOptions},
        device_system_status::{DeviceSystemStatus, DeviceSystemStatusListOptions},
    },
};
use async_trait::async_trait;

/// Where a scrape cycle reads its data from.
///
/// Implemented by [`VmanageClient`] against the controller's synced
/// endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceSource: Send + Sync + 'static {
    async fn devices(&self, cancel: &Cancellation) -> VmanageResult<Vec<Device>>;

    async fn interfaces(
        &self,
        device_id: &str,
        cancel: &Cancellation,
    ) -> VmanageResult<Vec<DeviceInterface>>;

    async fn system_status(
        &self,
        device_id: &str,
        cancel: &Cancellation,
    ) -> VmanageResult<Vec<DeviceSystemStatus>>;
}

#[async_trait]
impl DeviceSource for VmanageClient {
    async fn devices(&self, cancel: &Cancellation) -> VmanageResult<Vec<Device>> {
        VmanageClient::devices(self, cancel).await
    }

    async fn interfaces(
        &self,
        device_id: &str,
        cancel: &Cancellation,
    ) -> VmanageResult<Vec<DeviceInterface>> {
        self.device_interfaces(true, &DeviceInterfaceListOptions::for_device(device_id), cancel)
            .await
    }

    async fn system_status(
        &self,
        device_id: &str,
        cancel: &Cancellation,
    ) -> VmanageResult<Vec<DeviceSystemStatus>> {
        self.device_system_status(
            true,
            &DeviceSystemStatusListOptions::for_device(device_id),
            cancel,
        )
        .await
    }
}
