mod auth;
pub mod collector;
pub mod config;
mod core;
pub mod server;

#[cfg(test)]
mod tests;

pub use crate::config::{ClientConfig, CollectorConfig, RateLimitConfig};
pub use crate::core::domain::error::{ValidationError, VmanageError, VmanageResult};
pub use crate::core::domain::model::{
    device::Device,
    device_interface::{DeviceInterface, DeviceInterfaceListOptions},
    device_system_status::{
        CpuUsage, DeviceSystemStatus, DeviceSystemStatusListOptions, MemoryUsage,
    },
    session::Session,
};
pub use crate::core::domain::value_object::{CsrfToken, SessionCookie};
pub use crate::core::infrastructure::cancellation::Cancellation;

use crate::core::{
    domain::{
        model::vmanage_connection::VmanageConnection,
        value_object::{
            VmanagePassword, VmanageUrl, VmanageUsername, validate_password, validate_url,
            validate_username,
        },
    },
    infrastructure::api_client::ApiClient,
};
use reqwest::{Method, RequestBuilder};
use std::sync::Arc;
use std::time::Duration;

const DEVICE_PATH: &str = "/dataservice/device";
const INTERFACE_PATH: &str = "/dataservice/device/interface";
const INTERFACE_SYNCED_PATH: &str = "/dataservice/device/interface/synced";
const SYSTEM_STATUS_PATH: &str = "/dataservice/device/system/status";
const SYSTEM_STATUS_SYNCED_PATH: &str = "/dataservice/device/system/synced/status";

/// A client for the vManage REST API.
///
/// This client provides:
/// - Session management (login, logout, transparent re-login)
/// - Typed access to the device, interface and system status endpoints
/// - Optional client-side rate limiting
///
/// Clones share the same session, so one client can serve any number of
/// concurrent tasks.
///
/// # Examples
///
/// ```no_run
/// use vmanage_exporter::{Cancellation, VmanageClient, VmanageResult};
///
/// #[tokio::main]
/// async fn main() -> VmanageResult<()> {
///     let client = VmanageClient::builder()
///         .endpoint("https://vmanage.example.com")?
///         .credentials("monitor", "password")?
///         .verify_tls(true)
///         .build()?;
///
///     client.login().await?;
///     let devices = client.devices(&Cancellation::never()).await?;
///     println!("{} devices", devices.len());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct VmanageClient {
    api: Arc<ApiClient>,
}

/// Builder for VmanageClient configuration
pub struct VmanageClientBuilder {
    endpoint: Option<String>,
    username: Option<String>,
    password: Option<String>,
    verify_tls: bool,
    config: ClientConfig,
}

impl Default for VmanageClientBuilder {
    fn default() -> Self {
        Self {
            endpoint: None,
            username: None,
            password: None,
            verify_tls: true,
            config: ClientConfig::default(),
        }
    }
}

impl std::fmt::Debug for VmanageClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VmanageClientBuilder")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("verify_tls", &self.verify_tls)
            .field("config", &self.config)
            .finish()
    }
}

impl VmanageClientBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> VmanageResult<Self> {
        self.endpoint = Some(endpoint.into());
        Ok(self)
    }

    pub fn credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> VmanageResult<Self> {
        self.username = Some(username.into());
        self.password = Some(password.into());
        Ok(self)
    }

    /// Whether to verify the controller's TLS certificate. On by default.
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn rate_limit(mut self, requests_per_second: u32, burst_size: u32) -> Self {
        self.config.rate_limit = Some(RateLimitConfig {
            requests_per_second,
            burst_size,
        });
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    /// Validates the settings and builds an unauthenticated client.
    ///
    /// # Errors
    /// Returns `VmanageError::Validation` if a field is missing or invalid.
    pub fn build(self) -> VmanageResult<VmanageClient> {
        let endpoint = required(self.endpoint, "endpoint")?;
        validate_url(&endpoint)?;

        let username = required(self.username, "username")?;
        validate_username(&username)?;

        let password = required(self.password, "password")?;
        validate_password(&password)?;

        let connection = VmanageConnection::new(
            VmanageUrl::new_unchecked(endpoint),
            VmanageUsername::new_unchecked(username),
            VmanagePassword::new_unchecked(password),
            self.verify_tls,
        );

        Ok(VmanageClient {
            api: Arc::new(ApiClient::new(connection, self.config)?),
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, ValidationError> {
    value.ok_or_else(|| ValidationError::Field {
        field: field.to_string(),
        message: format!("{field} is required"),
    })
}

impl VmanageClient {
    /// Creates a new builder for VmanageClient configuration
    pub fn builder() -> VmanageClientBuilder {
        VmanageClientBuilder::default()
    }

    /// Authenticates with the controller, replacing any existing session.
    ///
    /// # Errors
    ///
    /// Returns `VmanageError::Authentication` if:
    /// - The credentials are rejected
    /// - The controller is unreachable
    /// - No `JSESSIONID` cookie or CSRF token is returned
    pub async fn login(&self) -> VmanageResult<()> {
        self.api.login().await
    }

    /// Ends the current session. A no-op when not authenticated.
    ///
    /// # Errors
    /// Returns an error if the controller does not confirm the logout. The
    /// local session is cleared either way.
    pub async fn logout(&self) -> VmanageResult<()> {
        self.api.logout().await
    }

    /// Returns true if the client holds a session
    pub async fn is_authenticated(&self) -> bool {
        self.api.is_authenticated().await
    }

    /// Returns the current session, if any
    pub async fn session(&self) -> Option<Session> {
        self.api.session().await
    }

    /// Builds an authenticated request for an endpoint without a typed method.
    ///
    /// Logs in first if there is no session.
    ///
    /// # Errors
    /// Returns `VmanageError::Validation` for a malformed path and
    /// `VmanageError::Authentication` if the login fails.
    pub async fn request(&self, method: Method, path: &str) -> VmanageResult<RequestBuilder> {
        let url = self.api.connection().base_url().endpoint(path)?;
        self.api.authenticated_request(method, url).await
    }

    /// Lists every device known to the controller.
    ///
    /// # Errors
    /// See [`VmanageError`]; cancellation yields `VmanageError::Cancelled`.
    pub async fn devices(&self, cancel: &Cancellation) -> VmanageResult<Vec<Device>> {
        self.api.fetch_collection(DEVICE_PATH, None, cancel).await
    }

    /// Lists interface statistics.
    ///
    /// With `synced` the controller answers from its cache instead of polling
    /// the device live.
    ///
    /// # Errors
    /// See [`VmanageError`]; cancellation yields `VmanageError::Cancelled`.
    pub async fn device_interfaces(
        &self,
        synced: bool,
        options: &DeviceInterfaceListOptions,
        cancel: &Cancellation,
    ) -> VmanageResult<Vec<DeviceInterface>> {
        let path = if synced {
            INTERFACE_SYNCED_PATH
        } else {
            INTERFACE_PATH
        };
        self.api.fetch_collection(path, Some(options), cancel).await
    }

    /// Lists system status records (CPU, memory, load).
    ///
    /// # Errors
    /// See [`VmanageError`]; cancellation yields `VmanageError::Cancelled`.
    pub async fn device_system_status(
        &self,
        synced: bool,
        options: &DeviceSystemStatusListOptions,
        cancel: &Cancellation,
    ) -> VmanageResult<Vec<DeviceSystemStatus>> {
        let path = if synced {
            SYSTEM_STATUS_SYNCED_PATH
        } else {
            SYSTEM_STATUS_PATH
        };
        self.api.fetch_collection(path, Some(options), cancel).await
    }
}
