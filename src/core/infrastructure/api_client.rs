//! Internal HTTP client that owns the vManage session and performs authenticated fetches.

use crate::{
    VmanageError, VmanageResult,
    auth::application::service::{login_service::LoginService, logout_service::LogoutService},
    config::ClientConfig,
    core::{
        domain::{
            error::ValidationError,
            model::{collection::Collection, session::Session, vmanage_connection::VmanageConnection},
            value_object::CSRF_HEADER_NAME,
        },
        infrastructure::{cancellation::Cancellation, fetch_options::FetchOptions},
    },
};
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{Client, Method, RequestBuilder, StatusCode, header::COOKIE};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};
use url::Url;

/// Internal HTTP client that manages the session and provides authenticated GETs.
///
/// The session (`JSESSIONID` cookie plus `X-XSRF-TOKEN`) is shared by every
/// concurrent caller. Logins are single-flight: callers that find no session
/// while a login is in progress wait for that login and share its outcome
/// instead of starting their own.
pub struct ApiClient {
    http_client: Client,
    connection: VmanageConnection,
    session: RwLock<Option<Session>>,
    /// Serializes logins; holds the failure message of the last attempt.
    login_gate: Mutex<Option<String>>,
    login_attempts: AtomicU64,
    rate_limiter: Option<DefaultDirectRateLimiter>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("connection", &self.connection)
            .field("login_attempts", &self.login_attempts)
            .field("rate_limited", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a new `ApiClient`. The client starts unauthenticated.
    ///
    /// # Errors
    /// Returns `VmanageError::Validation` for an invalid config and
    /// `VmanageError::Transport` if the HTTP client cannot be built.
    pub fn new(connection: VmanageConnection, config: ClientConfig) -> VmanageResult<Self> {
        config.validate()?;

        let mut builder =
            Client::builder().danger_accept_invalid_certs(connection.accept_invalid_certs());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| VmanageError::Transport(e.to_string()))?;

        let rate_limiter = match config.rate_limit {
            Some(rl) => {
                let rate = non_zero(rl.requests_per_second, "rate_limit.requests_per_second")?;
                let burst = non_zero(rl.burst_size, "rate_limit.burst_size")?;
                Some(DefaultDirectRateLimiter::direct(
                    Quota::per_second(rate).allow_burst(burst),
                ))
            }
            None => None,
        };

        Ok(Self {
            http_client,
            connection,
            session: RwLock::new(None),
            login_gate: Mutex::new(None),
            login_attempts: AtomicU64::new(0),
            rate_limiter,
        })
    }

    /// Returns a reference to the underlying connection details.
    pub fn connection(&self) -> &VmanageConnection {
        &self.connection
    }

    /// Returns the current session, if any.
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    #[cfg(test)]
    pub(crate) async fn set_session(&self, session: Session) {
        *self.session.write().await = Some(session);
    }

    /// Returns `true` if a session is currently held.
    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    #[cfg(test)]
    pub(crate) fn login_attempts(&self) -> u64 {
        self.login_attempts.load(Ordering::Acquire)
    }

    /// Performs a fresh login, discarding any existing session first.
    ///
    /// The previous session is logged out best-effort; a failed logout is
    /// logged and does not prevent the new login.
    ///
    /// # Errors
    /// Returns `VmanageError::Authentication` if the login fails.
    pub async fn login(&self) -> VmanageResult<()> {
        let mut gate = self.login_gate.lock().await;

        if self.is_authenticated().await {
            if let Err(e) = self.logout().await {
                warn!(error = %e, "Discarding previous session failed");
            }
        }

        let result = self.perform_login().await;
        self.record_login_attempt(&mut gate, &result);
        result.map(|_| ())
    }

    /// Returns the current session, logging in first if there is none.
    ///
    /// # Errors
    /// Returns `VmanageError::Authentication` if the required login fails,
    /// including a login started by another caller that this call waited on.
    pub async fn ensure_session(&self) -> VmanageResult<Session> {
        if let Some(session) = self.session().await {
            return Ok(session);
        }

        let observed = self.login_attempts.load(Ordering::Acquire);
        let mut gate = self.login_gate.lock().await;

        if self.login_attempts.load(Ordering::Acquire) != observed {
            // A login finished while we were queued on the gate.
            if let Some(session) = self.session().await {
                return Ok(session);
            }
            let reason = gate
                .clone()
                .unwrap_or_else(|| "session was discarded".to_string());
            return Err(VmanageError::Authentication(format!("Login failed: {reason}")));
        }

        if let Some(session) = self.session().await {
            return Ok(session);
        }

        debug!("No session, logging in");
        let result = self.perform_login().await;
        self.record_login_attempt(&mut gate, &result);
        result
    }

    /// Builds a request carrying the session cookie and CSRF header.
    ///
    /// Logs in first if there is no session.
    ///
    /// # Errors
    /// Returns `VmanageError::Authentication` if that login fails.
    pub async fn authenticated_request(
        &self,
        method: Method,
        url: Url,
    ) -> VmanageResult<RequestBuilder> {
        let session = self.ensure_session().await?;
        Ok(authorize(self.http_client.request(method, url), &session))
    }

    /// Logs out and clears the session.
    ///
    /// Without a session this is a no-op. Otherwise local state is cleared
    /// before the request is sent, so it is gone even if the call fails.
    ///
    /// # Errors
    /// Returns `VmanageError::Authentication` if the controller does not
    /// confirm the logout, or `VmanageError::Transport` if it is unreachable.
    pub async fn logout(&self) -> VmanageResult<()> {
        let Some(session) = self.session.write().await.take() else {
            return Ok(());
        };

        LogoutService::new()
            .execute(&self.http_client, &self.connection, &session)
            .await
    }

    /// GETs `endpoint` and decodes the JSON body into `T`.
    ///
    /// # Errors
    /// - `VmanageError::Authentication` if no session could be obtained
    /// - `VmanageError::Fetch` for a non-success status (401/403 also drop
    ///   the session so the next call logs in again)
    /// - `VmanageError::Transport` for network failures
    /// - `VmanageError::Decode` if the body does not match `T`
    /// - `VmanageError::Cancelled` if `cancel` fires first
    pub async fn fetch<T>(
        &self,
        endpoint: &str,
        options: Option<&dyn FetchOptions>,
        cancel: &Cancellation,
    ) -> VmanageResult<T>
    where
        T: DeserializeOwned,
    {
        if cancel.is_cancelled() {
            return Err(VmanageError::Cancelled);
        }

        let mut url = self.connection.base_url().endpoint(endpoint)?;
        if let Some(options) = options {
            let params = options.params();
            if !params.is_empty() {
                url.query_pairs_mut().extend_pairs(params.iter());
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(VmanageError::Cancelled),
            result = self.execute_get(url) => result,
        }
    }

    /// GETs a `{"data": [...]}` collection and returns its items.
    ///
    /// # Errors
    /// Same as [`ApiClient::fetch`].
    pub async fn fetch_collection<T>(
        &self,
        endpoint: &str,
        options: Option<&dyn FetchOptions>,
        cancel: &Cancellation,
    ) -> VmanageResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        self.fetch::<Collection<T>>(endpoint, options, cancel)
            .await
            .map(Collection::into_inner)
    }

    async fn execute_get<T>(&self, url: Url) -> VmanageResult<T>
    where
        T: DeserializeOwned,
    {
        let session = self.ensure_session().await?;

        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let response = authorize(self.http_client.get(url.clone()), &session)
            .send()
            .await
            .map_err(|e| {
                VmanageError::Transport(format!("HTTP request to {} failed: {e}", url.path()))
            })?;

        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                self.invalidate_session(&session).await;
            }
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(VmanageError::Fetch {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            VmanageError::Transport(format!("Reading response from {} failed: {e}", url.path()))
        })?;

        serde_json::from_slice::<T>(&bytes)
            .map_err(|e| VmanageError::Decode(format!("{}: {e}", url.path())))
    }

    /// Drops `rejected` if it is still the current session.
    ///
    /// A newer session installed by a concurrent login is left alone.
    async fn invalidate_session(&self, rejected: &Session) {
        let mut lock = self.session.write().await;
        if lock.as_ref() == Some(rejected) {
            warn!("Controller rejected the session, it will be renewed on the next request");
            *lock = None;
        }
    }

    async fn perform_login(&self) -> VmanageResult<Session> {
        let session = LoginService::new()
            .execute(&self.http_client, &self.connection)
            .await?;
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    fn record_login_attempt(&self, gate: &mut Option<String>, result: &VmanageResult<Session>) {
        *gate = result.as_ref().err().map(ToString::to_string);
        self.login_attempts.fetch_add(1, Ordering::AcqRel);
    }
}

fn authorize(builder: RequestBuilder, session: &Session) -> RequestBuilder {
    builder
        .header(COOKIE, session.cookie().as_cookie_header())
        .header(CSRF_HEADER_NAME, session.csrf_token().as_str())
}

fn non_zero(value: u32, field: &str) -> Result<NonZeroU32, ValidationError> {
    NonZeroU32::new(value).ok_or_else(|| ValidationError::Field {
        field: field.to_string(),
        message: "must be greater than 0".to_string(),
    })
}
