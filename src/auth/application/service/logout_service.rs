use crate::{
    VmanageError, VmanageResult,
    core::domain::{
        model::{session::Session, vmanage_connection::VmanageConnection},
        value_object::CSRF_HEADER_NAME,
    },
};

use rand::Rng;
use reqwest::{Client, header::COOKIE};

pub const LOGOUT_PATH: &str = "/logout";
/// Where the controller redirects once the session is invalidated.
pub const WELCOME_PATH: &str = "/welcome.html";

/// Invalidates a session on the controller.
pub struct LogoutService;

impl LogoutService {
    pub fn new() -> Self {
        Self
    }

    /// Sends `GET /logout?nocache=<random>` with the given session.
    ///
    /// # Errors
    /// Returns `VmanageError::Transport` if the request cannot be sent, and
    /// `VmanageError::Authentication` if the controller does not redirect to
    /// the welcome page.
    pub async fn execute(
        &self,
        http_client: &Client,
        connection: &VmanageConnection,
        session: &Session,
    ) -> VmanageResult<()> {
        let mut url = connection.base_url().endpoint(LOGOUT_PATH)?;
        url.query_pairs_mut()
            .append_pair("nocache", &cache_buster().to_string());

        let response = http_client
            .get(url)
            .header(COOKIE, session.cookie().as_cookie_header())
            .header(CSRF_HEADER_NAME, session.csrf_token().as_str())
            .send()
            .await
            .map_err(|e| VmanageError::Transport(format!("Logout request failed: {e}")))?;

        if response.url().path() != WELCOME_PATH {
            return Err(VmanageError::Authentication(format!(
                "Logout did not redirect to {WELCOME_PATH} (landed on {})",
                response.url().path()
            )));
        }

        Ok(())
    }
}

impl Default for LogoutService {
    fn default() -> Self {
        Self::new()
    }
}

fn cache_buster() -> u64 {
    rand::thread_rng().gen_range(0..1_000_000_000)
}
