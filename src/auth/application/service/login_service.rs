use crate::{
    VmanageError, VmanageResult,
    auth::application::request::login_request::LoginRequest,
    core::domain::{
        model::{session::Session, vmanage_connection::VmanageConnection},
        value_object::{
            CsrfToken, SESSION_COOKIE_NAME, SessionCookie, validate_csrf_token,
            validate_session_cookie,
        },
    },
};

use reqwest::{
    Client,
    header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue},
};
use tracing::debug;

pub const LOGIN_PATH: &str = "/j_security_check";
pub const TOKEN_PATH: &str = "/dataservice/client/token";

/// Performs the two-step vManage login: form login for the session cookie,
/// then an authenticated GET for the anti-CSRF token.
pub struct LoginService {
    default_headers: HeaderMap,
}

impl LoginService {
    pub fn new() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        Self { default_headers }
    }

    /// Logs in and returns a complete session.
    ///
    /// # Errors
    /// Every failure is reported as `VmanageError::Authentication`: an
    /// unreachable controller, a non-success status, a missing `JSESSIONID`
    /// cookie, or a failed token fetch.
    pub async fn execute(
        &self,
        http_client: &Client,
        connection: &VmanageConnection,
    ) -> VmanageResult<Session> {
        let cookie = self.request_session_cookie(http_client, connection).await?;
        let csrf_token = self.fetch_token(http_client, connection, &cookie).await?;
        debug!(username = connection.username().as_str(), "Login succeeded");
        Ok(Session::new(cookie, csrf_token))
    }

    async fn request_session_cookie(
        &self,
        http_client: &Client,
        connection: &VmanageConnection,
    ) -> VmanageResult<SessionCookie> {
        let url = connection.base_url().endpoint(LOGIN_PATH)?;
        let request = LoginRequest::from_connection(connection);

        let response = http_client
            .post(url)
            .headers(self.default_headers.clone())
            .body(request.to_form_body())
            .send()
            .await
            .map_err(|e| VmanageError::Authentication(format!("Login request failed: {e}")))?;

        let status = response.status();
        let cookie = response
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE_NAME)
            .map(|c| c.value().to_string());

        if !status.is_success() {
            return Err(VmanageError::Authentication(format!(
                "Login failed with status {status}"
            )));
        }

        let cookie = cookie.ok_or_else(|| {
            VmanageError::Authentication(format!(
                "Login response did not set the {SESSION_COOKIE_NAME} cookie"
            ))
        })?;

        validate_session_cookie(&cookie)
            .map_err(|e| VmanageError::Authentication(format!("Invalid session cookie: {e}")))?;

        Ok(SessionCookie::new_unchecked(cookie))
    }

    async fn fetch_token(
        &self,
        http_client: &Client,
        connection: &VmanageConnection,
        cookie: &SessionCookie,
    ) -> VmanageResult<CsrfToken> {
        let url = connection.base_url().endpoint(TOKEN_PATH)?;

        let response = http_client
            .get(url)
            .header(COOKIE, cookie.as_cookie_header())
            .send()
            .await
            .map_err(|e| VmanageError::Authentication(format!("Error fetching token: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VmanageError::Authentication(format!(
                "Error fetching token: status {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| VmanageError::Authentication(format!("Error reading token: {e}")))?;
        let token = body.trim();

        validate_csrf_token(token)
            .map_err(|e| VmanageError::Authentication(format!("Invalid CSRF token: {e}")))?;

        Ok(CsrfToken::new_unchecked(token.to_string()))
    }
}

impl Default for LoginService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::{TEST_COOKIE, TEST_TOKEN, mount_login, test_connection};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_string, header, method, path},
    };

    #[tokio::test]
    async fn test_login_success() {
        let mock_server = MockServer::start().await;
        let connection = test_connection(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("j_username=monitor&j_password=s3cret"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", format!("JSESSIONID={TEST_COOKIE}; Path=/; Secure")),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path(TOKEN_PATH))
            .and(header("cookie", format!("JSESSIONID={TEST_COOKIE}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("{TEST_TOKEN}\n")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let session = LoginService::new()
            .execute(&Client::new(), &connection)
            .await
            .unwrap();

        assert_eq!(session.cookie().as_str(), TEST_COOKIE);
        assert_eq!(session.csrf_token().as_str(), TEST_TOKEN);
    }

    #[tokio::test]
    async fn test_login_missing_cookie() {
        let mock_server = MockServer::start().await;
        let connection = test_connection(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&mock_server)
            .await;

        let result = LoginService::new()
            .execute(&Client::new(), &connection)
            .await;
        assert!(matches!(result, Err(VmanageError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_login_bad_status() {
        let mock_server = MockServer::start().await;
        let connection = test_connection(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path(LOGIN_PATH))
            .respond_with(
                ResponseTemplate::new(403).insert_header("set-cookie", "JSESSIONID=abc; Path=/"),
            )
            .mount(&mock_server)
            .await;

        let result = LoginService::new()
            .execute(&Client::new(), &connection)
            .await;
        assert!(matches!(result, Err(VmanageError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_login_token_failure() {
        let mock_server = MockServer::start().await;
        let connection = test_connection(&mock_server.uri());

        mount_login(&mock_server).await;
        Mock::given(method("GET"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let result = LoginService::new()
            .execute(&Client::new(), &connection)
            .await;
        assert!(matches!(result, Err(VmanageError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_login_unreachable_controller() {
        // Nothing listens on the discard port.
        let connection = test_connection("http://127.0.0.1:9");
        let result = LoginService::new()
            .execute(&Client::new(), &connection)
            .await;
        assert!(matches!(result, Err(VmanageError::Authentication(_))));
    }
}
