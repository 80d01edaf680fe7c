//! Shared fixtures for tests that talk to a mocked controller.

use crate::core::domain::{
    model::{session::Session, vmanage_connection::VmanageConnection},
    value_object::{CsrfToken, SessionCookie, VmanagePassword, VmanageUrl, VmanageUsername},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub(crate) const TEST_COOKIE: &str = "5Fv0kZyPx3lQ8mWc2aRtE9hJ";
pub(crate) const TEST_TOKEN: &str = "A1B2C3D4E5F60718293A4B5C6D7E8F90";

pub(crate) fn test_connection(uri: &str) -> VmanageConnection {
    VmanageConnection::new(
        VmanageUrl::new_unchecked(uri.to_string()),
        VmanageUsername::new_unchecked("monitor".to_string()),
        VmanagePassword::new_unchecked("s3cret".to_string()),
        false,
    )
}

pub(crate) fn test_session() -> Session {
    Session::new(
        SessionCookie::new_unchecked(TEST_COOKIE.to_string()),
        CsrfToken::new_unchecked(TEST_TOKEN.to_string()),
    )
}

/// Mounts the form login that hands out `TEST_COOKIE`.
pub(crate) async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/j_security_check"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", format!("JSESSIONID={TEST_COOKIE}; Path=/")),
        )
        .mount(server)
        .await;
}

/// Mounts the token endpoint that hands out `TEST_TOKEN`.
pub(crate) async fn mount_token(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/dataservice/client/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TEST_TOKEN))
        .mount(server)
        .await;
}

/// Mounts both halves of a successful login.
pub(crate) async fn mount_session(server: &MockServer) {
    mount_login(server).await;
    mount_token(server).await;
}
