use crate::core::domain::value_object::{CsrfToken, SessionCookie};

/// An authenticated vManage session: the `JSESSIONID` cookie together with
/// the anti-CSRF token fetched with it.
///
/// Both halves are required to build a session, so a half-authenticated
/// state cannot be represented. "No session" is `Option::<Session>::None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    cookie: SessionCookie,
    csrf_token: CsrfToken,
}

impl Session {
    pub fn new(cookie: SessionCookie, csrf_token: CsrfToken) -> Self {
        Self { cookie, csrf_token }
    }

    pub fn cookie(&self) -> &SessionCookie {
        &self.cookie
    }

    pub fn csrf_token(&self) -> &CsrfToken {
        &self.csrf_token
    }
}
