use crate::core::domain::error::ValidationError;

/// Name of the cookie carrying the vManage session id.
pub const SESSION_COOKIE_NAME: &str = "JSESSIONID";

/// A vManage session cookie value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    value: String,
}

impl SessionCookie {
    /// Creates a new session cookie without validation.
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self { value }
    }

    /// Returns the cookie value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Formats the cookie as a `Cookie` header value.
    #[must_use]
    pub fn as_cookie_header(&self) -> String {
        format!("{}={}", SESSION_COOKIE_NAME, self.value)
    }
}

/// Validates the format of a session cookie value.
pub(crate) fn validate_session_cookie(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Field {
            field: "session_cookie".to_string(),
            message: "Session cookie cannot be empty".to_string(),
        });
    }
    if value.chars().any(|c| c.is_whitespace() || c == ';' || c == ',') {
        return Err(ValidationError::Format(
            "Session cookie contains characters not allowed in a cookie value".to_string(),
        ));
    }
    Ok(())
}
