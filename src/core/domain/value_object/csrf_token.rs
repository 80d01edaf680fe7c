use crate::core::domain::error::ValidationError;

/// Header carrying the anti-CSRF token on authenticated requests.
pub const CSRF_HEADER_NAME: &str = "X-XSRF-TOKEN";

/// A vManage anti-CSRF token, as returned by `/dataservice/client/token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken {
    value: String,
}

impl CsrfToken {
    /// Creates a new CSRF token without validation.
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self { value }
    }

    /// Returns the token value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

/// Validates a raw token body.
///
/// The controller answers an expired or missing session with an HTML login
/// page, so anything that looks like markup is rejected here.
pub(crate) fn validate_csrf_token(token: &str) -> Result<(), ValidationError> {
    if token.is_empty() {
        return Err(ValidationError::Field {
            field: "csrf_token".to_string(),
            message: "CSRF token cannot be empty".to_string(),
        });
    }
    if token.contains('<') || token.chars().any(char::is_whitespace) {
        return Err(ValidationError::Format(
            "CSRF token must be a single opaque string".to_string(),
        ));
    }
    Ok(())
}
