use crate::core::domain::error::ValidationError;
use url::Url;

const ALLOWED_SCHEMES: [&str; 2] = ["https", "http"];
const MAX_URL_LENGTH: usize = 2083;

/// Represents a validated vManage base URL
///
/// The base URL is the controller root, e.g. `https://vmanage.example.com:8443`.
/// Endpoint paths such as `/dataservice/device` are appended verbatim, so any
/// trailing slash is stripped at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmanageUrl(String);

impl VmanageUrl {
    /// Creates a new URL without validation.
    pub(crate) fn new_unchecked(url: String) -> Self {
        Self(url.trim_end_matches('/').to_string())
    }

    /// Returns the base URL without a trailing slash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins an endpoint path onto the base URL.
    ///
    /// # Errors
    /// Returns `ValidationError::Format` if the result is not a valid URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ValidationError> {
        let joined = format!("{}/{}", self.0, path.trim_start_matches('/'));
        Url::parse(&joined)
            .map_err(|e| ValidationError::Format(format!("Invalid endpoint URL {joined}: {e}")))
    }
}

/// Validates a controller base URL.
pub(crate) fn validate_url(url: &str) -> Result<(), ValidationError> {
    if url.is_empty() {
        return Err(ValidationError::Field {
            field: "endpoint".to_string(),
            message: "URL cannot be empty".to_string(),
        });
    }

    if url.len() > MAX_URL_LENGTH {
        return Err(ValidationError::Format(format!(
            "URL exceeds maximum length of {} characters",
            MAX_URL_LENGTH
        )));
    }

    let parsed =
        Url::parse(url).map_err(|e| ValidationError::Format(format!("Invalid URL format: {e}")))?;

    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        return Err(ValidationError::ConstraintViolation(format!(
            "Invalid scheme. Must be one of: {}",
            ALLOWED_SCHEMES.join(", ")
        )));
    }

    if parsed.host_str().is_none() {
        return Err(ValidationError::Field {
            field: "endpoint".to_string(),
            message: "URL must contain a host".to_string(),
        });
    }

    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(ValidationError::ConstraintViolation(
            "Base URL must not carry a query or fragment".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert!(validate_url("https://vmanage.example.com").is_ok());
        assert!(validate_url("https://vmanage.example.com:8443/").is_ok());
        assert!(validate_url("http://10.0.0.1").is_ok());
    }

    #[test]
    fn test_invalid_urls() {
        assert!(validate_url("").is_err());
        assert!(validate_url("vmanage.example.com").is_err());
        assert!(validate_url("ftp://vmanage.example.com").is_err());
        assert!(validate_url("https://vmanage.example.com/?a=b").is_err());
        assert!(validate_url(&format!("https://{}.com", "a".repeat(2100))).is_err());
    }

    #[test]
    fn test_endpoint_join() {
        let url = VmanageUrl::new_unchecked("https://vmanage.example.com:8443/".to_string());
        assert_eq!(url.as_str(), "https://vmanage.example.com:8443");
        assert_eq!(
            url.endpoint("/dataservice/device").unwrap().as_str(),
            "https://vmanage.example.com:8443/dataservice/device"
        );
        assert_eq!(
            url.endpoint("j_security_check").unwrap().as_str(),
            "https://vmanage.example.com:8443/j_security_check"
        );
    }
}
