use crate::core::domain::error::ValidationError;

/// A validated vManage username.
#[derive(Debug, Clone)]
pub struct VmanageUsername(String);

impl VmanageUsername {
    /// Creates a new username without validation.
    pub(crate) fn new_unchecked(username: String) -> Self {
        Self(username)
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validates a username.
pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::Field {
            field: "username".to_string(),
            message: "Username cannot be empty".to_string(),
        });
    }
    if username.len() > 128 {
        return Err(ValidationError::Format(format!(
            "Username cannot exceed 128 characters (got {})",
            username.len()
        )));
    }
    if username.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(ValidationError::Format(
            "Username cannot contain whitespace or control characters".to_string(),
        ));
    }
    Ok(())
}
