use thiserror::Error;

/// The main error type for vManage operations.
///
/// This enum represents all possible errors that can occur while talking
/// to the controller: session failures, non-success responses, network
/// failures, cancellation and configuration validation.
#[derive(Error, Debug)]
pub enum VmanageError {
    /// Represents login, logout and session failures
    ///
    /// # Fields
    /// * `0` - A description of the authentication failure
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Represents a non-success HTTP status on an authenticated request
    ///
    /// # Fields
    /// * `status` - The HTTP status code returned by the controller
    /// * `body` - The response body, as far as it could be read
    #[error("API error ({status}): {body}")]
    Fetch { status: u16, body: String },

    /// Represents network-level failures (connect, TLS, reset, timeout)
    ///
    /// # Fields
    /// * `0` - A description of what went wrong on the wire
    #[error("Transport error: {0}")]
    Transport(String),

    /// The call was aborted by its cancellation signal or deadline
    #[error("Request cancelled")]
    Cancelled,

    /// A success response whose body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Represents validation failures with detailed context
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl VmanageError {
    /// Returns true for failures that mean the session is not usable.
    ///
    /// Covers explicit authentication errors as well as `401`/`403`
    /// responses to an authenticated request.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            VmanageError::Authentication(_) => true,
            VmanageError::Fetch { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }

    /// Returns true if the call was aborted by its cancellation signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, VmanageError::Cancelled)
    }
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    ///
    /// # Fields
    /// * `0` - Description of the format violation
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    ///
    /// # Fields
    /// * `0` - Description of the constraint violation
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Type alias for Results that may fail with a VmanageError
pub type VmanageResult<T> = Result<T, VmanageError>;
