mod csrf_token;
mod session_cookie;
mod vmanage_password;
mod vmanage_url;
mod vmanage_username;

pub use csrf_token::{CSRF_HEADER_NAME, CsrfToken};
pub use session_cookie::{SESSION_COOKIE_NAME, SessionCookie};
pub use vmanage_password::VmanagePassword;
pub use vmanage_url::VmanageUrl;
pub use vmanage_username::VmanageUsername;

// Re-export validation functions for internal use
pub(crate) use csrf_token::validate_csrf_token;
pub(crate) use session_cookie::validate_session_cookie;
pub(crate) use vmanage_password::validate_password;
pub(crate) use vmanage_url::validate_url;
pub(crate) use vmanage_username::validate_username;
