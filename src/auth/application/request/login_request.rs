use crate::core::domain::model::vmanage_connection::VmanageConnection;
use std::fmt;

/// Credentials posted to `/j_security_check`.
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn from_connection(connection: &VmanageConnection) -> Self {
        Self {
            username: connection.username().as_str().to_string(),
            password: connection.password().as_str().to_string(),
        }
    }

    /// Encodes the credentials as an `application/x-www-form-urlencoded` body.
    pub fn to_form_body(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("j_username", &self.username)
            .append_pair("j_password", &self.password)
            .finish()
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_body_is_url_encoded() {
        let request = LoginRequest {
            username: "ops@example".to_string(),
            password: "p&ss=w rd".to_string(),
        };
        assert_eq!(
            request.to_form_body(),
            "j_username=ops%40example&j_password=p%26ss%3Dw+rd"
        );
    }

    #[test]
    fn test_debug_hides_password() {
        let request = LoginRequest {
            username: "admin".to_string(),
            password: "secret".to_string(),
        };
        assert!(!format!("{:?}", request).contains("secret"));
    }
}
