use crate::core::domain::value_object::{VmanagePassword, VmanageUrl, VmanageUsername};

/// Static connection settings for one controller.
///
/// Built once by the client builder and never mutated afterwards; the TLS
/// policy in particular is fixed for the lifetime of the client.
#[derive(Debug, Clone)]
pub struct VmanageConnection {
    base_url: VmanageUrl,
    username: VmanageUsername,
    password: VmanagePassword,
    verify_tls: bool,
}

impl VmanageConnection {
    pub fn new(
        base_url: VmanageUrl,
        username: VmanageUsername,
        password: VmanagePassword,
        verify_tls: bool,
    ) -> Self {
        Self {
            base_url,
            username,
            password,
            verify_tls,
        }
    }

    pub fn base_url(&self) -> &VmanageUrl {
        &self.base_url
    }

    pub fn username(&self) -> &VmanageUsername {
        &self.username
    }

    pub fn password(&self) -> &VmanagePassword {
        &self.password
    }

    /// Returns true if certificate checks are disabled.
    pub fn accept_invalid_certs(&self) -> bool {
        !self.verify_tls
    }
}
