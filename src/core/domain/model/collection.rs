//! Envelope shared by every `/dataservice` collection endpoint.

use serde::Deserialize;

/// A `{"data": [...]}` response body.
///
/// The controller adds `header` and request metadata next to `data`; those
/// are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> Collection<T> {
    pub fn into_inner(self) -> Vec<T> {
        self.data
    }
}
