use serde::{Deserialize, Serialize};
use std::fmt;

/// Credentials of the logged-in account.
///
/// `id` scopes every "my data" query; it is also the document id of the
/// account's profile in `service-providers`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub key: String,
    pub password: String,
}

impl Identity {
    pub fn new(
        id: impl Into<String>,
        key: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            password: password.into(),
        }
    }

    /// Key with everything but the first and last four characters hidden.
    pub fn masked_key(&self) -> String {
        if self.key.chars().count() > 8 {
            let head: String = self.key.chars().take(4).collect();
            let tail: String = self
                .key
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("{}...{}", head, tail)
        } else {
            "****".to_string()
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("key", &self.masked_key())
            .field("password", &"****")
            .finish()
    }
}
