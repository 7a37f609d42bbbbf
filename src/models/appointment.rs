use serde::{Deserialize, Serialize};
use std::fmt;

use super::record::{Fields, Record};
use super::Entity;

/// A booked appointment. `service_provider` references a `UserProfile` id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_provider: Option<String>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Appointment {
    /// True when the appointment is booked with the given provider.
    pub fn is_for_provider(&self, provider_id: &str) -> bool {
        self.service_provider.as_deref() == Some(provider_id)
    }
}

impl Entity for Appointment {
    fn id(&self) -> &str {
        &self.id
    }
}

impl TryFrom<Record> for Appointment {
    type Error = serde_json::Error;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        serde_json::from_value(record.into_value())
    }
}

impl fmt::Display for Appointment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = if self.title.is_empty() {
            "(untitled)"
        } else {
            self.title.as_str()
        };
        write!(f, "{}  [{}]", title, self.id)?;
        if !self.description.is_empty() {
            write!(f, "\n    {}", self.description)?;
        }
        Ok(())
    }
}
