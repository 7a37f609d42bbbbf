mod appointment;
mod identity;
mod profile;
mod record;

pub use appointment::Appointment;
pub use identity::Identity;
pub use profile::{Service, UserProfile, ValidationError};
pub use record::{fields_from_value, merge_top_level, Fields, Record};

/// Anything kept in a list slice and addressed by its document id.
pub trait Entity: Clone {
    fn id(&self) -> &str;
}
