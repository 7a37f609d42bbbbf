//! Application state: plain actions, pure reducers and the state container.

mod action;
pub mod reducers;
mod store;

pub use action::Action;
pub use store::Store;

use std::sync::Arc;

use crate::models::{Appointment, UserProfile};

/// Authentication slice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub is_logged_in: bool,
    pub user: Option<UserProfile>,
    pub user_profile: Option<UserProfile>,
}

/// The whole state tree.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub auth: Arc<AuthState>,
    pub appointments: Arc<Vec<Appointment>>,
    pub service_providers: Arc<Vec<UserProfile>>,
}

impl AppState {
    /// The profile edits should start from: `user_profile`, else `user`.
    pub fn current_profile(&self) -> Option<&UserProfile> {
        self.auth
            .user_profile
            .as_ref()
            .or(self.auth.user.as_ref())
    }
}
