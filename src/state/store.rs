use std::sync::Arc;
use tokio::sync::watch;

use super::{reducers, Action, AppState};

/// Holds the current [`AppState`] and applies dispatched actions.
///
/// Subscribers are notified only when a dispatch actually changed a slice.
#[derive(Debug)]
pub struct Store {
    tx: watch::Sender<AppState>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::with_state(AppState::default())
    }

    pub fn with_state(state: AppState) -> Self {
        let (tx, _) = watch::channel(state);
        Self { tx }
    }

    /// Snapshot of the current state. Cheap: slices are shared.
    pub fn state(&self) -> AppState {
        self.tx.borrow().clone()
    }

    /// Runs the root reducer and returns the resulting state.
    pub fn dispatch(&self, action: Action) -> AppState {
        let kind = action.kind();
        let changed = self.tx.send_if_modified(|state| {
            let next = reducers::reduce(state, &action);
            let changed = !next.shares_all(state);
            *state = next;
            changed
        });
        tracing::debug!(action = kind, changed, "dispatch");
        self.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.tx.subscribe()
    }
}

impl AppState {
    /// True when every slice is the very same allocation as in `other`.
    fn shares_all(&self, other: &AppState) -> bool {
        Arc::ptr_eq(&self.auth, &other.auth)
            && Arc::ptr_eq(&self.appointments, &other.appointments)
            && Arc::ptr_eq(&self.service_providers, &other.service_providers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserProfile;

    #[test]
    fn test_dispatch_returns_new_state() {
        let store = Store::new();
        let state = store.dispatch(Action::Login {
            user: UserProfile::new("u1"),
        });

        assert!(state.auth.is_logged_in);
        assert!(store.state().auth.is_logged_in);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let store = Store::new();
        let mut rx = store.subscribe();

        store.dispatch(Action::AddServiceProvider(UserProfile::new("u1")));

        assert!(rx.has_changed().unwrap());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().service_providers.len(), 1);
    }

    #[test]
    fn test_noop_dispatch_does_not_notify() {
        let store = Store::new();
        let rx = store.subscribe();

        store.dispatch(Action::LoggedOut);
        store.dispatch(Action::DeleteAppointment("missing".to_string()));

        assert!(!rx.has_changed().unwrap());
    }
}
