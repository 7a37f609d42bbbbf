//! Pure reducers.
//!
//! Every slice lives behind an `Arc`. A reducer that leaves its slice alone
//! hands back the same `Arc`, so unrelated parts of the tree are shared
//! between the old and new state.

use std::sync::Arc;

use super::{Action, AppState, AuthState};
use crate::models::{Appointment, Entity, UserProfile};

/// Root reducer: applies `action` to every slice.
pub fn reduce(state: &AppState, action: &Action) -> AppState {
    AppState {
        auth: auth(&state.auth, action),
        appointments: appointments(&state.appointments, action),
        service_providers: service_providers(&state.service_providers, action),
    }
}

pub fn auth(state: &Arc<AuthState>, action: &Action) -> Arc<AuthState> {
    match action {
        Action::Login { user } => Arc::new(AuthState {
            is_logged_in: true,
            user: Some(user.clone()),
            user_profile: state.user_profile.clone(),
        }),
        Action::SetUserProfile(profile) => Arc::new(AuthState {
            user_profile: Some(profile.clone()),
            ..(**state).clone()
        }),
        Action::LoggedOut => {
            if **state == AuthState::default() {
                Arc::clone(state)
            } else {
                Arc::new(AuthState::default())
            }
        }
        _ => Arc::clone(state),
    }
}

pub fn appointments(state: &Arc<Vec<Appointment>>, action: &Action) -> Arc<Vec<Appointment>> {
    let change = match action {
        Action::AppointmentsFetchSuccess(items) => ListChange::Replace(items),
        Action::AddAppointment(item) => ListChange::Add(item),
        Action::EditAppointment(item) => ListChange::Edit(item),
        Action::DeleteAppointment(id) => ListChange::Delete(id),
        _ => return Arc::clone(state),
    };
    apply(state, change)
}

pub fn service_providers(
    state: &Arc<Vec<UserProfile>>,
    action: &Action,
) -> Arc<Vec<UserProfile>> {
    let change = match action {
        Action::ServiceProvidersFetchSuccess(items) => ListChange::Replace(items),
        Action::AddServiceProvider(item) => ListChange::Add(item),
        Action::EditServiceProvider(item) => ListChange::Edit(item),
        Action::DeleteServiceProvider(id) => ListChange::Delete(id),
        _ => return Arc::clone(state),
    };
    apply(state, change)
}

enum ListChange<'a, T> {
    Replace(&'a [T]),
    Add(&'a T),
    Edit(&'a T),
    Delete(&'a str),
}

fn apply<T: Entity>(state: &Arc<Vec<T>>, change: ListChange<'_, T>) -> Arc<Vec<T>> {
    match change {
        ListChange::Replace(items) => Arc::new(items.to_vec()),
        ListChange::Add(item) => {
            let mut items = (**state).clone();
            items.push(item.clone());
            Arc::new(items)
        }
        ListChange::Edit(item) => match state.iter().position(|e| e.id() == item.id()) {
            Some(index) => {
                let mut items = (**state).clone();
                items[index] = item.clone();
                Arc::new(items)
            }
            None => Arc::clone(state),
        },
        ListChange::Delete(id) => match state.iter().position(|e| e.id() == id) {
            Some(index) => {
                let mut items = (**state).clone();
                items.remove(index);
                Arc::new(items)
            }
            None => Arc::clone(state),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Fields, Service};

    fn appointment(id: &str, title: &str) -> Appointment {
        Appointment {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            service_provider: Some("u1".to_string()),
            extra: Fields::new(),
        }
    }

    fn with_appointments(items: Vec<Appointment>) -> AppState {
        reduce(&AppState::default(), &Action::AppointmentsFetchSuccess(items))
    }

    fn titles(state: &AppState) -> Vec<&str> {
        state.appointments.iter().map(|a| a.title.as_str()).collect()
    }

    #[test]
    fn test_fetch_success_replaces_list() {
        let state = with_appointments(vec![appointment("a", "A")]);
        let state = reduce(
            &state,
            &Action::AppointmentsFetchSuccess(vec![appointment("b", "B"), appointment("c", "C")]),
        );

        assert_eq!(titles(&state), vec!["B", "C"]);
    }

    #[test]
    fn test_add_appends() {
        let state = with_appointments(vec![appointment("a", "A")]);
        let state = reduce(&state, &Action::AddAppointment(appointment("b", "B")));

        assert_eq!(titles(&state), vec!["A", "B"]);
    }

    #[test]
    fn test_edit_replaces_matching_in_place() {
        let state = with_appointments(vec![
            appointment("a", "A"),
            appointment("b", "B"),
            appointment("c", "C"),
        ]);
        let state = reduce(&state, &Action::EditAppointment(appointment("b", "B2")));

        assert_eq!(titles(&state), vec!["A", "B2", "C"]);
    }

    #[test]
    fn test_edit_unknown_id_leaves_list_unchanged() {
        let before = with_appointments(vec![appointment("a", "A")]);
        let after = reduce(&before, &Action::EditAppointment(appointment("zzz", "Z")));

        assert_eq!(titles(&after), vec!["A"]);
        assert!(Arc::ptr_eq(&before.appointments, &after.appointments));
    }

    #[test]
    fn test_delete_removes_exactly_one_and_keeps_order() {
        let state = with_appointments(vec![
            appointment("a", "A"),
            appointment("b", "B"),
            appointment("c", "C"),
            appointment("d", "D"),
        ]);
        let state = reduce(&state, &Action::DeleteAppointment("b".to_string()));

        assert_eq!(titles(&state), vec!["A", "C", "D"]);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let before = with_appointments(vec![appointment("a", "A")]);
        let after = reduce(&before, &Action::DeleteAppointment("zzz".to_string()));

        assert!(Arc::ptr_eq(&before.appointments, &after.appointments));
    }

    #[test]
    fn test_reducers_do_not_mutate_previous_state() {
        let before = with_appointments(vec![appointment("a", "A")]);
        let after = reduce(&before, &Action::DeleteAppointment("a".to_string()));

        assert_eq!(titles(&before), vec!["A"]);
        assert!(after.appointments.is_empty());
    }

    #[test]
    fn test_unrelated_slices_are_shared() {
        let before = with_appointments(vec![appointment("a", "A")]);
        let after = reduce(&before, &Action::AddServiceProvider(UserProfile::new("u1")));

        assert!(Arc::ptr_eq(&before.appointments, &after.appointments));
        assert!(Arc::ptr_eq(&before.auth, &after.auth));
        assert_eq!(after.service_providers.len(), 1);
    }

    #[test]
    fn test_service_provider_list_actions() {
        let state = reduce(
            &AppState::default(),
            &Action::ServiceProvidersFetchSuccess(vec![UserProfile::new("u1"), UserProfile::new("u2")]),
        );
        let edited = UserProfile::new("u2").with_service(Service::new("Nails", "Gel", 30.0));
        let state = reduce(&state, &Action::EditServiceProvider(edited.clone()));
        let state = reduce(&state, &Action::DeleteServiceProvider("u1".to_string()));

        assert_eq!(*state.service_providers, vec![edited]);
    }

    #[test]
    fn test_login_and_user_profile() {
        let user = UserProfile::new("u1");
        let state = reduce(&AppState::default(), &Action::Login { user: user.clone() });

        assert!(state.auth.is_logged_in);
        assert_eq!(state.auth.user, Some(user.clone()));
        assert_eq!(state.auth.user_profile, None);

        let profile = user.with_service(Service::new("Haircut", "Short", 20.0));
        let state = reduce(&state, &Action::SetUserProfile(profile.clone()));

        assert!(state.auth.is_logged_in);
        assert_eq!(state.auth.user_profile, Some(profile));
    }

    #[test]
    fn test_logout_clears_auth() {
        let state = reduce(
            &AppState::default(),
            &Action::Login {
                user: UserProfile::new("u1"),
            },
        );
        let state = reduce(&state, &Action::SetUserProfile(UserProfile::new("u1")));

        let state = reduce(&state, &Action::LoggedOut);

        assert!(!state.auth.is_logged_in);
        assert_eq!(state.auth.user, None);
        assert_eq!(state.auth.user_profile, None);
    }

    #[test]
    fn test_logout_is_idempotent() {
        let once = reduce(&AppState::default(), &Action::LoggedOut);
        let twice = reduce(&once, &Action::LoggedOut);

        assert_eq!(*once.auth, AuthState::default());
        assert!(Arc::ptr_eq(&once.auth, &twice.auth));
    }
}
