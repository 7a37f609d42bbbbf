use crate::models::{Appointment, UserProfile};

/// Plain, synchronous state transitions. Produced by thunks after their
/// remote I/O has succeeded; consumed by the pure reducers.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Login { user: UserProfile },
    LoggedOut,
    SetUserProfile(UserProfile),

    AppointmentsFetchSuccess(Vec<Appointment>),
    AddAppointment(Appointment),
    EditAppointment(Appointment),
    DeleteAppointment(String),

    ServiceProvidersFetchSuccess(Vec<UserProfile>),
    AddServiceProvider(UserProfile),
    EditServiceProvider(UserProfile),
    DeleteServiceProvider(String),
}

impl Action {
    /// Stable name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Login { .. } => "LOGIN",
            Action::LoggedOut => "LOGGED_OUT",
            Action::SetUserProfile(_) => "USER_PROFILE",
            Action::AppointmentsFetchSuccess(_) => "APPOINTMENTS_FETCH_SUCCESS",
            Action::AddAppointment(_) => "ADD_APPOINTMENT",
            Action::EditAppointment(_) => "EDIT_APPOINTMENT",
            Action::DeleteAppointment(_) => "DELETE_APPOINTMENT",
            Action::ServiceProvidersFetchSuccess(_) => "SERVICE_PROVIDERS_FETCH_SUCCESS",
            Action::AddServiceProvider(_) => "ADD_SERVICE_PROVIDER",
            Action::EditServiceProvider(_) => "EDIT_SERVICE_PROVIDER",
            Action::DeleteServiceProvider(_) => "DELETE_SERVICE_PROVIDER",
        }
    }
}
