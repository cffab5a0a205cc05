mod login;
pub use login::Login;

mod register;
pub use register::Register;

mod events;
pub use events::{
    EventCalendar, EventCreate, EventDetail, EventEdit, EventFeedback, EventFeedbackDashboard,
    EventsList,
};

mod jobs;
pub use jobs::{ApplicationTracking, JobApply, ManageJobApplications};

/// Send a signed-in visitor away from the auth pages.
pub(crate) fn redirect_if_signed_in(state: &ui::AuthState) {
    if !state.loading && state.user.is_some() {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(window) = web_sys::window() {
                let _ = window.location().set_href("/events");
            }
        }
    }
}
