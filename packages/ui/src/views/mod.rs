mod modal_overlay;
pub use modal_overlay::{ConfirmDialog, ModalOverlay};

pub(crate) mod events_list;
pub use events_list::EventsListView;

mod event_detail;
pub use event_detail::EventDetailView;

mod event_form;
pub use event_form::EventFormView;

mod event_calendar;
pub use event_calendar::EventCalendarView;

mod event_feedback;
pub use event_feedback::EventFeedbackView;

mod feedback_dashboard;
pub use feedback_dashboard::FeedbackDashboardView;

pub(crate) mod application_tracking;
pub use application_tracking::ApplicationTrackingView;

mod manage_applications;
pub use manage_applications::ManageApplicationsView;

mod job_apply;
pub use job_apply::JobApplyView;
