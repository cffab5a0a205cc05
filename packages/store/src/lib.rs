pub mod applications;
pub mod calendar;
pub mod config;
pub mod error;
pub mod events;
pub mod feedback;
pub mod models;
pub mod query;
pub mod realtime;
pub mod repo;

mod memory;
pub use memory::MemoryStore;

pub use config::AlumniConfig;
pub use error::{FieldError, StoreError};
pub use models::{
    ApplicationStatus, AttendanceStatus, Attendee, Event, EventDraft, EventFeedback,
    FeedbackDraft, JobApplication, JobPosting, Profile, Recommendation, ResumeSource, Rsvp,
    SavedResume,
};
pub use query::{Filter, Order, Query};
pub use repo::{Actor, FeedbackDashboard, JobApplications, Repository, TableStore};
