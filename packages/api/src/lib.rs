//! # API crate: shared fullstack server functions for the alumni portal
//!
//! This crate defines every Dioxus server function the web frontend calls,
//! along with the modules they depend on. Server bodies run on the axum
//! server, talk to the hosted backend through [`backend::HostedStore`] and
//! apply the domain rules in [`store::Repository`].
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`auth`] | `server` | Token exchange with the hosted auth service, session data and refresh |
//! | [`backend`] | partly `server` | REST encoding, connection config, `HostedStore`, `BackendError` |
//! | [`db`] | `server` | PostgreSQL pool backing the session store |
//! | [`models`] | - | Client-safe [`UserInfo`] |
//!
//! ## Server functions exposed here
//!
//! Every public `async fn` in this file is a Dioxus server function, annotated with
//! `#[get(...)]` or `#[post(...)]` and compiled twice: once with full server logic
//! (behind `#[cfg(feature = "server")]`) and once as a thin client stub.
//!
//! - **Authentication**: `get_current_user`, `login_password`, `register`, `logout`, `get_realtime_config`
//! - **Events**: `list_events`, `list_month_events`, `get_event`, `create_event`, `update_event`,
//!   `upload_event_image`, `delete_event`
//! - **RSVP**: `list_attendees`, `get_my_rsvp`, `rsvp_event`
//! - **Feedback**: `get_my_feedback`, `submit_feedback`, `get_feedback_dashboard`
//! - **Jobs**: `get_job`, `list_my_resumes`, `has_applied`, `apply_to_job`, `list_my_applications`,
//!   `list_job_applications`, `update_application_status`
//!
//! Reads work signed out (the backend's row-level security decides what an
//! anonymous caller sees); writes require a session.

use dioxus::prelude::*;
use serde::{Deserialize, Serialize};

pub mod auth;
pub mod backend;
pub mod db;
pub mod models;

pub use models::UserInfo;
pub use store::{
    events::EventListFilter, AlumniConfig, ApplicationStatus, AttendanceStatus, Attendee, Event,
    EventDraft, EventFeedback, FeedbackDashboard, FeedbackDraft, JobApplication, JobApplications,
    JobPosting, ResumeSource, Rsvp, SavedResume,
};

/// What the browser needs to open the realtime socket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RealtimeSettings {
    pub socket_url: String,
    pub access_token: String,
    pub heartbeat_secs: u32,
}

#[cfg(feature = "server")]
fn repository(
    data: Option<&auth::SessionData>,
) -> Result<store::Repository<backend::HostedStore>, ServerFnError> {
    let config =
        backend::BackendConfig::from_env().map_err(|e| ServerFnError::new(e.to_string()))?;
    let store = backend::HostedStore::new(config, data.map(|d| d.access_token.clone()));
    Ok(store::Repository::with_config(
        store,
        backend::app_config().clone(),
    ))
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// Get the current authenticated user from the session.
#[cfg(feature = "server")]
#[get("/api/auth/me", session: tower_sessions::Session)]
pub async fn get_current_user() -> Result<Option<UserInfo>, ServerFnError> {
    let data = auth::current_session(&session).await?;
    Ok(data.map(|d| d.to_info()))
}

#[cfg(not(feature = "server"))]
#[get("/api/auth/me")]
pub async fn get_current_user() -> Result<Option<UserInfo>, ServerFnError> {
    Ok(None)
}

/// Log in with email and password.
#[cfg(feature = "server")]
#[post("/api/auth/login", session: tower_sessions::Session)]
pub async fn login_password(email: String, password: String) -> Result<UserInfo, ServerFnError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || password.is_empty() {
        return Err(ServerFnError::new("Email and password are required"));
    }

    let config =
        backend::BackendConfig::from_env().map_err(|e| ServerFnError::new(e.to_string()))?;
    let tokens = auth::tokens::password_grant(&config, &email, &password)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    start_session(&session, tokens).await
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/login")]
pub async fn login_password(email: String, password: String) -> Result<UserInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Register a new user with email and password.
#[cfg(feature = "server")]
#[post("/api/auth/register", session: tower_sessions::Session)]
pub async fn register(
    email: String,
    password: String,
    full_name: String,
) -> Result<UserInfo, ServerFnError> {
    let email = email.trim().to_lowercase();
    let full_name = full_name.trim().to_string();

    if email.is_empty() || !email.contains('@') {
        return Err(ServerFnError::new("Invalid email address"));
    }
    auth::check_password(&password).map_err(ServerFnError::new)?;
    if full_name.is_empty() {
        return Err(ServerFnError::new("Name is required"));
    }

    let config =
        backend::BackendConfig::from_env().map_err(|e| ServerFnError::new(e.to_string()))?;
    let tokens = auth::tokens::sign_up(&config, &email, &password, &full_name)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let Some(tokens) = tokens else {
        return Err(ServerFnError::new(
            "Check your email to confirm your account, then sign in",
        ));
    };

    start_session(&session, tokens).await
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/register")]
pub async fn register(
    email: String,
    password: String,
    full_name: String,
) -> Result<UserInfo, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
async fn start_session(
    session: &tower_sessions::Session,
    tokens: auth::tokens::TokenResponse,
) -> Result<UserInfo, ServerFnError> {
    let config =
        backend::BackendConfig::from_env().map_err(|e| ServerFnError::new(e.to_string()))?;
    let user_id = tokens.user.id.clone();
    let repo = store::Repository::new(backend::HostedStore::new(
        config,
        Some(tokens.access_token.clone()),
    ));
    let profile = repo
        .get_profile(&user_id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    let data = auth::SessionData::from_tokens(tokens, profile, chrono::Utc::now().timestamp());
    auth::save_session(session, &data).await?;
    tracing::info!("User {} signed in", data.user_id);
    Ok(data.to_info())
}

/// Log out: revoke the token with the backend (best effort), then clear the session.
#[cfg(feature = "server")]
#[post("/api/auth/logout", session: tower_sessions::Session)]
pub async fn logout() -> Result<(), ServerFnError> {
    if let Some(data) = auth::load_session(&session).await? {
        match backend::BackendConfig::from_env() {
            Ok(config) => {
                if let Err(e) = auth::tokens::sign_out(&config, &data.access_token).await {
                    tracing::warn!("Backend logout failed: {}", e);
                }
            }
            Err(e) => tracing::warn!("Backend logout skipped: {}", e),
        }
    }

    session
        .flush()
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;

    Ok(())
}

#[cfg(not(feature = "server"))]
#[post("/api/auth/logout")]
pub async fn logout() -> Result<(), ServerFnError> {
    Ok(())
}

/// Socket settings for change notifications; `None` when signed out.
#[cfg(feature = "server")]
#[get("/api/realtime/config", session: tower_sessions::Session)]
pub async fn get_realtime_config() -> Result<Option<RealtimeSettings>, ServerFnError> {
    let Some(data) = auth::current_session(&session).await? else {
        return Ok(None);
    };
    let config =
        backend::BackendConfig::from_env().map_err(|e| ServerFnError::new(e.to_string()))?;
    Ok(Some(RealtimeSettings {
        socket_url: store::realtime::socket_url(&config.url, &config.anon_key),
        access_token: data.access_token,
        heartbeat_secs: backend::app_config().realtime.heartbeat_secs,
    }))
}

#[cfg(not(feature = "server"))]
#[get("/api/realtime/config")]
pub async fn get_realtime_config() -> Result<Option<RealtimeSettings>, ServerFnError> {
    Ok(None)
}

/// The portal's display settings (timezone, preview length).
#[cfg(feature = "server")]
#[get("/api/config")]
pub async fn get_app_config() -> Result<AlumniConfig, ServerFnError> {
    Ok(backend::app_config().clone())
}

#[cfg(not(feature = "server"))]
#[get("/api/config")]
pub async fn get_app_config() -> Result<AlumniConfig, ServerFnError> {
    Ok(AlumniConfig::default())
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Events matching the list filters, ordered by start date.
#[cfg(feature = "server")]
#[post("/api/events/list", session: tower_sessions::Session)]
pub async fn list_events(filter: EventListFilter) -> Result<Vec<Event>, ServerFnError> {
    let data = auth::current_session(&session).await?;
    repository(data.as_ref())?
        .list_events(&filter, chrono::Utc::now())
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[post("/api/events/list")]
pub async fn list_events(filter: EventListFilter) -> Result<Vec<Event>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Events shown on one calendar month, filtered by category chip.
#[cfg(feature = "server")]
#[post("/api/events/month", session: tower_sessions::Session)]
pub async fn list_month_events(
    year: i32,
    month: u32,
    category: String,
) -> Result<Vec<Event>, ServerFnError> {
    use store::calendar::{CategoryFilter, MonthCursor};

    let cursor = MonthCursor::new(year, month).map_err(|e| ServerFnError::new(e.to_string()))?;
    let data = auth::current_session(&session).await?;
    repository(data.as_ref())?
        .month_events(cursor, &CategoryFilter::parse(&category))
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[post("/api/events/month")]
pub async fn list_month_events(
    year: i32,
    month: u32,
    category: String,
) -> Result<Vec<Event>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[get("/api/events/:id", session: tower_sessions::Session)]
pub async fn get_event(id: String) -> Result<Event, ServerFnError> {
    let data = auth::current_session(&session).await?;
    repository(data.as_ref())?
        .get_event(&id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[get("/api/events/:id")]
pub async fn get_event(id: String) -> Result<Event, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/events/create", session: tower_sessions::Session)]
pub async fn create_event(draft: EventDraft) -> Result<Event, ServerFnError> {
    let data = auth::require_session(&session).await?;
    let event = repository(Some(&data))?
        .create_event(&data.actor(), &draft, chrono::Utc::now())
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;
    tracing::info!("Event {} created by {}", event.id, data.user_id);
    Ok(event)
}

#[cfg(not(feature = "server"))]
#[post("/api/events/create")]
pub async fn create_event(draft: EventDraft) -> Result<Event, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/events/update", session: tower_sessions::Session)]
pub async fn update_event(id: String, draft: EventDraft) -> Result<Event, ServerFnError> {
    let data = auth::require_session(&session).await?;
    repository(Some(&data))?
        .update_event(&data.actor(), &id, &draft, chrono::Utc::now())
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[post("/api/events/update")]
pub async fn update_event(id: String, draft: EventDraft) -> Result<Event, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Upload a cover image and point the event at it.
#[cfg(feature = "server")]
#[post("/api/events/image", session: tower_sessions::Session)]
pub async fn upload_event_image(
    id: String,
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
) -> Result<Event, ServerFnError> {
    let data = auth::require_session(&session).await?;
    repository(Some(&data))?
        .set_event_image(
            &data.actor(),
            &id,
            &file_name,
            &content_type,
            bytes,
            chrono::Utc::now(),
        )
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[post("/api/events/image")]
pub async fn upload_event_image(
    id: String,
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
) -> Result<Event, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/events/delete", session: tower_sessions::Session)]
pub async fn delete_event(id: String) -> Result<(), ServerFnError> {
    let data = auth::require_session(&session).await?;
    repository(Some(&data))?
        .delete_event(&data.actor(), &id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;
    tracing::info!("Event {} deleted by {}", id, data.user_id);
    Ok(())
}

#[cfg(not(feature = "server"))]
#[post("/api/events/delete")]
pub async fn delete_event(id: String) -> Result<(), ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

// ---------------------------------------------------------------------------
// RSVP
// ---------------------------------------------------------------------------

#[cfg(feature = "server")]
#[get("/api/events/:id/attendees", session: tower_sessions::Session)]
pub async fn list_attendees(id: String) -> Result<Vec<Attendee>, ServerFnError> {
    let data = auth::current_session(&session).await?;
    repository(data.as_ref())?
        .attendees(&id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[get("/api/events/:id/attendees")]
pub async fn list_attendees(id: String) -> Result<Vec<Attendee>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// The caller's RSVP for an event; `None` when signed out or not answered.
#[cfg(feature = "server")]
#[get("/api/events/:id/rsvp", session: tower_sessions::Session)]
pub async fn get_my_rsvp(id: String) -> Result<Option<Rsvp>, ServerFnError> {
    let Some(data) = auth::current_session(&session).await? else {
        return Ok(None);
    };
    repository(Some(&data))?
        .my_rsvp(&id, &data.user_id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[get("/api/events/:id/rsvp")]
pub async fn get_my_rsvp(id: String) -> Result<Option<Rsvp>, ServerFnError> {
    Ok(None)
}

#[cfg(feature = "server")]
#[post("/api/events/rsvp", session: tower_sessions::Session)]
pub async fn rsvp_event(id: String, status: AttendanceStatus) -> Result<Rsvp, ServerFnError> {
    let data = auth::require_session(&session).await?;
    repository(Some(&data))?
        .rsvp(&data.actor(), &id, status, chrono::Utc::now())
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[post("/api/events/rsvp")]
pub async fn rsvp_event(id: String, status: AttendanceStatus) -> Result<Rsvp, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

#[cfg(feature = "server")]
#[get("/api/events/:event_id/feedback/mine", session: tower_sessions::Session)]
pub async fn get_my_feedback(event_id: String) -> Result<Option<EventFeedback>, ServerFnError> {
    let data = auth::require_session(&session).await?;
    repository(Some(&data))?
        .my_feedback(&event_id, &data.user_id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[get("/api/events/:event_id/feedback/mine")]
pub async fn get_my_feedback(event_id: String) -> Result<Option<EventFeedback>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/events/feedback", session: tower_sessions::Session)]
pub async fn submit_feedback(
    event_id: String,
    draft: FeedbackDraft,
) -> Result<EventFeedback, ServerFnError> {
    let data = auth::require_session(&session).await?;
    repository(Some(&data))?
        .submit_feedback(&data.actor(), &event_id, &draft, chrono::Utc::now())
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[post("/api/events/feedback")]
pub async fn submit_feedback(
    event_id: String,
    draft: FeedbackDraft,
) -> Result<EventFeedback, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[get("/api/events/:event_id/feedback/dashboard", session: tower_sessions::Session)]
pub async fn get_feedback_dashboard(event_id: String) -> Result<FeedbackDashboard, ServerFnError> {
    let data = auth::require_session(&session).await?;
    repository(Some(&data))?
        .feedback_dashboard(&data.actor(), &event_id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[get("/api/events/:event_id/feedback/dashboard")]
pub async fn get_feedback_dashboard(event_id: String) -> Result<FeedbackDashboard, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

#[cfg(feature = "server")]
#[get("/api/jobs/:job_id", session: tower_sessions::Session)]
pub async fn get_job(job_id: String) -> Result<JobPosting, ServerFnError> {
    let data = auth::current_session(&session).await?;
    repository(data.as_ref())?
        .get_job(&job_id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[get("/api/jobs/:job_id")]
pub async fn get_job(job_id: String) -> Result<JobPosting, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[get("/api/resumes", session: tower_sessions::Session)]
pub async fn list_my_resumes() -> Result<Vec<SavedResume>, ServerFnError> {
    let data = auth::require_session(&session).await?;
    repository(Some(&data))?
        .my_resumes(&data.user_id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[get("/api/resumes")]
pub async fn list_my_resumes() -> Result<Vec<SavedResume>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[get("/api/jobs/:job_id/applied", session: tower_sessions::Session)]
pub async fn has_applied(job_id: String) -> Result<bool, ServerFnError> {
    let data = auth::require_session(&session).await?;
    repository(Some(&data))?
        .has_applied(&job_id, &data.user_id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[get("/api/jobs/:job_id/applied")]
pub async fn has_applied(job_id: String) -> Result<bool, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/jobs/apply", session: tower_sessions::Session)]
pub async fn apply_to_job(
    job_id: String,
    cover_letter: String,
    resume: ResumeSource,
) -> Result<JobApplication, ServerFnError> {
    let data = auth::require_session(&session).await?;
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    let application = repository(Some(&data))?
        .apply_to_job(
            &data.actor(),
            &job_id,
            &cover_letter,
            resume,
            chrono::Utc::now(),
            &nonce[..10],
        )
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;
    tracing::info!("User {} applied to job {}", data.user_id, job_id);
    Ok(application)
}

#[cfg(not(feature = "server"))]
#[post("/api/jobs/apply")]
pub async fn apply_to_job(
    job_id: String,
    cover_letter: String,
    resume: ResumeSource,
) -> Result<JobApplication, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[get("/api/applications/mine", session: tower_sessions::Session)]
pub async fn list_my_applications() -> Result<Vec<JobApplication>, ServerFnError> {
    let data = auth::require_session(&session).await?;
    repository(Some(&data))?
        .my_applications(&data.user_id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[get("/api/applications/mine")]
pub async fn list_my_applications() -> Result<Vec<JobApplication>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[get("/api/jobs/:job_id/applications", session: tower_sessions::Session)]
pub async fn list_job_applications(job_id: String) -> Result<JobApplications, ServerFnError> {
    let data = auth::require_session(&session).await?;
    repository(Some(&data))?
        .job_applications(&data.actor(), &job_id)
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[get("/api/jobs/:job_id/applications")]
pub async fn list_job_applications(job_id: String) -> Result<JobApplications, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

#[cfg(feature = "server")]
#[post("/api/applications/status", session: tower_sessions::Session)]
pub async fn update_application_status(
    application_id: String,
    status: ApplicationStatus,
) -> Result<JobApplication, ServerFnError> {
    let data = auth::require_session(&session).await?;
    let updated = repository(Some(&data))?
        .update_application_status(&data.actor(), &application_id, status, chrono::Utc::now())
        .await
        .map_err(|e| ServerFnError::new(e.to_string()))?;
    tracing::info!(
        "Application {} set to {} by {}",
        application_id,
        status.as_str(),
        data.user_id
    );
    Ok(updated)
}

#[cfg(not(feature = "server"))]
#[post("/api/applications/status")]
pub async fn update_application_status(
    application_id: String,
    status: ApplicationStatus,
) -> Result<JobApplication, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}
