//! # Repository: domain operations on an abstract table store
//!
//! [`Repository`] is the data-access layer of the portal. It turns the
//! operations the pages need (list events, RSVP, submit feedback, apply to a
//! job, ...) into a handful of row-level calls on a [`TableStore`], decodes
//! the rows into [`crate::models`] types and enforces the access rules the
//! UI relies on. The same logic runs against the hosted backend (the `api`
//! crate's REST client) and against [`crate::MemoryStore`] in tests.
//!
//! ## [`TableStore`] trait
//!
//! Six async methods: `select`/`insert`/`update`/`upsert`/`delete` on JSON
//! rows addressed by table name and [`Filter`]s, and `upload` for object
//! storage (returns the public URL). Embedded joins are not part of the
//! trait; the repository fetches related rows with a second `in` query.
//!
//! ## Events
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`list_events`](Repository::list_events) | Status/type filter on the server, text search after the fetch. |
//! | [`month_events`](Repository::month_events) | Events overlapping a calendar month grid, category-filtered. |
//! | [`get_event`](Repository::get_event) | One event, `NotFound` when missing. |
//! | [`create_event`](Repository::create_event) / [`update_event`](Repository::update_event) | Validate an [`EventDraft`] and write it. |
//! | [`delete_event`](Repository::delete_event) | Admins and the organiser only. |
//! | [`set_event_image`](Repository::set_event_image) | Upload a cover image and store its public URL. |
//!
//! ## RSVPs and feedback
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`attendees`](Repository::attendees) | "Going" RSVPs joined with profiles. |
//! | [`rsvp`](Repository::rsvp) | Upsert on `(event_id, attendee_id)`; refused after the event or when full. |
//! | [`submit_feedback`](Repository::submit_feedback) | One row per user per event, only once the event started. |
//! | [`feedback_dashboard`](Repository::feedback_dashboard) | Feedback, stats and access check for organisers/admins. |
//!
//! ## Job applications
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`apply_to_job`](Repository::apply_to_job) | Resolve or upload the resume, refuse duplicates, insert as `submitted`. |
//! | [`my_applications`](Repository::my_applications) | The caller's applications joined with their jobs. |
//! | [`job_applications`](Repository::job_applications) | Applications for a posting, owner/admin only. |
//! | [`update_application_status`](Repository::update_application_status) | Owner/admin, or the applicant withdrawing. |
//!
//! Every method that depends on the current time takes `now` explicitly.

use std::collections::HashMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::applications::{event_image_path, resume_upload_path};
use crate::calendar::{CategoryFilter, MonthCursor};
use crate::config::AlumniConfig;
use crate::error::StoreError;
use crate::events::EventListFilter;
use crate::feedback::{FeedbackStats, DASHBOARD_FORBIDDEN};
use crate::models::{
    ApplicationStatus, AttendanceStatus, Attendee, Event, EventDraft, EventFeedback,
    FeedbackDraft, JobApplication, JobPosting, Profile, ResumeSource, Rsvp, SavedResume,
};
use crate::query::{Filter, Query};

/// Async row storage with the semantics of the hosted REST layer.
pub trait TableStore {
    fn select(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<Vec<Value>, StoreError>> + Send;
    /// Insert one row and return it as stored (with generated columns).
    fn insert(
        &self,
        table: &str,
        row: Value,
    ) -> impl Future<Output = Result<Value, StoreError>> + Send;
    /// Merge `patch` into every matching row and return the updated rows.
    fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> impl Future<Output = Result<Vec<Value>, StoreError>> + Send;
    /// Insert, or merge into the row that agrees on every `on_conflict` column.
    fn upsert(
        &self,
        table: &str,
        row: Value,
        on_conflict: &[&str],
    ) -> impl Future<Output = Result<Value, StoreError>> + Send;
    /// Delete matching rows, returning how many went away.
    fn delete(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> impl Future<Output = Result<usize, StoreError>> + Send;
    /// Store an object and return its public URL.
    fn upload(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;
}

/// The signed-in user performing an operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub is_admin: bool,
}

impl Actor {
    pub fn new(user_id: &str, is_admin: bool) -> Self {
        Self {
            user_id: user_id.to_string(),
            is_admin,
        }
    }

    pub fn can_manage_event(&self, event: &Event) -> bool {
        self.is_admin || event.is_organized_by(&self.user_id)
    }

    pub fn can_manage_job(&self, job: &JobPosting) -> bool {
        self.is_admin || job.is_owned_by(&self.user_id)
    }
}

/// Everything the feedback dashboard renders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedbackDashboard {
    pub event: Event,
    pub feedback: Vec<EventFeedback>,
    pub stats: FeedbackStats,
}

/// Applications received for one posting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobApplications {
    pub job: JobPosting,
    pub applications: Vec<JobApplication>,
}

pub struct Repository<S: TableStore> {
    store: S,
    config: AlumniConfig,
}

impl<S: TableStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, AlumniConfig::default())
    }

    pub fn with_config(store: S, config: AlumniConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &AlumniConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ---- events ----

    pub async fn list_events(
        &self,
        filter: &EventListFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, StoreError> {
        let query = filter.to_query(now, self.config.offset());
        let events: Vec<Event> = self.fetch(&query).await?;
        Ok(filter.apply_search(events))
    }

    pub async fn month_events(
        &self,
        cursor: MonthCursor,
        category: &CategoryFilter,
    ) -> Result<Vec<Event>, StoreError> {
        cursor.validate()?;
        let events: Vec<Event> = self.fetch(&cursor.query(self.config.offset())).await?;
        Ok(events.into_iter().filter(|e| category.matches(e)).collect())
    }

    pub async fn get_event(&self, id: &str) -> Result<Event, StoreError> {
        self.fetch_one(&Query::table("events").eq("id", id), "Event")
            .await
    }

    /// Only admins create events; the creator becomes the organiser.
    pub async fn create_event(
        &self,
        actor: &Actor,
        draft: &EventDraft,
        now: DateTime<Utc>,
    ) -> Result<Event, StoreError> {
        if !actor.is_admin {
            return Err(StoreError::Forbidden(
                "Only administrators can create events".into(),
            ));
        }
        draft.validate_new(now).map_err(StoreError::Validation)?;

        let mut row = draft.to_row();
        row["organizer_id"] = json!(actor.user_id);
        row["created_by"] = json!(actor.user_id);
        row["is_published"] = json!(true);

        let stored = self.store.insert("events", row).await?;
        decode("events", stored)
    }

    pub async fn update_event(
        &self,
        actor: &Actor,
        id: &str,
        draft: &EventDraft,
        now: DateTime<Utc>,
    ) -> Result<Event, StoreError> {
        let event = self.get_event(id).await?;
        if !actor.can_manage_event(&event) {
            return Err(StoreError::Forbidden(
                "You do not have permission to edit this event".into(),
            ));
        }
        draft.validate().map_err(StoreError::Validation)?;

        let mut patch = draft.to_row();
        patch["updated_at"] = json!(now.to_rfc3339());
        self.update_one("events", id, patch, "Event").await
    }

    pub async fn delete_event(&self, actor: &Actor, id: &str) -> Result<(), StoreError> {
        let event = self.get_event(id).await?;
        if !actor.can_manage_event(&event) {
            return Err(StoreError::Forbidden(
                "You do not have permission to delete this event".into(),
            ));
        }
        self.store
            .delete("events", &[Filter::eq("id", id)])
            .await?;
        Ok(())
    }

    pub async fn set_event_image(
        &self,
        actor: &Actor,
        id: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
        now: DateTime<Utc>,
    ) -> Result<Event, StoreError> {
        let event = self.get_event(id).await?;
        if !actor.can_manage_event(&event) {
            return Err(StoreError::Forbidden(
                "You do not have permission to edit this event".into(),
            ));
        }

        let path = event_image_path(id, now.timestamp_millis(), file_name);
        let url = self
            .store
            .upload(
                &self.config.storage.event_images_bucket,
                &path,
                content_type,
                bytes,
            )
            .await?;

        self.update_one(
            "events",
            id,
            json!({ "featured_image_url": url, "updated_at": now.to_rfc3339() }),
            "Event",
        )
        .await
    }

    // ---- RSVPs ----

    /// "Going" RSVPs with their profiles. RSVPs whose profile is gone are skipped.
    pub async fn attendees(&self, event_id: &str) -> Result<Vec<Attendee>, StoreError> {
        let rsvps: Vec<Rsvp> = self
            .fetch(
                &Query::table("event_attendees")
                    .eq("event_id", event_id)
                    .eq("attendance_status", AttendanceStatus::Going.as_str())
                    .order_by("created_at", true),
            )
            .await?;

        let profiles = self
            .profiles_by_id(rsvps.iter().map(|r| r.attendee_id.as_str()))
            .await?;

        Ok(rsvps
            .into_iter()
            .filter_map(|rsvp| {
                let profile = profiles.get(&rsvp.attendee_id)?.clone();
                Some(Attendee { rsvp, profile })
            })
            .collect())
    }

    pub async fn my_rsvp(&self, event_id: &str, user_id: &str) -> Result<Option<Rsvp>, StoreError> {
        let mut rows: Vec<Rsvp> = self
            .fetch(
                &Query::table("event_attendees")
                    .eq("event_id", event_id)
                    .eq("attendee_id", user_id)
                    .limit(1),
            )
            .await?;
        Ok(rows.pop())
    }

    pub async fn rsvp(
        &self,
        actor: &Actor,
        event_id: &str,
        status: AttendanceStatus,
        now: DateTime<Utc>,
    ) -> Result<Rsvp, StoreError> {
        let event = self.get_event(event_id).await?;
        if event.has_ended(now) {
            return Err(StoreError::Conflict("This event has already ended".into()));
        }

        if status == AttendanceStatus::Going {
            if let Some(max) = event.max_attendees {
                let going: Vec<Rsvp> = self
                    .fetch(
                        &Query::table("event_attendees")
                            .eq("event_id", event_id)
                            .eq("attendance_status", AttendanceStatus::Going.as_str()),
                    )
                    .await?;
                let already = going.iter().any(|r| r.attendee_id == actor.user_id);
                if !already && going.len() >= max.max(0) as usize {
                    return Err(StoreError::Conflict("This event is full".into()));
                }
            }
        }

        let mut row = json!({
            "event_id": event_id,
            "attendee_id": actor.user_id,
            "attendance_status": status.as_str(),
        });
        // The first answer dates the RSVP; later changes keep that time.
        if self.my_rsvp(event_id, &actor.user_id).await?.is_none() {
            row["created_at"] = Value::String(now.to_rfc3339());
        }
        let stored = self
            .store
            .upsert("event_attendees", row, &["event_id", "attendee_id"])
            .await?;
        decode("event_attendees", stored)
    }

    // ---- feedback ----

    pub async fn my_feedback(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> Result<Option<EventFeedback>, StoreError> {
        let mut rows: Vec<EventFeedback> = self
            .fetch(
                &Query::table("event_feedback")
                    .eq("event_id", event_id)
                    .eq("user_id", user_id)
                    .limit(1),
            )
            .await?;
        Ok(rows.pop())
    }

    pub async fn submit_feedback(
        &self,
        actor: &Actor,
        event_id: &str,
        draft: &FeedbackDraft,
        now: DateTime<Utc>,
    ) -> Result<EventFeedback, StoreError> {
        draft.validate().map_err(StoreError::Validation)?;

        let event = self.get_event(event_id).await?;
        if !event.has_ended(now) {
            return Err(StoreError::Conflict("This event hasn't ended yet".into()));
        }

        let comments = draft.comments.trim();
        let fields = json!({
            "rating": draft.rating,
            "would_recommend": draft.would_recommend.map(|r| r.as_str()),
            "comments": if comments.is_empty() { Value::Null } else { json!(comments) },
        });

        match self.my_feedback(event_id, &actor.user_id).await? {
            Some(existing) => {
                let mut patch = fields;
                patch["updated_at"] = json!(now.to_rfc3339());
                self.update_one("event_feedback", &existing.id, patch, "Feedback")
                    .await
            }
            None => {
                let mut row = fields;
                row["event_id"] = json!(event_id);
                row["user_id"] = json!(actor.user_id);
                row["submitted_at"] = json!(now.to_rfc3339());
                let stored = self.store.insert("event_feedback", row).await?;
                decode("event_feedback", stored)
            }
        }
    }

    /// Feedback for an event, newest first, joined with submitter profiles.
    pub async fn event_feedback(&self, event_id: &str) -> Result<Vec<EventFeedback>, StoreError> {
        let mut rows: Vec<EventFeedback> = self
            .fetch(
                &Query::table("event_feedback")
                    .eq("event_id", event_id)
                    .order_by("submitted_at", false),
            )
            .await?;

        let profiles = self
            .profiles_by_id(rows.iter().filter_map(|f| f.user_id.as_deref()))
            .await?;
        for row in &mut rows {
            row.profile = row
                .user_id
                .as_ref()
                .and_then(|id| profiles.get(id))
                .cloned();
        }
        Ok(rows)
    }

    pub async fn feedback_dashboard(
        &self,
        actor: &Actor,
        event_id: &str,
    ) -> Result<FeedbackDashboard, StoreError> {
        let event = self.get_event(event_id).await?;
        if !actor.can_manage_event(&event) {
            return Err(StoreError::Forbidden(DASHBOARD_FORBIDDEN.into()));
        }
        let feedback = self.event_feedback(event_id).await?;
        let stats = FeedbackStats::compute(&feedback);
        Ok(FeedbackDashboard {
            event,
            feedback,
            stats,
        })
    }

    // ---- jobs ----

    pub async fn get_job(&self, id: &str) -> Result<JobPosting, StoreError> {
        self.fetch_one(&Query::table("jobs").eq("id", id), "Job")
            .await
    }

    /// Saved resumes, primary first, then newest first.
    pub async fn my_resumes(&self, user_id: &str) -> Result<Vec<SavedResume>, StoreError> {
        let mut resumes: Vec<SavedResume> = self
            .fetch(
                &Query::table("user_resumes")
                    .eq("user_id", user_id)
                    .order_by("uploaded_at", false),
            )
            .await?;
        resumes.sort_by_key(|r| !r.is_primary.unwrap_or(false));
        Ok(resumes)
    }

    pub async fn has_applied(&self, job_id: &str, user_id: &str) -> Result<bool, StoreError> {
        let rows = self
            .store
            .select(
                &Query::table("job_applications")
                    .eq("job_id", job_id)
                    .eq("applicant_id", user_id)
                    .limit(1),
            )
            .await?;
        Ok(!rows.is_empty())
    }

    /// Submit an application. `nonce` makes uploaded resume paths unique.
    pub async fn apply_to_job(
        &self,
        actor: &Actor,
        job_id: &str,
        cover_letter: &str,
        resume: ResumeSource,
        now: DateTime<Utc>,
        nonce: &str,
    ) -> Result<JobApplication, StoreError> {
        self.get_job(job_id).await?;
        if self.has_applied(job_id, &actor.user_id).await? {
            return Err(StoreError::Conflict(
                "You have already applied for this job".into(),
            ));
        }

        let resume_url = match resume {
            ResumeSource::Saved { resume_id } => self
                .my_resumes(&actor.user_id)
                .await?
                .into_iter()
                .find(|r| r.id == resume_id)
                .map(|r| r.file_url)
                .ok_or_else(|| StoreError::NotFound("Selected resume".into()))?,
            ResumeSource::Upload {
                file_name,
                content_type,
                bytes,
            } => {
                self.save_resume(actor, &file_name, &content_type, bytes, now, nonce)
                    .await?
                    .file_url
            }
        };

        let cover_letter = cover_letter.trim();
        let row = json!({
            "job_id": job_id,
            "applicant_id": actor.user_id,
            "resume_url": resume_url,
            "cover_letter": if cover_letter.is_empty() { Value::Null } else { json!(cover_letter) },
            "status": ApplicationStatus::Submitted.as_str(),
            "created_at": now.to_rfc3339(),
        });
        let stored = self.store.insert("job_applications", row).await?;
        decode("job_applications", stored)
    }

    /// Upload a resume and remember it; the first one becomes primary.
    pub async fn save_resume(
        &self,
        actor: &Actor,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
        now: DateTime<Utc>,
        nonce: &str,
    ) -> Result<SavedResume, StoreError> {
        let existing = self.my_resumes(&actor.user_id).await?;
        let path = resume_upload_path(&actor.user_id, now.timestamp_millis(), nonce, file_name);
        let url = self
            .store
            .upload(&self.config.storage.resumes_bucket, &path, content_type, bytes)
            .await?;

        let row = json!({
            "user_id": actor.user_id,
            "file_url": url,
            "filename": file_name,
            "uploaded_at": now.to_rfc3339(),
            "is_primary": existing.is_empty(),
        });
        let stored = self.store.insert("user_resumes", row).await?;
        decode("user_resumes", stored)
    }

    /// The caller's applications, newest first, each with its job.
    pub async fn my_applications(&self, user_id: &str) -> Result<Vec<JobApplication>, StoreError> {
        let mut applications: Vec<JobApplication> = self
            .fetch(
                &Query::table("job_applications")
                    .eq("applicant_id", user_id)
                    .order_by("created_at", false),
            )
            .await?;

        let job_ids: Vec<&str> = applications
            .iter()
            .filter_map(|a| a.job_id.as_deref())
            .collect();
        let jobs: HashMap<String, JobPosting> = if job_ids.is_empty() {
            HashMap::new()
        } else {
            self.fetch::<JobPosting>(&Query::table("jobs").filter(Filter::any_of("id", job_ids)))
                .await?
                .into_iter()
                .map(|j| (j.id.clone(), j))
                .collect()
        };

        for application in &mut applications {
            application.job = application
                .job_id
                .as_ref()
                .and_then(|id| jobs.get(id))
                .cloned();
        }
        Ok(applications)
    }

    pub async fn job_applications(
        &self,
        actor: &Actor,
        job_id: &str,
    ) -> Result<JobApplications, StoreError> {
        let job = self.get_job(job_id).await?;
        if !actor.can_manage_job(&job) {
            return Err(StoreError::Forbidden(
                "You do not have permission to view applications for this job".into(),
            ));
        }

        let mut applications: Vec<JobApplication> = self
            .fetch(
                &Query::table("job_applications")
                    .eq("job_id", job_id)
                    .order_by("created_at", false),
            )
            .await?;
        let profiles = self
            .profiles_by_id(applications.iter().filter_map(|a| a.applicant_id.as_deref()))
            .await?;
        for application in &mut applications {
            application.applicant = application
                .applicant_id
                .as_ref()
                .and_then(|id| profiles.get(id))
                .cloned();
        }

        Ok(JobApplications { job, applications })
    }

    pub async fn update_application_status(
        &self,
        actor: &Actor,
        application_id: &str,
        status: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> Result<JobApplication, StoreError> {
        let application: JobApplication = self
            .fetch_one(
                &Query::table("job_applications").eq("id", application_id),
                "Application",
            )
            .await?;

        let is_applicant = application.applicant_id.as_deref() == Some(actor.user_id.as_str());
        let allowed = if is_applicant && status == ApplicationStatus::Withdrawn {
            true
        } else {
            match application.job_id.as_deref() {
                Some(job_id) => actor.can_manage_job(&self.get_job(job_id).await?),
                None => actor.is_admin,
            }
        };
        if !allowed {
            return Err(StoreError::Forbidden(
                "You do not have permission to update this application".into(),
            ));
        }

        self.update_one(
            "job_applications",
            application_id,
            json!({ "status": status.as_str(), "updated_at": now.to_rfc3339() }),
            "Application",
        )
        .await
    }

    // ---- profiles ----

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        let mut rows: Vec<Profile> = self
            .fetch(&Query::table("profiles").eq("id", user_id).limit(1))
            .await?;
        Ok(rows.pop())
    }

    // ---- helpers ----

    async fn fetch<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>, StoreError> {
        self.store
            .select(query)
            .await?
            .into_iter()
            .map(|row| decode(&query.table, row))
            .collect()
    }

    async fn fetch_one<T: DeserializeOwned>(
        &self,
        query: &Query,
        what: &str,
    ) -> Result<T, StoreError> {
        let query = query.clone().limit(1);
        self.fetch(&query)
            .await?
            .pop()
            .ok_or_else(|| StoreError::NotFound(what.to_string()))
    }

    async fn update_one<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
        patch: Value,
        what: &str,
    ) -> Result<T, StoreError> {
        let row = self
            .store
            .update(table, &[Filter::eq("id", id)], patch)
            .await?
            .pop()
            .ok_or_else(|| StoreError::NotFound(what.to_string()))?;
        decode(table, row)
    }

    async fn profiles_by_id<'a>(
        &self,
        ids: impl Iterator<Item = &'a str>,
    ) -> Result<HashMap<String, Profile>, StoreError> {
        let mut ids: Vec<&str> = ids.collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let profiles: Vec<Profile> = self
            .fetch(&Query::table("profiles").filter(Filter::any_of("id", ids)))
            .await?;
        Ok(profiles.into_iter().map(|p| (p.id.clone(), p)).collect())
    }
}

fn decode<T: DeserializeOwned>(table: &str, row: Value) -> Result<T, StoreError> {
    serde_json::from_value(row).map_err(|e| StoreError::decode(table, e))
}
