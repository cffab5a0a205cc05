//! # Domain models for events, RSVPs, feedback and job applications
//!
//! Payload shapes for the rows the hosted database owns. Every struct is
//! `Serialize + Deserialize` so it can cross the server/client boundary via
//! Dioxus server functions as well as the backend's REST layer.
//!
//! ## Types
//!
//! | Struct | Table | Notes |
//! |--------|-------|-------|
//! | [`Event`] | `events` | Optional columns default when absent or `null`. |
//! | [`EventDraft`] | `events` | Create/update payload; [`EventDraft::validate`] holds the form rules. |
//! | [`Rsvp`] | `event_attendees` | One row per attendee per event. |
//! | [`Attendee`] | - | An RSVP joined with the attendee's [`Profile`]. |
//! | [`EventFeedback`] | `event_feedback` | One row per user per event, optionally joined with the submitter's profile. |
//! | [`FeedbackDraft`] | `event_feedback` | Form payload for submitting feedback. |
//! | [`JobPosting`] | `jobs` | Subset of the posting columns used by the application views. |
//! | [`JobApplication`] | `job_applications` | Optionally joined with its [`JobPosting`] and applicant [`Profile`]. |
//! | [`Profile`] | `profiles` | Display data and role. |
//! | [`SavedResume`] | `user_resumes` | Resumes kept for reuse across applications. |
//!
//! ## Timestamps
//!
//! The backend returns `timestamptz` columns as RFC 3339 strings and
//! `timestamp` columns without an offset. [`timestamp`] accepts both and treats
//! offset-less values as UTC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FieldError;

/// Event type values offered by the list filter and the event form.
pub const EVENT_TYPES: &[&str] = &[
    "workshop",
    "conference",
    "networking",
    "seminar",
    "webinar",
    "social",
    "other",
];

/// An event row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(with = "timestamp")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub is_virtual: Option<bool>,
    #[serde(default)]
    pub virtual_link: Option<String>,
    #[serde(default)]
    pub max_attendees: Option<i32>,
    #[serde(default, with = "timestamp::option")]
    pub registration_deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cost: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub featured_image_url: Option<String>,
    #[serde(default)]
    pub organizer_id: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub is_published: Option<bool>,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Event {
    /// Location text, empty when unset.
    pub fn location_text(&self) -> &str {
        self.location.as_deref().unwrap_or("")
    }

    /// Virtual when flagged, or when the location mentions "online".
    pub fn is_virtual_event(&self) -> bool {
        self.is_virtual.unwrap_or(false)
            || self.location_text().to_lowercase().contains("online")
    }

    /// Whether `user_id` organised or created this event.
    pub fn is_organized_by(&self, user_id: &str) -> bool {
        self.organizer_id.as_deref() == Some(user_id) || self.created_by.as_deref() == Some(user_id)
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.end_date < now
    }

    /// Display label for the event type, capitalised ("Workshop").
    pub fn type_label(&self) -> String {
        let raw = self
            .event_type
            .as_deref()
            .or(self.category.as_deref())
            .unwrap_or("general");
        let mut chars = raw.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Create/update payload for an event.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub event_type: String,
    #[serde(default, with = "timestamp::option")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub end_date: Option<DateTime<Utc>>,
    pub location: String,
    pub is_virtual: bool,
    pub virtual_link: String,
    pub max_attendees: Option<i32>,
    #[serde(default, with = "timestamp::option")]
    pub registration_deadline: Option<DateTime<Utc>>,
    pub cost: String,
    pub tags: Vec<String>,
}

impl EventDraft {
    /// Pre-fill a draft from an existing event (edit form).
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            category: event.category.clone().unwrap_or_default(),
            event_type: event.event_type.clone().unwrap_or_default(),
            start_date: Some(event.start_date),
            end_date: Some(event.end_date),
            location: event.location.clone().unwrap_or_default(),
            is_virtual: event.is_virtual.unwrap_or(false),
            virtual_link: event.virtual_link.clone().unwrap_or_default(),
            max_attendees: event.max_attendees,
            registration_deadline: event.registration_deadline,
            cost: event.cost.clone().unwrap_or_default(),
            tags: event.tags.clone().unwrap_or_default(),
        }
    }

    /// Check the form rules, returning every failing field.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "Event title is required"));
        }
        if self.description.trim().is_empty() {
            errors.push(FieldError::new("description", "Description is required"));
        }
        match (self.start_date, self.end_date) {
            (None, _) => errors.push(FieldError::new("start_date", "Start date and time are required")),
            (_, None) => errors.push(FieldError::new("end_date", "End date and time are required")),
            (Some(start), Some(end)) if end <= start => {
                errors.push(FieldError::new("end_date", "End time must be after start time"))
            }
            _ => {}
        }
        if self.is_virtual && self.virtual_link.trim().is_empty() {
            errors.push(FieldError::new("virtual_link", "Virtual meeting link is required"));
        }
        if !self.is_virtual && self.location.trim().is_empty() {
            errors.push(FieldError::new("location", "Location is required"));
        }
        if matches!(self.max_attendees, Some(n) if n < 1) {
            errors.push(FieldError::new("max_attendees", "Maximum attendees must be at least 1"));
        }
        if let (Some(deadline), Some(start)) = (self.registration_deadline, self.start_date) {
            if deadline > start {
                errors.push(FieldError::new(
                    "registration_deadline",
                    "Registration deadline must not be after the event starts",
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// [`EventDraft::validate`] plus the rules that only apply to new events.
    /// Edits of events that already ran skip the start-date check.
    pub fn validate_new(&self, now: DateTime<Utc>) -> Result<(), Vec<FieldError>> {
        let mut errors = self.validate().err().unwrap_or_default();
        if matches!(self.start_date, Some(start) if start < now) {
            errors.push(FieldError::new("start_date", "Event date cannot be in the past"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// JSON row for the backend. Empty optional text becomes `null`.
    pub fn to_row(&self) -> serde_json::Value {
        fn text(s: &str) -> serde_json::Value {
            let s = s.trim();
            if s.is_empty() {
                serde_json::Value::Null
            } else {
                serde_json::Value::String(s.to_string())
            }
        }

        serde_json::json!({
            "title": self.title.trim(),
            "description": self.description.trim(),
            "category": if self.category.trim().is_empty() { "general" } else { self.category.trim() },
            "event_type": text(&self.event_type),
            "start_date": self.start_date.map(|d| d.to_rfc3339()),
            "end_date": self.end_date.map(|d| d.to_rfc3339()),
            "location": text(&self.location),
            "is_virtual": self.is_virtual,
            "virtual_link": text(&self.virtual_link),
            "max_attendees": self.max_attendees,
            "registration_deadline": self.registration_deadline.map(|d| d.to_rfc3339()),
            "cost": text(&self.cost),
            "tags": self.tags,
        })
    }
}

/// RSVP answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Going,
    NotGoing,
    Maybe,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Going => "going",
            Self::NotGoing => "not_going",
            Self::Maybe => "maybe",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Going => "going",
            Self::NotGoing => "not going",
            Self::Maybe => "maybe",
        }
    }
}

/// An `event_attendees` row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rsvp {
    #[serde(default)]
    pub id: Option<String>,
    pub event_id: String,
    pub attendee_id: String,
    pub attendance_status: AttendanceStatus,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
}

/// An RSVP joined with the attendee's profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub rsvp: Rsvp,
    pub profile: Profile,
}

/// A `profiles` row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub current_position: Option<String>,
}

impl Profile {
    /// Full name, then email, then "Anonymous".
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.email.as_deref())
            .unwrap_or("Anonymous")
    }

    /// Avatar URL, falling back to a generated initials image.
    pub fn avatar(&self) -> String {
        match &self.avatar_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => format!(
                "https://api.dicebear.com/6.x/initials/svg?seed={}",
                self.display_name().replace(' ', "%20")
            ),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

/// "Would you recommend this event?"
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Yes,
    No,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            _ => None,
        }
    }
}

/// An `event_feedback` row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventFeedback {
    pub id: String,
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub would_recommend: Option<Recommendation>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default, alias = "created_at", with = "timestamp::option")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

impl EventFeedback {
    pub fn author_name(&self) -> &str {
        self.profile
            .as_ref()
            .and_then(|p| p.full_name.as_deref())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Anonymous")
    }

    pub fn has_comment(&self) -> bool {
        self.comments.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}

/// Feedback form payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackDraft {
    /// 1–5; 0 means "not rated yet".
    pub rating: u8,
    pub would_recommend: Option<Recommendation>,
    pub comments: String,
}

impl FeedbackDraft {
    pub fn from_feedback(feedback: &EventFeedback) -> Self {
        Self {
            rating: feedback.rating.unwrap_or(0),
            would_recommend: feedback.would_recommend,
            comments: feedback.comments.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        if (1..=5).contains(&self.rating) {
            Ok(())
        } else {
            Err(vec![FieldError::new("rating", "Please provide a rating")])
        }
    }
}

/// A `jobs` row (the columns the application views use).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub posted_by: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl JobPosting {
    /// Whether `user_id` posted this job.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        [&self.posted_by, &self.created_by, &self.user_id]
            .iter()
            .any(|owner| owner.as_deref() == Some(user_id))
    }
}

/// Lifecycle of a job application.
///
/// Decoding goes through [`ApplicationStatus::parse`], so legacy and mixed-case
/// spellings are accepted and anything unrecognised reads as `Submitted`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Submitted,
    Reviewing,
    Interview,
    Offered,
    Rejected,
    Withdrawn,
}

impl<'de> Deserialize<'de> for ApplicationStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw).unwrap_or_default())
    }
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 6] = [
        Self::Submitted,
        Self::Reviewing,
        Self::Interview,
        Self::Offered,
        Self::Rejected,
        Self::Withdrawn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Reviewing => "reviewing",
            Self::Interview => "interview",
            Self::Offered => "offered",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Submitted => "Submitted",
            Self::Reviewing => "Under Review",
            Self::Interview => "Interview",
            Self::Offered => "Offer Received",
            Self::Rejected => "Rejected",
            Self::Withdrawn => "Withdrawn",
        }
    }

    /// Parse a stored status, accepting the legacy spellings.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "submitted" | "pending" => Some(Self::Submitted),
            "reviewing" | "reviewed" | "under_review" | "under-review" => Some(Self::Reviewing),
            "interview" | "in-progress" | "in_progress" => Some(Self::Interview),
            "offered" | "hired" | "approved" => Some(Self::Offered),
            "rejected" => Some(Self::Rejected),
            "withdrawn" => Some(Self::Withdrawn),
            _ => None,
        }
    }
}

/// A `job_applications` row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: String,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub applicant_id: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    #[serde(default, alias = "submitted_at", with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<JobPosting>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant: Option<Profile>,
}

impl JobApplication {
    /// Stored status; rows with no status count as submitted.
    pub fn status(&self) -> ApplicationStatus {
        self.status.unwrap_or_default()
    }
}

/// A `user_resumes` row: a resume the user uploaded for an earlier application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedResume {
    pub id: String,
    pub user_id: String,
    pub file_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filename: String,
    #[serde(default)]
    pub is_primary: Option<bool>,
    #[serde(default, with = "timestamp::option")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// Where the resume for a new application comes from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ResumeSource {
    /// One of the caller's [`SavedResume`]s.
    Saved { resume_id: String },
    /// A new file to upload to the resumes bucket.
    Upload {
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Serde helpers for backend timestamps.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Parse RFC 3339, or a naive `YYYY-MM-DDTHH:MM[:SS[.f]]` read as UTC.
    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        let s = s.trim().replace(' ', "T");
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(&s, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event_json() -> serde_json::Value {
        serde_json::json!({
            "id": "e1",
            "title": "Alumni Meetup",
            "description": null,
            "start_date": "2025-07-23T09:30:00+00:00",
            "end_date": "2025-07-23T11:00:00",
            "location": "Online (Zoom)",
            "organizer_id": "u1",
        })
    }

    #[test]
    fn event_tolerates_nulls_and_naive_timestamps() {
        let event: Event = serde_json::from_value(event_json()).unwrap();
        assert_eq!(event.description, "");
        assert_eq!(event.start_date, Utc.with_ymd_and_hms(2025, 7, 23, 9, 30, 0).unwrap());
        assert_eq!(event.end_date, Utc.with_ymd_and_hms(2025, 7, 23, 11, 0, 0).unwrap());
        assert!(event.registration_deadline.is_none());
        assert!(event.is_virtual_event());
        assert!(event.is_organized_by("u1"));
        assert!(!event.is_organized_by("u2"));
        assert_eq!(event.type_label(), "General");
    }

    #[test]
    fn draft_validation_collects_every_field() {
        let draft = EventDraft {
            is_virtual: true,
            max_attendees: Some(0),
            ..Default::default()
        };
        let errors = draft.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["title", "description", "start_date", "virtual_link", "max_attendees"]
        );
    }

    #[test]
    fn draft_rejects_end_before_start() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        let draft = EventDraft {
            title: "T".into(),
            description: "D".into(),
            location: "Hall A".into(),
            start_date: Some(start),
            end_date: Some(start),
            registration_deadline: Some(start + chrono::Duration::hours(1)),
            ..Default::default()
        };
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors[0].field, "end_date");
        assert_eq!(errors[1].field, "registration_deadline");
    }

    #[test]
    fn new_events_cannot_start_in_the_past() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 6, 0, 0).unwrap();
        let mut draft = EventDraft {
            title: "T".into(),
            description: "D".into(),
            location: "Hall A".into(),
            start_date: Some(now - chrono::Duration::minutes(1)),
            end_date: Some(now + chrono::Duration::hours(1)),
            ..Default::default()
        };
        assert!(draft.validate().is_ok());
        let errors = draft.validate_new(now).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "start_date");
        assert_eq!(errors[0].message, "Event date cannot be in the past");

        draft.start_date = Some(now + chrono::Duration::minutes(1));
        assert!(draft.validate_new(now).is_ok());
    }

    #[test]
    fn draft_row_nulls_empty_text() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        let draft = EventDraft {
            title: " Reunion ".into(),
            description: "Class of 2010".into(),
            start_date: Some(start),
            end_date: Some(start + chrono::Duration::hours(2)),
            ..Default::default()
        };
        let row = draft.to_row();
        assert_eq!(row["title"], "Reunion");
        assert_eq!(row["category"], "general");
        assert!(row["virtual_link"].is_null());
        assert_eq!(row["start_date"], "2025-01-01T10:00:00+00:00");
    }

    #[test]
    fn application_status_accepts_legacy_spellings() {
        let app: JobApplication = serde_json::from_value(serde_json::json!({
            "id": "a1",
            "status": "hired",
            "submitted_at": "2025-02-01T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(app.status(), ApplicationStatus::Offered);
        assert!(app.created_at.is_some());

        let none: JobApplication =
            serde_json::from_value(serde_json::json!({ "id": "a2", "status": null })).unwrap();
        assert_eq!(none.status(), ApplicationStatus::Submitted);

        assert_eq!(ApplicationStatus::parse("In-Progress"), Some(ApplicationStatus::Interview));
        assert_eq!(ApplicationStatus::parse("reviewed"), Some(ApplicationStatus::Reviewing));
        assert_eq!(ApplicationStatus::parse("nope"), None);
    }

    #[test]
    fn application_status_tolerates_unknown_values() {
        let pending: JobApplication =
            serde_json::from_value(serde_json::json!({ "id": "a", "status": "pending" })).unwrap();
        assert_eq!(pending.status(), ApplicationStatus::Submitted);

        let shouted: JobApplication =
            serde_json::from_value(serde_json::json!({ "id": "b", "status": "UNDER_REVIEW" }))
                .unwrap();
        assert_eq!(shouted.status(), ApplicationStatus::Reviewing);

        let approved: JobApplication =
            serde_json::from_value(serde_json::json!({ "id": "c", "status": "Approved" })).unwrap();
        assert_eq!(approved.status(), ApplicationStatus::Offered);

        let odd: JobApplication =
            serde_json::from_value(serde_json::json!({ "id": "d", "status": "on_hold" })).unwrap();
        assert_eq!(odd.status(), ApplicationStatus::Submitted);

        // Writes stay in the canonical lowercase form.
        assert_eq!(
            serde_json::to_value(ApplicationStatus::Reviewing).unwrap(),
            serde_json::json!("reviewing")
        );
    }

    #[test]
    fn feedback_draft_requires_rating() {
        assert!(FeedbackDraft::default().validate().is_err());
        let draft = FeedbackDraft {
            rating: 4,
            ..Default::default()
        };
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn profile_display_fallbacks() {
        let mut profile = Profile {
            id: "p".into(),
            ..Default::default()
        };
        assert_eq!(profile.display_name(), "Anonymous");
        profile.email = Some("a@b.org".into());
        assert_eq!(profile.display_name(), "a@b.org");
        profile.full_name = Some("Asha Rao".into());
        assert_eq!(profile.display_name(), "Asha Rao");
        assert!(profile.avatar().ends_with("seed=Asha%20Rao"));
    }
}
