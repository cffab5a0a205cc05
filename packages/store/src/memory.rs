use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::error::StoreError;
use crate::models::timestamp;
use crate::query::{Filter, Query};
use crate::repo::TableStore;

/// In-memory TableStore for tests and local development.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<HashMap<String, Vec<Value>>>>,
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    next_id: Arc<Mutex<u64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rows to `table` as-is.
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    /// Every row of `table`, in insertion order.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn object(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&format!("{bucket}/{path}"))
            .cloned()
    }

    fn generate_id(&self, table: &str) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("{table}-{next}")
    }

    fn insert_row(&self, table: &str, mut row: Value) -> Result<Value, StoreError> {
        let Value::Object(map) = &mut row else {
            return Err(StoreError::Backend {
                status: 400,
                message: format!("row for {table} must be an object"),
            });
        };
        if !map.contains_key("id") {
            map.insert("id".into(), Value::String(self.generate_id(table)));
        }
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }
}

impl TableStore for MemoryStore {
    async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        let mut rows: Vec<Value> = self
            .rows(&query.table)
            .into_iter()
            .filter(|row| query.filters.iter().all(|f| matches(row, f)))
            .collect();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare_nulls_last(field(a, &order.column), field(b, &order.column));
                if order.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
        self.insert_row(table, row)
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Vec<Value>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let mut updated = Vec::new();
        for row in tables.entry(table.to_string()).or_default().iter_mut() {
            if filters.iter().all(|f| matches(row, f)) {
                merge(row, &patch);
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn upsert(
        &self,
        table: &str,
        row: Value,
        on_conflict: &[&str],
    ) -> Result<Value, StoreError> {
        {
            let mut tables = self.tables.lock().unwrap();
            let existing = tables
                .entry(table.to_string())
                .or_default()
                .iter_mut()
                .find(|existing| {
                    on_conflict
                        .iter()
                        .all(|col| row.get(*col).is_some() && row.get(*col) == existing.get(*col))
                });
            if let Some(existing) = existing {
                merge(existing, &row);
                return Ok(existing.clone());
            }
        }
        self.insert_row(table, row)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<usize, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let before = rows.len();
        rows.retain(|row| !filters.iter().all(|f| matches(row, f)));
        Ok(before - rows.len())
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StoreError> {
        self.objects
            .lock()
            .unwrap()
            .insert(format!("{bucket}/{path}"), bytes);
        Ok(format!("memory://{bucket}/{path}"))
    }
}

fn field<'a>(row: &'a Value, column: &str) -> &'a Value {
    row.get(column).unwrap_or(&Value::Null)
}

fn matches(row: &Value, filter: &Filter) -> bool {
    let value = field(row, filter.column());
    match filter {
        Filter::Eq(_, want) => compare(value, want) == Some(Ordering::Equal),
        Filter::Gt(_, want) => compare(value, want) == Some(Ordering::Greater),
        Filter::Gte(_, want) => matches!(
            compare(value, want),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Filter::Lt(_, want) => compare(value, want) == Some(Ordering::Less),
        Filter::Lte(_, want) => matches!(
            compare(value, want),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Filter::In(_, wants) => wants
            .iter()
            .any(|want| compare(value, want) == Some(Ordering::Equal)),
    }
}

/// Timestamps compare as instants, numbers numerically, everything else by value.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::String(x), Value::String(y)) => {
            match (timestamp::parse(x), timestamp::parse(y)) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                _ => Some(x.cmp(y)),
            }
        }
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn compare_nulls_last(a: &Value, b: &Value) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => compare(a, b).unwrap_or(Ordering::Equal),
    }
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Value::Object(target), Value::Object(patch)) = (target, patch) {
        for (k, v) in patch {
            target.insert(k.clone(), v.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{CategoryFilter, MonthCursor};
    use crate::events::{EventListFilter, StatusFilter};
    use crate::models::{
        ApplicationStatus, AttendanceStatus, EventDraft, FeedbackDraft, Recommendation,
        ResumeSource,
    };
    use crate::repo::{Actor, Repository};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 6, 0, 0).unwrap()
    }

    fn event_row(id: &str, start: DateTime<Utc>, hours: i64, extra: Value) -> Value {
        let mut row = json!({
            "id": id,
            "title": format!("Event {id}"),
            "description": "Annual gathering",
            "start_date": start.to_rfc3339(),
            "end_date": (start + Duration::hours(hours)).to_rfc3339(),
            "location": "Main Hall",
            "organizer_id": "organizer",
        });
        merge(&mut row, &extra);
        row
    }

    fn seeded() -> Repository<MemoryStore> {
        let store = MemoryStore::new();
        let now = now();
        store.seed(
            "events",
            vec![
                event_row("later", now + Duration::days(3), 2, json!({ "event_type": "webinar", "location": "Online" })),
                event_row("past", now - Duration::days(3), 2, json!({})),
                event_row("soon", now + Duration::hours(2), 1, json!({ "max_attendees": 1 })),
                event_row("live", now - Duration::hours(1), 3, json!({ "event_type": "workshop" })),
            ],
        );
        store.seed(
            "profiles",
            vec![
                json!({ "id": "alice", "full_name": "Alice Menon", "role": "alumni" }),
                json!({ "id": "organizer", "full_name": "Olu Ade", "role": "alumni" }),
                json!({ "id": "admin", "full_name": "Root", "role": "admin" }),
            ],
        );
        store.seed(
            "jobs",
            vec![json!({ "id": "j1", "title": "Backend Engineer", "company_name": "Acme", "posted_by": "organizer" })],
        );
        Repository::new(store)
    }

    fn alice() -> Actor {
        Actor::new("alice", false)
    }

    fn organizer() -> Actor {
        Actor::new("organizer", false)
    }

    fn admin() -> Actor {
        Actor::new("admin", true)
    }

    fn ids(events: &[crate::models::Event]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_events_by_status() {
        let repo = seeded();
        let mut filter = EventListFilter::default();

        let all = repo.list_events(&filter, now()).await.unwrap();
        assert_eq!(ids(&all), vec!["past", "live", "soon", "later"]);

        filter.status = StatusFilter::Upcoming;
        assert_eq!(ids(&repo.list_events(&filter, now()).await.unwrap()), vec!["soon", "later"]);

        filter.status = StatusFilter::Past;
        assert_eq!(ids(&repo.list_events(&filter, now()).await.unwrap()), vec!["past"]);

        // 06:00 UTC is 11:30 IST; "live" started at 10:30 and "soon" ends at 14:30.
        filter.status = StatusFilter::Today;
        assert_eq!(ids(&repo.list_events(&filter, now()).await.unwrap()), vec!["live", "soon"]);
    }

    #[tokio::test]
    async fn test_list_events_type_and_search() {
        let repo = seeded();
        let filter = EventListFilter {
            event_type: Some("workshop".into()),
            ..Default::default()
        };
        assert_eq!(ids(&repo.list_events(&filter, now()).await.unwrap()), vec!["live"]);

        let filter = EventListFilter {
            search: "ONLINE".into(),
            ..Default::default()
        };
        assert_eq!(ids(&repo.list_events(&filter, now()).await.unwrap()), vec!["later"]);
    }

    #[tokio::test]
    async fn test_month_events_by_category() {
        let repo = seeded();
        let cursor = MonthCursor { year: 2025, month: 6 };
        let virtual_only = repo
            .month_events(cursor, &CategoryFilter::Virtual)
            .await
            .unwrap();
        assert_eq!(ids(&virtual_only), vec!["later"]);
        let in_person = repo
            .month_events(cursor, &CategoryFilter::InPerson)
            .await
            .unwrap();
        assert_eq!(in_person.len(), 3);

        for month in [0, 13] {
            let err = repo
                .month_events(MonthCursor { year: 2025, month }, &CategoryFilter::All)
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::Validation(_)));
        }
    }

    fn draft() -> EventDraft {
        EventDraft {
            title: "Homecoming".into(),
            description: "Campus tour and dinner".into(),
            start_date: Some(now() + Duration::days(10)),
            end_date: Some(now() + Duration::days(10) + Duration::hours(4)),
            location: "Quad".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_update_delete_event() {
        let repo = seeded();

        let err = repo.create_event(&alice(), &draft(), now()).await.unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));

        let invalid = EventDraft::default();
        let err = repo.create_event(&admin(), &invalid, now()).await.unwrap_err();
        assert!(!err.field_errors().is_empty());

        let yesterday = EventDraft {
            start_date: Some(now() - Duration::days(1)),
            end_date: Some(now() - Duration::days(1) + Duration::hours(2)),
            ..draft()
        };
        let err = repo.create_event(&admin(), &yesterday, now()).await.unwrap_err();
        assert_eq!(err.field_errors()[0].message, "Event date cannot be in the past");

        let created = repo.create_event(&admin(), &draft(), now()).await.unwrap();
        assert_eq!(created.organizer_id.as_deref(), Some("admin"));
        assert_eq!(created.category.as_deref(), Some("general"));

        let mut edit = EventDraft::from_event(&created);
        edit.title = "Homecoming 2025".into();
        let err = repo
            .update_event(&alice(), &created.id, &edit, now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));
        let updated = repo
            .update_event(&admin(), &created.id, &edit, now())
            .await
            .unwrap();
        assert_eq!(updated.title, "Homecoming 2025");
        assert!(updated.updated_at.is_some());

        // Organisers manage their own events.
        repo.delete_event(&organizer(), "past").await.unwrap();
        assert!(matches!(
            repo.get_event("past").await.unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_event_image_upload() {
        let repo = seeded();
        let event = repo
            .set_event_image(&organizer(), "soon", "cover.JPG", "image/jpeg", vec![1, 2, 3], now())
            .await
            .unwrap();
        let path = format!("event-images/soon-{}.jpg", now().timestamp_millis());
        assert_eq!(
            event.featured_image_url,
            Some(format!("memory://events/{path}"))
        );
        assert_eq!(repo.store().object("events", &path), Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_rsvp_rules() {
        let repo = seeded();

        let err = repo
            .rsvp(&alice(), "past", AttendanceStatus::Going, now())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "This event has already ended");

        let rsvp = repo
            .rsvp(&alice(), "soon", AttendanceStatus::Going, now())
            .await
            .unwrap();
        assert_eq!(rsvp.attendance_status, AttendanceStatus::Going);

        // Full for everyone else, but alice can re-confirm.
        let err = repo
            .rsvp(&organizer(), "soon", AttendanceStatus::Going, now())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "This event is full");
        repo.rsvp(&alice(), "soon", AttendanceStatus::Going, now())
            .await
            .unwrap();
        repo.rsvp(&organizer(), "soon", AttendanceStatus::Maybe, now())
            .await
            .unwrap();

        let attendees = repo.attendees("soon").await.unwrap();
        assert_eq!(attendees.len(), 1);
        assert_eq!(attendees[0].profile.display_name(), "Alice Menon");

        // Switching answer updates the same row and keeps the original time.
        repo.rsvp(
            &alice(),
            "soon",
            AttendanceStatus::NotGoing,
            now() + Duration::minutes(30),
        )
        .await
        .unwrap();
        assert_eq!(repo.store().rows("event_attendees").len(), 2);
        let mine = repo.my_rsvp("soon", "alice").await.unwrap().unwrap();
        assert_eq!(mine.attendance_status, AttendanceStatus::NotGoing);
        assert_eq!(mine.created_at, Some(now()));
        assert!(repo.attendees("soon").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_feedback_submit_and_dashboard() {
        let repo = seeded();
        let good = FeedbackDraft {
            rating: 5,
            would_recommend: Some(Recommendation::Yes),
            comments: "Great talks".into(),
        };

        let err = repo
            .submit_feedback(&alice(), "later", &good, now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // "live" started an hour ago and ends two hours from now.
        let live_end = now() + Duration::hours(2);
        let err = repo
            .submit_feedback(&alice(), "live", &good, now())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "This event hasn't ended yet");
        let err = repo
            .submit_feedback(&alice(), "live", &good, live_end - Duration::seconds(1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        let after_end = repo
            .submit_feedback(&alice(), "live", &good, live_end + Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(after_end.rating, Some(5));

        let err = repo
            .submit_feedback(&alice(), "past", &FeedbackDraft::default(), now())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Please provide a rating");

        let first = repo
            .submit_feedback(&alice(), "past", &good, now())
            .await
            .unwrap();
        let revised = FeedbackDraft {
            rating: 3,
            ..good.clone()
        };
        let second = repo
            .submit_feedback(&alice(), "past", &revised, now())
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.rating, Some(3));
        assert_eq!(repo.store().rows("event_feedback").len(), 2);

        repo.submit_feedback(
            &admin(),
            "past",
            &FeedbackDraft {
                rating: 4,
                would_recommend: Some(Recommendation::No),
                comments: String::new(),
            },
            now() + Duration::minutes(5),
        )
        .await
        .unwrap();

        let err = repo.feedback_dashboard(&alice(), "past").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "You do not have permission to view this feedback dashboard"
        );

        let dashboard = repo.feedback_dashboard(&organizer(), "past").await.unwrap();
        assert_eq!(dashboard.stats.total_responses, 2);
        assert_eq!(dashboard.stats.average_label(), "3.5");
        assert_eq!(dashboard.stats.recommend_percent, 50);
        assert_eq!(dashboard.stats.comment_count, 1);
        // Newest first, with names joined in.
        assert_eq!(dashboard.feedback[0].author_name(), "Root");
        assert_eq!(dashboard.feedback[1].author_name(), "Alice Menon");
    }

    #[tokio::test]
    async fn test_apply_and_track_applications() {
        let repo = seeded();

        let upload = ResumeSource::Upload {
            file_name: "cv.pdf".into(),
            content_type: "application/pdf".into(),
            bytes: b"%PDF".to_vec(),
        };
        let application = repo
            .apply_to_job(&alice(), "j1", "I build APIs", upload.clone(), now(), "abc123")
            .await
            .unwrap();
        assert_eq!(application.status(), ApplicationStatus::Submitted);
        let path = format!("alice/{}-abc123.pdf", now().timestamp_millis());
        assert_eq!(
            application.resume_url.as_deref(),
            Some(format!("memory://resumes/{path}").as_str())
        );
        assert!(repo.store().object("resumes", &path).is_some());

        let resumes = repo.my_resumes("alice").await.unwrap();
        assert_eq!(resumes.len(), 1);
        assert_eq!(resumes[0].is_primary, Some(true));

        let err = repo
            .apply_to_job(&alice(), "j1", "", upload, now(), "def456")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "You have already applied for this job");

        let err = repo
            .apply_to_job(
                &admin(),
                "j1",
                "",
                ResumeSource::Saved {
                    resume_id: resumes[0].id.clone(),
                },
                now(),
                "x",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let mine = repo.my_applications("alice").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].job.as_ref().unwrap().company_name, "Acme");
    }

    #[tokio::test]
    async fn test_unrecognised_statuses_do_not_break_lists() {
        let repo = seeded();
        repo.store().seed(
            "job_applications",
            vec![
                json!({ "id": "old", "job_id": "j1", "applicant_id": "alice", "status": "pending", "created_at": "2025-01-01T00:00:00Z" }),
                json!({ "id": "odd", "job_id": "j1", "applicant_id": "alice", "status": "On_Hold", "created_at": "2025-01-02T00:00:00Z" }),
                json!({ "id": "ok", "job_id": "j1", "applicant_id": "alice", "status": "approved", "created_at": "2025-01-03T00:00:00Z" }),
            ],
        );

        let mine = repo.my_applications("alice").await.unwrap();
        let statuses: Vec<_> = mine.iter().map(|a| (a.id.as_str(), a.status())).collect();
        assert_eq!(
            statuses,
            vec![
                ("ok", ApplicationStatus::Offered),
                ("odd", ApplicationStatus::Submitted),
                ("old", ApplicationStatus::Submitted),
            ]
        );

        let received = repo.job_applications(&organizer(), "j1").await.unwrap();
        assert_eq!(received.applications.len(), 3);
    }

    #[tokio::test]
    async fn test_manage_applications_permissions() {
        let repo = seeded();
        let application = repo
            .apply_to_job(
                &alice(),
                "j1",
                "",
                ResumeSource::Upload {
                    file_name: "cv.docx".into(),
                    content_type: "application/octet-stream".into(),
                    bytes: vec![0],
                },
                now(),
                "n",
            )
            .await
            .unwrap();

        assert!(matches!(
            repo.job_applications(&alice(), "j1").await.unwrap_err(),
            StoreError::Forbidden(_)
        ));
        let received = repo.job_applications(&organizer(), "j1").await.unwrap();
        assert_eq!(received.applications.len(), 1);
        assert_eq!(
            received.applications[0].applicant.as_ref().unwrap().display_name(),
            "Alice Menon"
        );

        let err = repo
            .update_application_status(&alice(), &application.id, ApplicationStatus::Offered, now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));

        let updated = repo
            .update_application_status(&organizer(), &application.id, ApplicationStatus::Interview, now())
            .await
            .unwrap();
        assert_eq!(updated.status(), ApplicationStatus::Interview);

        let withdrawn = repo
            .update_application_status(&alice(), &application.id, ApplicationStatus::Withdrawn, now())
            .await
            .unwrap();
        assert_eq!(withdrawn.status(), ApplicationStatus::Withdrawn);
    }

    #[tokio::test]
    async fn test_select_orders_timestamps_across_formats() {
        let store = MemoryStore::new();
        store.seed(
            "t",
            vec![
                json!({ "id": "a", "at": "2025-01-02T00:00:00+05:30" }),
                json!({ "id": "b", "at": "2025-01-01T20:00:00" }),
                json!({ "id": "c", "at": null }),
            ],
        );
        let rows = store
            .select(&Query::table("t").order_by("at", true))
            .await
            .unwrap();
        let order: Vec<&str> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);

        let removed = store.delete("t", &[Filter::eq("id", "c")]).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.rows("t").len(), 2);
    }
}
