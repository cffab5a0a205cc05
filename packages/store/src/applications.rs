//! Helpers for the job-application views and for naming uploaded objects.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ApplicationStatus, JobApplication};

/// Status dropdown on the "my applications" page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationFilter {
    #[default]
    All,
    Status(ApplicationStatus),
}

impl ApplicationFilter {
    /// `"all"` or a status value; unknown values mean all.
    pub fn parse(s: &str) -> Self {
        ApplicationStatus::parse(s).map_or(Self::All, Self::Status)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Status(s) => s.as_str(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All Applications",
            Self::Status(s) => s.label(),
        }
    }

    pub fn matches(&self, application: &JobApplication) -> bool {
        match self {
            Self::All => true,
            Self::Status(s) => application.status() == *s,
        }
    }

    /// Every option of the dropdown, "all" first.
    pub fn options() -> Vec<Self> {
        std::iter::once(Self::All)
            .chain(ApplicationStatus::ALL.into_iter().map(Self::Status))
            .collect()
    }

    /// How many of `applications` this option would show.
    pub fn count(&self, applications: &[JobApplication]) -> usize {
        applications.iter().filter(|a| self.matches(a)).count()
    }
}

/// "Today", "Yesterday" or "N days ago", by calendar day in the display timezone.
pub fn days_ago_label(when: DateTime<Utc>, now: DateTime<Utc>, offset: FixedOffset) -> String {
    let then = when.with_timezone(&offset).date_naive();
    let today = now.with_timezone(&offset).date_naive();
    match (today - then).num_days().abs() {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        n => format!("{n} days ago"),
    }
}

/// Lowercased extension of `file_name`, `bin` when it has none.
pub fn extension(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_lowercase(),
        _ => "bin".to_string(),
    }
}

/// `{user_id}/{unix_millis}-{nonce}.{ext}` in the resumes bucket.
pub fn resume_upload_path(user_id: &str, unix_millis: i64, nonce: &str, file_name: &str) -> String {
    format!("{user_id}/{unix_millis}-{nonce}.{}", extension(file_name))
}

/// `event-images/{event_id}-{unix_millis}.{ext}` in the event images bucket.
pub fn event_image_path(event_id: &str, unix_millis: i64, file_name: &str) -> String {
    format!("event-images/{event_id}-{unix_millis}.{}", extension(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn application(status: &str) -> JobApplication {
        serde_json::from_value(serde_json::json!({ "id": status, "status": status })).unwrap()
    }

    #[test]
    fn filter_counts_legacy_statuses_with_their_successor() {
        let apps = vec![
            application("submitted"),
            application("reviewed"),
            application("reviewing"),
            application("hired"),
        ];
        assert_eq!(ApplicationFilter::All.count(&apps), 4);
        assert_eq!(ApplicationFilter::parse("reviewing").count(&apps), 2);
        assert_eq!(ApplicationFilter::parse("offered").count(&apps), 1);
        assert_eq!(ApplicationFilter::parse("bogus"), ApplicationFilter::All);
        assert_eq!(ApplicationFilter::options().len(), 7);
        assert_eq!(ApplicationFilter::options()[0].as_str(), "all");
    }

    #[test]
    fn days_ago_uses_calendar_days() {
        let offset = FixedOffset::east_opt(330 * 60).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 4, 10, 6, 0, 0).unwrap();

        let earlier_today = Utc.with_ymd_and_hms(2025, 4, 10, 0, 0, 0).unwrap();
        assert_eq!(days_ago_label(earlier_today, now, offset), "Today");

        // 17:00 UTC on the 9th is the 9th in IST too.
        let yesterday = Utc.with_ymd_and_hms(2025, 4, 9, 17, 0, 0).unwrap();
        assert_eq!(days_ago_label(yesterday, now, offset), "Yesterday");

        let week = Utc.with_ymd_and_hms(2025, 4, 3, 6, 0, 0).unwrap();
        assert_eq!(days_ago_label(week, now, offset), "7 days ago");
    }

    #[test]
    fn object_paths() {
        assert_eq!(
            resume_upload_path("u1", 1_700_000_000_000, "k3j9x", "My CV.PDF"),
            "u1/1700000000000-k3j9x.pdf"
        );
        assert_eq!(
            event_image_path("e9", 1_700_000_000_000, "banner.png"),
            "event-images/e9-1700000000000.png"
        );
        assert_eq!(extension("README"), "bin");
        assert_eq!(extension(".hidden"), "bin");
    }
}
