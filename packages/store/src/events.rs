//! # Event list helpers
//!
//! Pure functions behind the events list and event form: turning the list's
//! filter controls into a [`Query`], the client-side text search, status
//! chips, description previews, and conversions between UTC timestamps and
//! the local date/time inputs of the display timezone.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Event;
use crate::query::{Filter, Query};

/// Where an event sits relative to "now".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventStatus {
    Upcoming,
    HappeningNow,
    Past,
}

impl EventStatus {
    pub fn classify(event: &Event, now: DateTime<Utc>) -> Self {
        if event.end_date < now {
            Self::Past
        } else if event.start_date > now {
            Self::Upcoming
        } else {
            Self::HappeningNow
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::HappeningNow => "Happening Now",
            Self::Past => "Past",
        }
    }
}

/// The list's status dropdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Upcoming,
    Past,
    Today,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 4] = [Self::All, Self::Upcoming, Self::Past, Self::Today];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Upcoming => "upcoming",
            Self::Past => "past",
            Self::Today => "today",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All Events",
            Self::Upcoming => "Upcoming",
            Self::Past => "Past",
            Self::Today => "Today",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "upcoming" => Self::Upcoming,
            "past" => Self::Past,
            "today" => Self::Today,
            _ => Self::All,
        }
    }
}

/// Filter state of the events list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventListFilter {
    pub status: StatusFilter,
    /// `None` for every type.
    pub event_type: Option<String>,
    /// Applied client-side after the fetch.
    #[serde(default)]
    pub search: String,
}

impl EventListFilter {
    /// Server-side part of the filter: status and type, ordered by start.
    pub fn to_query(&self, now: DateTime<Utc>, offset: FixedOffset) -> Query {
        let mut query = Query::table("events").order_by("start_date", true);

        match self.status {
            StatusFilter::All => {}
            StatusFilter::Upcoming => {
                query = query.filter(Filter::gt("start_date", now.to_rfc3339()));
            }
            StatusFilter::Past => {
                query = query.filter(Filter::lt("end_date", now.to_rfc3339()));
            }
            StatusFilter::Today => {
                let (start, end) = today_bounds(now, offset);
                query = query
                    .filter(Filter::gte("start_date", start.to_rfc3339()))
                    .filter(Filter::lte("end_date", end.to_rfc3339()));
            }
        }

        if let Some(event_type) = self.event_type.as_deref().filter(|t| *t != "all") {
            query = query.eq("event_type", event_type);
        }

        query
    }

    /// Realtime row filter matching the type part of [`EventListFilter::to_query`].
    pub fn change_filter(&self) -> Option<String> {
        self.event_type
            .as_deref()
            .filter(|t| *t != "all")
            .map(|t| format!("event_type=eq.{t}"))
    }

    /// Case-insensitive match on title, description or location.
    pub fn matches_search(&self, event: &Event) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [event.title.as_str(), event.description.as_str(), event.location_text()]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    pub fn apply_search(&self, events: Vec<Event>) -> Vec<Event> {
        events
            .into_iter()
            .filter(|e| self.matches_search(e))
            .collect()
    }

    /// True when any control differs from its default; an empty result is
    /// then "no matches" rather than "no events".
    pub fn is_filtered(&self) -> bool {
        self.status != StatusFilter::All
            || self.event_type.as_deref().is_some_and(|t| t != "all")
            || !self.search.trim().is_empty()
    }
}

/// First `max` characters of `text`, with `...` appended when cut.
pub fn preview(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

/// First and last instant of `date` in the display timezone, as UTC.
pub fn day_bounds(date: NaiveDate, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_naive_to_utc(date.and_time(NaiveTime::MIN), offset);
    let end = start + Duration::days(1) - Duration::milliseconds(1);
    (start, end)
}

/// [`day_bounds`] of the local day containing `now`.
pub fn today_bounds(now: DateTime<Utc>, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    day_bounds(now.with_timezone(&offset).date_naive(), offset)
}

/// Combine `YYYY-MM-DD` and `HH:MM` form inputs into a UTC timestamp.
pub fn local_to_utc(date: &str, time: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M:%S"))
        .ok()?;
    Some(local_naive_to_utc(date.and_time(time), offset))
}

/// Split a UTC timestamp into `YYYY-MM-DD` and `HH:MM` form inputs.
pub fn split_local(dt: DateTime<Utc>, offset: FixedOffset) -> (String, String) {
    let local = dt.with_timezone(&offset);
    (
        local.format("%Y-%m-%d").to_string(),
        local.format("%H:%M").to_string(),
    )
}

/// Format a UTC timestamp in the display timezone.
pub fn format_local(dt: DateTime<Utc>, offset: FixedOffset, fmt: &str) -> String {
    dt.with_timezone(&offset).format(fmt).to_string()
}

fn local_naive_to_utc(naive: NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
    // Fixed offsets never produce ambiguous or skipped local times.
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc() - Duration::seconds(offset.local_minus_utc() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(330 * 60).unwrap()
    }

    fn event(start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
        serde_json::from_value(serde_json::json!({
            "id": "e1",
            "title": "Alumni Mixer",
            "description": "Drinks and networking on the terrace",
            "start_date": start.to_rfc3339(),
            "end_date": end.to_rfc3339(),
            "location": "Main Campus",
        }))
        .unwrap()
    }

    #[test]
    fn status_chip_classification() {
        let now = Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap();
        let hour = Duration::hours(1);

        let past = event(now - hour * 3, now - hour);
        let upcoming = event(now + hour, now + hour * 2);
        let live = event(now - hour, now + hour);

        assert_eq!(EventStatus::classify(&past, now).label(), "Past");
        assert_eq!(EventStatus::classify(&upcoming, now).label(), "Upcoming");
        assert_eq!(EventStatus::classify(&live, now).label(), "Happening Now");
    }

    #[test]
    fn today_filter_uses_display_timezone() {
        // 20:00 UTC on May 10 is already May 11 in IST.
        let now = Utc.with_ymd_and_hms(2025, 5, 10, 20, 0, 0).unwrap();
        let filter = EventListFilter {
            status: StatusFilter::Today,
            ..Default::default()
        };
        let query = filter.to_query(now, ist());

        assert_eq!(query.table, "events");
        assert_eq!(query.order.as_ref().unwrap().column, "start_date");
        assert!(query.order.as_ref().unwrap().ascending);
        assert_eq!(
            query.filters,
            vec![
                Filter::gte("start_date", "2025-05-10T18:30:00+00:00"),
                Filter::lte("end_date", "2025-05-11T18:29:59.999+00:00"),
            ]
        );
    }

    #[test]
    fn type_filter_skips_all() {
        let now = Utc::now();
        let mut filter = EventListFilter {
            event_type: Some("all".into()),
            ..Default::default()
        };
        assert!(filter.to_query(now, ist()).filters.is_empty());
        assert!(!filter.is_filtered());
        assert_eq!(filter.change_filter(), None);

        filter.event_type = Some("webinar".into());
        assert_eq!(
            filter.to_query(now, ist()).filters,
            vec![Filter::eq("event_type", "webinar")]
        );
        assert!(filter.is_filtered());
        assert_eq!(filter.change_filter().as_deref(), Some("event_type=eq.webinar"));
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let now = Utc::now();
        let e = event(now, now + Duration::hours(1));
        let mut filter = EventListFilter::default();

        for needle in ["MIXER", "terrace", "main campus", ""] {
            filter.search = needle.to_string();
            assert!(filter.matches_search(&e), "{needle}");
        }
        filter.search = "gala".into();
        assert!(filter.apply_search(vec![e]).is_empty());
    }

    #[test]
    fn preview_truncates_on_characters() {
        assert_eq!(preview("short", 200), "short");
        let long = "é".repeat(205);
        let cut = preview(&long, 200);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }

    #[test]
    fn local_inputs_convert_to_utc() {
        let utc = local_to_utc("2025-07-23", "15:00", ist()).unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2025, 7, 23, 9, 30, 0).unwrap());
        assert_eq!(
            split_local(utc, ist()),
            ("2025-07-23".to_string(), "15:00".to_string())
        );
        assert!(local_to_utc("2025-13-01", "10:00", ist()).is_none());
        assert!(local_to_utc("2025-01-01", "", ist()).is_none());
    }
}
