//! # Calendar month grid
//!
//! Lays events out on a Sunday-first month grid in the display timezone.
//! [`MonthCursor`] is the prev/next/today navigation state, [`MonthGrid`]
//! the rendered weeks, and [`CategoryFilter`] the chip row above the grid.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, StoreError};
use crate::events::{day_bounds, format_local};
use crate::models::Event;
use crate::query::{Filter, Query};

/// Years a cursor may point at. Keeps every derived date and timestamp
/// inside chrono's range.
const YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// The month currently shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCursor {
    pub year: i32,
    pub month: u32,
}

impl MonthCursor {
    /// A cursor from untrusted input; `month` is 1-based.
    pub fn new(year: i32, month: u32) -> Result<Self, StoreError> {
        let cursor = Self { year, month };
        cursor.validate()?;
        Ok(cursor)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        let mut errors = Vec::new();
        if !(1..=12).contains(&self.month) {
            errors.push(FieldError::new("month", "Month must be between 1 and 12"));
        }
        if !YEARS.contains(&self.year) {
            errors.push(FieldError::new("year", "Year is out of range"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(errors))
        }
    }

    /// The month containing `now` in the display timezone.
    pub fn containing(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local = now.with_timezone(&offset);
        Self {
            year: local.year(),
            month: local.month(),
        }
    }

    /// First day of the month. Out-of-range cursors are clamped.
    pub fn first_day(&self) -> NaiveDate {
        let year = self.year.clamp(*YEARS.start(), *YEARS.end());
        NaiveDate::from_ymd_opt(year, self.month.clamp(1, 12), 1).unwrap_or_default()
    }

    pub fn last_day(&self) -> NaiveDate {
        let first = self.first_day();
        first
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(first)
    }

    pub fn prev(&self) -> Self {
        let first = self.first_day();
        Self::from_date(first.checked_sub_months(Months::new(1)).unwrap_or(first))
    }

    pub fn next(&self) -> Self {
        let first = self.first_day();
        Self::from_date(first.checked_add_months(Months::new(1)).unwrap_or(first))
    }

    /// "May 2025".
    pub fn title(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }

    /// First and last day shown on the grid, padded to whole weeks.
    pub fn grid_range(&self) -> (NaiveDate, NaiveDate) {
        let first = self.first_day();
        let last = self.last_day();
        let lead = Duration::days(first.weekday().num_days_from_sunday() as i64);
        let trail = Duration::days(6 - last.weekday().num_days_from_sunday() as i64);
        let start = first.checked_sub_signed(lead).unwrap_or(first);
        let end = last.checked_add_signed(trail).unwrap_or(last);
        (start, end)
    }

    /// Events overlapping any day on the grid, ordered by start.
    pub fn query(&self, offset: FixedOffset) -> Query {
        let (start, end) = self.grid_range();
        let (grid_start, _) = day_bounds(start, offset);
        let (_, grid_end) = day_bounds(end, offset);
        Query::table("events")
            .filter(Filter::lte("start_date", grid_end.to_rfc3339()))
            .filter(Filter::gte("end_date", grid_start.to_rfc3339()))
            .order_by("start_date", true)
    }

    fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

/// The calendar's category chips.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    Virtual,
    InPerson,
    Type(String),
}

impl CategoryFilter {
    pub fn parse(s: &str) -> Self {
        match s {
            "" | "all" => Self::All,
            "virtual" => Self::Virtual,
            "in-person" => Self::InPerson,
            other => Self::Type(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Virtual => "virtual",
            Self::InPerson => "in-person",
            Self::Type(t) => t,
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Self::All => true,
            Self::Virtual => event.is_virtual_event(),
            Self::InPerson => !event.is_virtual_event(),
            Self::Type(t) => event.event_type.as_deref().unwrap_or("general") == t,
        }
    }
}

/// One event as shown inside a day cell or the agenda.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub event_id: String,
    pub title: String,
    /// Local start time, `HH:MM`.
    pub time: String,
    pub is_virtual: bool,
    pub category: String,
}

impl CalendarEntry {
    pub fn from_event(event: &Event, offset: FixedOffset) -> Self {
        Self {
            event_id: event.id.clone(),
            title: event.title.clone(),
            time: format_local(event.start_date, offset, "%H:%M"),
            is_virtual: event.is_virtual_event(),
            category: event.event_type.clone().unwrap_or_else(|| "general".into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub entries: Vec<CalendarEntry>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MonthGrid {
    pub cursor: MonthCursor,
    pub weeks: Vec<Vec<CalendarDay>>,
}

impl MonthGrid {
    /// Lay out `events` (already category-filtered) for `cursor`.
    pub fn build(
        cursor: MonthCursor,
        events: &[Event],
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> Self {
        let (start, end) = cursor.grid_range();
        let today = now.with_timezone(&offset).date_naive();

        let mut weeks = Vec::new();
        let mut week = Vec::with_capacity(7);
        let mut date = start;
        while date <= end {
            let entries = events
                .iter()
                .filter(|e| overlaps_day(e, date, offset))
                .map(|e| CalendarEntry::from_event(e, offset))
                .collect();
            week.push(CalendarDay {
                date,
                in_month: date.month() == cursor.first_day().month(),
                is_today: date == today,
                entries,
            });
            if week.len() == 7 {
                weeks.push(std::mem::take(&mut week));
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }

        Self { cursor, weeks }
    }
}

/// Events of the cursor's month, ordered by start.
pub fn agenda(cursor: MonthCursor, events: &[Event], offset: FixedOffset) -> Vec<CalendarEntry> {
    let (month_start, _) = day_bounds(cursor.first_day(), offset);
    let (_, month_end) = day_bounds(cursor.last_day(), offset);
    let mut in_month: Vec<&Event> = events
        .iter()
        .filter(|e| e.start_date <= month_end && e.end_date >= month_start)
        .collect();
    in_month.sort_by_key(|e| e.start_date);
    in_month
        .into_iter()
        .map(|e| CalendarEntry::from_event(e, offset))
        .collect()
}

fn overlaps_day(event: &Event, date: NaiveDate, offset: FixedOffset) -> bool {
    let first = event.start_date.with_timezone(&offset).date_naive();
    let last = event.end_date.with_timezone(&offset).date_naive();
    first <= date && date <= last.max(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(330 * 60).unwrap()
    }

    fn event(id: &str, start: &str, end: &str, location: &str, event_type: &str) -> Event {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("Event {id}"),
            "start_date": start,
            "end_date": end,
            "location": location,
            "event_type": event_type,
        }))
        .unwrap()
    }

    #[test]
    fn grid_starts_on_sunday_and_pads_weeks() {
        // June 2025 starts on a Sunday and ends on a Monday.
        let cursor = MonthCursor { year: 2025, month: 6 };
        let (start, end) = cursor.grid_range();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 7, 5).unwrap());

        let grid = MonthGrid::build(cursor, &[], Utc::now(), ist());
        assert_eq!(grid.weeks.len(), 5);
        assert!(grid.weeks.iter().all(|w| w.len() == 7));
        assert!(!grid.weeks[4][6].in_month);

        // March 2025 needs six rows.
        let march = MonthCursor { year: 2025, month: 3 };
        assert_eq!(MonthGrid::build(march, &[], Utc::now(), ist()).weeks.len(), 6);
    }

    #[test]
    fn navigation_wraps_years() {
        let jan = MonthCursor { year: 2025, month: 1 };
        assert_eq!(jan.prev(), MonthCursor { year: 2024, month: 12 });
        assert_eq!(jan.prev().next(), jan);
        assert_eq!(jan.title(), "January 2025");

        let now = Utc.with_ymd_and_hms(2025, 1, 31, 20, 0, 0).unwrap();
        assert_eq!(MonthCursor::containing(now, ist()), MonthCursor { year: 2025, month: 2 });
    }

    #[test]
    fn rejects_out_of_range_months() {
        for month in [0, 13] {
            let err = MonthCursor::new(2025, month).unwrap_err();
            assert_eq!(err.field_errors()[0].field, "month");
        }
        assert!(MonthCursor::new(0, 5).is_err());
        assert_eq!(MonthCursor::new(2025, 12).unwrap(), MonthCursor { year: 2025, month: 12 });
    }

    #[test]
    fn out_of_range_cursors_do_not_panic() {
        for cursor in [
            MonthCursor { year: 2025, month: 0 },
            MonthCursor { year: 2025, month: 13 },
            MonthCursor { year: i32::MIN, month: 1 },
            MonthCursor { year: i32::MAX, month: 12 },
        ] {
            let _ = cursor.prev();
            let _ = cursor.next();
            let _ = cursor.grid_range();
            let _ = cursor.query(ist());
            let grid = MonthGrid::build(cursor, &[], Utc::now(), ist());
            assert!(!grid.weeks.is_empty());
        }
        let clamped = MonthCursor { year: 2025, month: 13 };
        assert_eq!(clamped.first_day(), NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
    }

    #[test]
    fn multi_day_events_fill_each_day() {
        let cursor = MonthCursor { year: 2025, month: 6 };
        let events = vec![event(
            "a",
            "2025-06-10T04:30:00Z",
            "2025-06-12T10:00:00Z",
            "Hall",
            "conference",
        )];
        let now = Utc.with_ymd_and_hms(2025, 6, 11, 6, 0, 0).unwrap();
        let grid = MonthGrid::build(cursor, &events, now, ist());

        let days: Vec<&CalendarDay> = grid.weeks.iter().flatten().collect();
        let with_event: Vec<u32> = days
            .iter()
            .filter(|d| !d.entries.is_empty())
            .map(|d| d.date.day())
            .collect();
        assert_eq!(with_event, vec![10, 11, 12]);
        assert!(days.iter().any(|d| d.is_today && d.date.day() == 11));
        assert_eq!(days[9].entries[0].time, "10:00");
    }

    #[test]
    fn category_filter_modes() {
        let online = event("a", "2025-06-01T00:00:00Z", "2025-06-01T01:00:00Z", "Online", "webinar");
        let hall = event("b", "2025-06-01T00:00:00Z", "2025-06-01T01:00:00Z", "Hall", "workshop");

        assert!(CategoryFilter::parse("virtual").matches(&online));
        assert!(!CategoryFilter::parse("virtual").matches(&hall));
        assert!(CategoryFilter::parse("in-person").matches(&hall));
        assert!(CategoryFilter::parse("workshop").matches(&hall));
        assert!(!CategoryFilter::parse("workshop").matches(&online));
        assert!(CategoryFilter::parse("all").matches(&online));
    }

    #[test]
    fn agenda_lists_month_events_in_order() {
        let cursor = MonthCursor { year: 2025, month: 6 };
        let events = vec![
            event("late", "2025-06-20T00:00:00Z", "2025-06-20T01:00:00Z", "Hall", "social"),
            event("early", "2025-06-02T00:00:00Z", "2025-06-02T01:00:00Z", "Hall", "social"),
            event("july", "2025-07-02T00:00:00Z", "2025-07-02T01:00:00Z", "Hall", "social"),
        ];
        let ids: Vec<String> = agenda(cursor, &events, ist())
            .into_iter()
            .map(|e| e.event_id)
            .collect();
        assert_eq!(ids, vec!["early", "late"]);
    }
}
