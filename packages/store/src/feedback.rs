//! Feedback aggregation and CSV export for the feedback dashboard.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{EventFeedback, Recommendation};

/// Summary figures shown above the feedback list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackStats {
    pub total_responses: usize,
    /// Mean of the rated responses, `0.0` when nothing is rated.
    pub average_rating: f64,
    pub recommend_yes: usize,
    pub recommend_no: usize,
    /// Share of all responses that would recommend, rounded to a whole percent.
    pub recommend_percent: u32,
    pub comment_count: usize,
    /// Count of ratings 1 through 5, index 0 holding the 1-star count.
    pub distribution: [usize; 5],
}

impl FeedbackStats {
    pub fn compute(feedback: &[EventFeedback]) -> Self {
        let total_responses = feedback.len();
        if total_responses == 0 {
            return Self::default();
        }

        let mut distribution = [0usize; 5];
        let mut rating_sum = 0u32;
        let mut rated = 0u32;
        for rating in feedback.iter().filter_map(|f| f.rating) {
            if (1..=5).contains(&rating) {
                distribution[(rating - 1) as usize] += 1;
                rating_sum += rating as u32;
                rated += 1;
            }
        }

        let count = |want: Recommendation| {
            feedback
                .iter()
                .filter(|f| f.would_recommend == Some(want))
                .count()
        };
        let recommend_yes = count(Recommendation::Yes);

        Self {
            total_responses,
            average_rating: if rated == 0 {
                0.0
            } else {
                rating_sum as f64 / rated as f64
            },
            recommend_yes,
            recommend_no: count(Recommendation::No),
            recommend_percent: ((recommend_yes as f64 / total_responses as f64) * 100.0).round()
                as u32,
            comment_count: feedback.iter().filter(|f| f.has_comment()).count(),
            distribution,
        }
    }

    /// Average rating with one decimal, e.g. `"4.3"`.
    pub fn average_label(&self) -> String {
        format!("{:.1}", self.average_rating)
    }

    /// Percentage of responses that gave `stars`, for the distribution bars.
    pub fn share_of(&self, stars: u8) -> u32 {
        if self.total_responses == 0 || !(1..=5).contains(&stars) {
            return 0;
        }
        let n = self.distribution[(stars - 1) as usize];
        ((n as f64 / self.total_responses as f64) * 100.0).round() as u32
    }
}

/// Render feedback rows as CSV. Comments are always quoted.
pub fn to_csv(feedback: &[EventFeedback], offset: FixedOffset) -> String {
    let mut lines = vec!["Date,User,Rating,Would Recommend,Comments".to_string()];
    for item in feedback {
        let date = item
            .submitted_at
            .map(|d| d.with_timezone(&offset).format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let rating = item.rating.map(|r| r.to_string()).unwrap_or_default();
        let recommend = item
            .would_recommend
            .map(|r| r.as_str())
            .unwrap_or("N/A");
        let comments = item.comments.as_deref().unwrap_or("").replace('"', "\"\"");
        lines.push(format!(
            "{},{},{},{},\"{}\"",
            csv_field(&date),
            csv_field(item.author_name()),
            rating,
            recommend,
            comments
        ));
    }
    lines.join("\n")
}

/// Refusal shown to callers who may not see an event's feedback.
pub const DASHBOARD_FORBIDDEN: &str = "You do not have permission to view this feedback dashboard";

/// Whether a dashboard load failed because the caller lacks access, as
/// opposed to a network or backend failure. Matches wrapped messages too.
pub fn is_dashboard_forbidden(message: &str) -> bool {
    message.contains(DASHBOARD_FORBIDDEN)
}

/// `feedback-{title}-{YYYY-MM-DD}.csv`, dated in the display timezone.
pub fn csv_filename(event_title: &str, now: DateTime<Utc>, offset: FixedOffset) -> String {
    format!(
        "feedback-{}-{}.csv",
        event_title,
        now.with_timezone(&offset).format("%Y-%m-%d")
    )
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Profile;
    use chrono::TimeZone;

    fn feedback(rating: u8, recommend: Option<Recommendation>, comments: &str) -> EventFeedback {
        EventFeedback {
            id: format!("f{rating}"),
            event_id: Some("e1".into()),
            user_id: None,
            rating: Some(rating),
            would_recommend: recommend,
            comments: Some(comments.to_string()),
            submitted_at: Some(Utc.with_ymd_and_hms(2025, 3, 1, 20, 0, 0).unwrap()),
            profile: None,
        }
    }

    #[test]
    fn empty_feedback_gives_zero_stats() {
        let stats = FeedbackStats::compute(&[]);
        assert_eq!(stats, FeedbackStats::default());
        assert_eq!(stats.average_label(), "0.0");
        assert_eq!(stats.share_of(5), 0);
    }

    #[test]
    fn stats_round_average_and_percent() {
        let rows = vec![
            feedback(5, Some(Recommendation::Yes), "Great"),
            feedback(4, Some(Recommendation::Yes), "  "),
            feedback(4, Some(Recommendation::No), ""),
        ];
        let stats = FeedbackStats::compute(&rows);
        assert_eq!(stats.total_responses, 3);
        assert_eq!(stats.average_label(), "4.3");
        assert_eq!(stats.recommend_yes, 2);
        assert_eq!(stats.recommend_no, 1);
        assert_eq!(stats.recommend_percent, 67);
        assert_eq!(stats.comment_count, 1);
        assert_eq!(stats.distribution, [0, 0, 0, 2, 1]);
        assert_eq!(stats.share_of(4), 67);
    }

    #[test]
    fn csv_quotes_comments_and_fills_defaults() {
        let mut named = feedback(5, Some(Recommendation::Yes), "Loved the \"panel\", truly");
        named.profile = Some(Profile {
            id: "u1".into(),
            full_name: Some("Ravi Kumar".into()),
            ..Default::default()
        });
        let anonymous = feedback(3, None, "");

        let offset = FixedOffset::east_opt(330 * 60).unwrap();
        let csv = to_csv(&[named, anonymous], offset);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Date,User,Rating,Would Recommend,Comments");
        assert_eq!(
            lines[1],
            "2025-03-02,Ravi Kumar,5,yes,\"Loved the \"\"panel\"\", truly\""
        );
        assert_eq!(lines[2], "2025-03-02,Anonymous,3,N/A,\"\"");
    }

    #[test]
    fn filename_uses_local_date() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 20, 0, 0).unwrap();
        let offset = FixedOffset::east_opt(330 * 60).unwrap();
        assert_eq!(
            csv_filename("Homecoming", now, offset),
            "feedback-Homecoming-2025-03-02.csv"
        );
    }

    #[test]
    fn only_permission_refusals_count_as_forbidden() {
        assert!(is_dashboard_forbidden(DASHBOARD_FORBIDDEN));
        assert!(is_dashboard_forbidden(&format!(
            "error running server function: {DASHBOARD_FORBIDDEN} (details: None)"
        )));
        assert!(!is_dashboard_forbidden("error reaching server: connection refused"));
        assert!(!is_dashboard_forbidden("Event not found"));
    }
}
