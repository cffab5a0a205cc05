use dioxus::prelude::*;

use store::events::format_local;
use store::feedback::{csv_filename, is_dashboard_forbidden, to_csv, FeedbackStats};
use store::EventFeedback;

use crate::components::{use_toast, Alert, Button, ButtonVariant, Spinner, ToastOptions};
use crate::download::download_text;
use crate::icons::{FaArrowLeft, FaDownload, FaStar};
use crate::{use_app_config, use_table_changes, Icon, RequireAuth};

const VIEWS_CSS: Asset = asset!("/src/views/views.css");

/// Organiser view of all feedback for one event.
#[component]
pub fn FeedbackDashboardView(event_id: String, on_back: EventHandler<String>) -> Element {
    rsx! {
        RequireAuth {
            message: "Please sign in to view feedback.",
            Dashboard { event_id, on_back }
        }
    }
}

#[component]
fn Dashboard(event_id: String, on_back: EventHandler<String>) -> Element {
    let config = use_app_config();
    let toast_api = use_toast();
    let revision = use_table_changes("event_feedback");

    let load_id = event_id.clone();
    let mut dashboard = use_resource(move || {
        let id = load_id.clone();
        let _ = revision();
        async move { api::get_feedback_dashboard(id).await.map_err(|e| e.to_string()) }
    });

    // Callers without access are sent back to the event with the reason.
    // Any other failure stays on the page with a retry.
    let redirect_id = event_id.clone();
    use_effect(move || {
        if let Some(Err(e)) = &*dashboard.read() {
            if is_dashboard_forbidden(e) {
                toast_api.error(e.clone(), ToastOptions::new());
                on_back.call(redirect_id.clone());
            }
        }
    });

    let offset = config().offset();
    let back_id = event_id.clone();

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        div {
            class: "view-page",

            Button {
                variant: ButtonVariant::Ghost,
                onclick: move |_| on_back.call(back_id.clone()),
                Icon { icon: FaArrowLeft, width: 12, height: 12 }
                " Back to event"
            }

            match &*dashboard.read() {
                None => rsx! { Spinner { label: "Loading feedback..." } },
                Some(Err(e)) => rsx! {
                    Alert { message: e.clone() }
                    Button {
                        variant: ButtonVariant::Outline,
                        onclick: move |_| dashboard.restart(),
                        "Retry"
                    }
                },
                Some(Ok(data)) => {
                    let csv = to_csv(&data.feedback, offset);
                    let filename = csv_filename(&data.event.title, chrono::Utc::now(), offset);
                    let has_feedback = !data.feedback.is_empty();
                    rsx! {
                        div {
                            class: "view-header",
                            div {
                                h1 { class: "view-title", "Feedback Dashboard" }
                                p { class: "muted", "{data.event.title}" }
                            }
                            Button {
                                variant: ButtonVariant::Outline,
                                disabled: !has_feedback,
                                onclick: move |_| {
                                    match download_text(&filename, "text/csv;charset=utf-8", &csv) {
                                        Ok(()) => tracing::info!("Exported {}", filename),
                                        Err(e) => toast_api.error(format!("Export failed: {e}"), ToastOptions::new()),
                                    }
                                },
                                Icon { icon: FaDownload, width: 14, height: 14 }
                                " Export CSV"
                            }
                        }

                        StatsPanel { stats: data.stats.clone() }

                        section {
                            class: "card",
                            h2 { class: "section-title", "Responses" }
                            if has_feedback {
                                ul {
                                    class: "feedback-list",
                                    for item in data.feedback.iter() {
                                        FeedbackItem {
                                            key: "{item.id}",
                                            item: item.clone(),
                                            date: item
                                                .submitted_at
                                                .map(|d| format_local(d, offset, "%b %-d, %Y"))
                                                .unwrap_or_default(),
                                        }
                                    }
                                }
                            } else {
                                p { class: "muted", "No feedback has been submitted for this event yet." }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn StatsPanel(stats: FeedbackStats) -> Element {
    rsx! {
        div {
            class: "stat-grid",
            div { class: "stat card",
                span { class: "stat-label", "Total responses" }
                span { class: "stat-value", "{stats.total_responses}" }
            }
            div { class: "stat card",
                span { class: "stat-label", "Average rating" }
                span { class: "stat-value", "{stats.average_label()} / 5" }
            }
            div { class: "stat card",
                span { class: "stat-label", "Would recommend" }
                span { class: "stat-value", "{stats.recommend_percent}%" }
                span { class: "muted", "{stats.recommend_yes} yes · {stats.recommend_no} no" }
            }
            div { class: "stat card",
                span { class: "stat-label", "Comments" }
                span { class: "stat-value", "{stats.comment_count}" }
            }
        }

        section {
            class: "card",
            h2 { class: "section-title", "Rating distribution" }
            for stars in (1u8..=5).rev() {
                div {
                    key: "{stars}",
                    class: "bar-row",
                    span { class: "bar-label", "{stars} ★" }
                    div {
                        class: "bar-track",
                        div { class: "bar-fill", style: "width: {stats.share_of(stars)}%" }
                    }
                    span { class: "bar-count", "{stats.distribution[(stars - 1) as usize]}" }
                }
            }
        }
    }
}

#[component]
fn FeedbackItem(item: EventFeedback, date: String) -> Element {
    let rating = item.rating.unwrap_or(0);
    rsx! {
        li {
            class: "feedback-item",
            div {
                class: "section-header",
                span { class: "person-name", "{item.author_name()}" }
                span { class: "muted", "{date}" }
            }
            div {
                class: "star-row small",
                for star in 1u8..=5 {
                    span {
                        key: "{star}",
                        class: if star <= rating { "star filled" } else { "star" },
                        Icon { icon: FaStar, width: 12, height: 12 }
                    }
                }
                if let Some(recommend) = item.would_recommend {
                    span { class: "chip", "Recommends: {recommend.as_str()}" }
                }
            }
            if item.has_comment() {
                p { class: "card-text", "{item.comments.clone().unwrap_or_default()}" }
            }
        }
    }
}
