use chrono::Datelike;
use dioxus::prelude::*;

use store::calendar::{agenda, CalendarEntry, CategoryFilter, MonthCursor, MonthGrid};
use store::models::EVENT_TYPES;

use crate::components::{Alert, Button, ButtonVariant, Spinner};
use crate::icons::{FaChevronLeft, FaChevronRight, FaList};
use crate::views::events_list::capitalize;
use crate::{use_app_config, use_table_changes, Icon};

const VIEWS_CSS: Asset = asset!("/src/views/views.css");

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[component]
pub fn EventCalendarView(on_open_event: EventHandler<String>, on_open_list: EventHandler<()>) -> Element {
    let config = use_app_config();
    let revision = use_table_changes("events");

    let mut cursor = use_signal(|| MonthCursor::containing(chrono::Utc::now(), config.peek().offset()));
    let mut category = use_signal(CategoryFilter::default);

    let events = use_resource(move || {
        let MonthCursor { year, month } = cursor();
        let category = category().as_str().to_string();
        let _ = revision();
        async move {
            api::list_month_events(year, month, category)
                .await
                .map_err(|e| e.to_string())
        }
    });

    let offset = config().offset();
    let now = chrono::Utc::now();
    let current = cursor();

    let mut chips = vec![
        ("all".to_string(), "All".to_string()),
        ("virtual".to_string(), "Virtual".to_string()),
        ("in-person".to_string(), "In-person".to_string()),
    ];
    chips.extend(EVENT_TYPES.iter().map(|t| (t.to_string(), capitalize(t))));

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        div {
            class: "view-page",

            div {
                class: "view-header",
                h1 { class: "view-title", "Event Calendar" }
                Button {
                    variant: ButtonVariant::Outline,
                    onclick: move |_| on_open_list.call(()),
                    Icon { icon: FaList, width: 14, height: 14 }
                    " List view"
                }
            }

            div {
                class: "calendar-nav",
                Button {
                    variant: ButtonVariant::Ghost,
                    title: "Previous month",
                    onclick: move |_| cursor.set(current.prev()),
                    Icon { icon: FaChevronLeft, width: 12, height: 12 }
                }
                h2 { class: "calendar-title", "{current.title()}" }
                Button {
                    variant: ButtonVariant::Ghost,
                    title: "Next month",
                    onclick: move |_| cursor.set(current.next()),
                    Icon { icon: FaChevronRight, width: 12, height: 12 }
                }
                Button {
                    variant: ButtonVariant::Outline,
                    onclick: move |_| cursor.set(MonthCursor::containing(chrono::Utc::now(), offset)),
                    "Today"
                }
            }

            div {
                class: "chip-row",
                for (value, label) in chips {
                    button {
                        key: "{value}",
                        class: if category().as_str() == value { "chip chip-active" } else { "chip" },
                        onclick: {
                            let value = value.clone();
                            move |_| category.set(CategoryFilter::parse(&value))
                        },
                        "{label}"
                    }
                }
            }

            match &*events.read() {
                None => rsx! { Spinner { label: "Loading calendar..." } },
                Some(Err(e)) => rsx! { Alert { message: format!("Failed to load events: {e}") } },
                Some(Ok(list)) => {
                    let grid = MonthGrid::build(current, list, now, offset);
                    let month_agenda = agenda(current, list, offset);
                    rsx! {
                        div {
                            class: "calendar-grid",
                            for day in WEEKDAYS {
                                div { key: "{day}", class: "calendar-weekday", "{day}" }
                            }
                            for week in grid.weeks.iter() {
                                for day in week.iter() {
                                    div {
                                        key: "{day.date}",
                                        class: match (day.in_month, day.is_today) {
                                            (_, true) => "calendar-day today",
                                            (true, false) => "calendar-day",
                                            (false, false) => "calendar-day outside",
                                        },
                                        span { class: "calendar-date", "{day.date.day()}" }
                                        for entry in day.entries.iter() {
                                            CalendarPill {
                                                key: "{entry.event_id}",
                                                entry: entry.clone(),
                                                on_open: on_open_event,
                                            }
                                        }
                                    }
                                }
                            }
                        }

                        section {
                            class: "card",
                            h2 { class: "section-title", "This month" }
                            if month_agenda.is_empty() {
                                p { class: "muted", "No events scheduled for {current.title()}." }
                            } else {
                                ul {
                                    class: "agenda",
                                    for entry in month_agenda {
                                        li {
                                            key: "{entry.event_id}",
                                            onclick: {
                                                let id = entry.event_id.clone();
                                                move |_| on_open_event.call(id.clone())
                                            },
                                            span { class: "agenda-time", "{entry.time}" }
                                            span { class: "agenda-title", "{entry.title}" }
                                            span { class: "chip", if entry.is_virtual { "Virtual" } else { "In-person" } }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn CalendarPill(entry: CalendarEntry, on_open: EventHandler<String>) -> Element {
    let id = entry.event_id.clone();
    rsx! {
        button {
            class: if entry.is_virtual { "calendar-pill virtual" } else { "calendar-pill" },
            title: "{entry.title}",
            onclick: move |_| on_open.call(id.clone()),
            span { class: "calendar-pill-time", "{entry.time}" }
            " {entry.title}"
        }
    }
}
