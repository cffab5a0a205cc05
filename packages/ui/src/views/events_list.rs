use dioxus::prelude::*;

use store::events::{preview, format_local, EventListFilter, EventStatus, StatusFilter};
use store::models::EVENT_TYPES;
use store::Event;

use crate::components::{Button, ButtonVariant, Input, Spinner};
use crate::icons::{FaCalendarDays, FaLocationDot, FaMagnifyingGlass, FaPlus, FaVideo};
use crate::{use_app_config, use_auth, use_filtered_table_changes, Icon};

const VIEWS_CSS: Asset = asset!("/src/views/views.css");

/// Filterable list of events with live refresh.
#[component]
pub fn EventsListView(
    on_open_event: EventHandler<String>,
    on_edit_event: EventHandler<String>,
    on_create_event: EventHandler<()>,
    on_open_calendar: EventHandler<()>,
) -> Element {
    let auth = use_auth();
    let config = use_app_config();
    let mut status = use_signal(StatusFilter::default);
    let mut event_type = use_signal(|| "all".to_string());
    let mut search = use_signal(String::new);

    // Re-subscribe whenever the server-side filters change.
    let revision = use_filtered_table_changes("events", move || {
        EventListFilter {
            status: status(),
            event_type: Some(event_type()),
            search: String::new(),
        }
        .change_filter()
    });

    let mut events = use_resource(move || {
        let filter = EventListFilter {
            status: status(),
            event_type: Some(event_type()),
            search: String::new(),
        };
        // Re-run on every table change.
        let _ = revision();
        async move { api::list_events(filter).await.map_err(|e| e.to_string()) }
    });

    let filter = EventListFilter {
        status: status(),
        event_type: Some(event_type()),
        search: search(),
    };
    let is_admin = auth().is_admin();
    let offset = config().offset();
    let preview_chars = config().display.description_preview_chars;
    let now = chrono::Utc::now();

    let mut clear_filters = move || {
        status.set(StatusFilter::All);
        event_type.set("all".to_string());
        search.set(String::new());
    };

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        div {
            class: "view-page",

            div {
                class: "view-header",
                div {
                    h1 { class: "view-title", "Events" }
                    p { class: "muted", "Reunions, workshops and meetups from the alumni network" }
                }
                div {
                    class: "view-header-actions",
                    Button {
                        variant: ButtonVariant::Outline,
                        onclick: move |_| on_open_calendar.call(()),
                        Icon { icon: FaCalendarDays, width: 14, height: 14 }
                        " Calendar"
                    }
                    if is_admin {
                        Button {
                            onclick: move |_| on_create_event.call(()),
                            Icon { icon: FaPlus, width: 14, height: 14 }
                            " Create Event"
                        }
                    }
                }
            }

            div {
                class: "filter-bar",
                div {
                    class: "search-field",
                    Icon { icon: FaMagnifyingGlass, width: 14, height: 14 }
                    Input {
                        placeholder: "Search events...",
                        value: search(),
                        oninput: move |evt: FormEvent| search.set(evt.value()),
                    }
                }
                select {
                    class: "select",
                    value: status().as_str(),
                    onchange: move |evt| status.set(StatusFilter::parse(&evt.value())),
                    for option in StatusFilter::ALL {
                        option { key: "{option.as_str()}", value: option.as_str(), "{option.label()}" }
                    }
                }
                select {
                    class: "select",
                    value: event_type(),
                    onchange: move |evt| event_type.set(evt.value()),
                    option { value: "all", "All Types" }
                    for t in EVENT_TYPES.iter() {
                        option { key: "{t}", value: *t, "{capitalize(t)}" }
                    }
                }
            }

            match &*events.read() {
                None => rsx! { Spinner { label: "Loading events..." } },
                Some(Err(e)) => rsx! {
                    div {
                        class: "empty-state",
                        h3 { "Failed to load events" }
                        p { class: "muted", "{e}" }
                        Button {
                            variant: ButtonVariant::Outline,
                            onclick: move |_| events.restart(),
                            "Retry"
                        }
                    }
                },
                Some(Ok(list)) => {
                    let shown = filter.apply_search(list.clone());
                    if shown.is_empty() {
                        rsx! {
                            div {
                                class: "empty-state",
                                if filter.is_filtered() {
                                    h3 { "No events match your filters" }
                                    p { class: "muted", "Try a different search or filter." }
                                    Button {
                                        variant: ButtonVariant::Outline,
                                        onclick: move |_| clear_filters(),
                                        "Clear all filters"
                                    }
                                } else {
                                    h3 { "No events yet" }
                                    p { class: "muted", "Check back soon for upcoming alumni events." }
                                }
                            }
                        }
                    } else {
                        rsx! {
                            div {
                                class: "card-grid",
                                for event in shown {
                                    EventCard {
                                        key: "{event.id}",
                                        event: event.clone(),
                                        status: EventStatus::classify(&event, now),
                                        date_label: format_local(event.start_date, offset, "%a, %b %-d, %Y · %-I:%M %p"),
                                        summary: preview(&event.description, preview_chars),
                                        can_edit: is_admin,
                                        on_open: on_open_event,
                                        on_edit: on_edit_event,
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
fn EventCard(
    event: Event,
    status: EventStatus,
    date_label: String,
    summary: String,
    can_edit: bool,
    on_open: EventHandler<String>,
    on_edit: EventHandler<String>,
) -> Element {
    let id = event.id.clone();
    let edit_id = event.id.clone();
    let chip = match status {
        EventStatus::Upcoming => "chip chip-upcoming",
        EventStatus::HappeningNow => "chip chip-live",
        EventStatus::Past => "chip chip-past",
    };

    rsx! {
        article {
            class: "card event-card",
            onclick: move |_| on_open.call(id.clone()),
            if let Some(url) = &event.featured_image_url {
                img { class: "card-image", src: "{url}", alt: "{event.title}" }
            }
            div {
                class: "card-body",
                div {
                    class: "card-chips",
                    span { class: "{chip}", "{status.label()}" }
                    span { class: "chip", "{event.type_label()}" }
                }
                h3 { class: "card-title", "{event.title}" }
                p { class: "card-meta", "{date_label}" }
                p {
                    class: "card-meta",
                    if event.is_virtual_event() {
                        Icon { icon: FaVideo, width: 12, height: 12 }
                        " Virtual"
                    } else {
                        Icon { icon: FaLocationDot, width: 12, height: 12 }
                        " {event.location_text()}"
                    }
                }
                p { class: "card-text", "{summary}" }
                if can_edit {
                    div {
                        class: "card-actions",
                        Button {
                            variant: ButtonVariant::Ghost,
                            onclick: move |evt: MouseEvent| {
                                evt.stop_propagation();
                                on_edit.call(edit_id.clone());
                            },
                            "Edit"
                        }
                    }
                }
            }
        }
    }
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
