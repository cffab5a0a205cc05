use dioxus::prelude::*;

use store::events::{format_local, EventStatus};
use store::{AttendanceStatus, Attendee, Event};

use crate::components::{use_toast, Alert, Button, ButtonVariant, Spinner, ToastOptions};
use crate::icons::{FaArrowLeft, FaCalendarDays, FaLocationDot, FaUsers, FaVideo};
use crate::views::ConfirmDialog;
use crate::{use_app_config, use_auth, Icon, Markdown};

const VIEWS_CSS: Asset = asset!("/src/views/views.css");

/// One event: details, RSVP, attendees and organiser actions.
#[component]
pub fn EventDetailView(
    id: String,
    on_back: EventHandler<()>,
    on_edit: EventHandler<String>,
    on_deleted: EventHandler<()>,
    on_open_feedback: EventHandler<String>,
    on_open_dashboard: EventHandler<String>,
) -> Element {
    // Track the id in a signal so resources re-run on route param change
    let mut id_signal = use_signal(|| id.clone());
    if *id_signal.peek() != id {
        id_signal.set(id.clone());
    }

    let auth = use_auth();
    let config = use_app_config();
    let toast_api = use_toast();

    let event = use_resource(move || async move {
        api::get_event(id_signal()).await.map_err(|e| e.to_string())
    });
    let mut attendees = use_resource(move || async move {
        api::list_attendees(id_signal()).await.map_err(|e| e.to_string())
    });
    let mut my_rsvp = use_signal(|| Option::<AttendanceStatus>::None);
    let _rsvp_loader = use_resource(move || async move {
        let signed_in = auth().user.is_some();
        let id = id_signal();
        if signed_in {
            if let Ok(rsvp) = api::get_my_rsvp(id).await {
                my_rsvp.set(rsvp.map(|r| r.attendance_status));
            }
        } else {
            my_rsvp.set(None);
        }
    });

    let mut rsvp_busy = use_signal(|| false);
    let mut show_delete = use_signal(|| false);
    let mut deleting = use_signal(|| false);

    let handle_rsvp = move |status: AttendanceStatus| {
        spawn(async move {
            rsvp_busy.set(true);
            match api::rsvp_event(id_signal(), status).await {
                Ok(rsvp) => {
                    my_rsvp.set(Some(rsvp.attendance_status));
                    attendees.restart();
                    toast_api.success(
                        format!("You're marked as {}", status.label()),
                        ToastOptions::new(),
                    );
                }
                Err(e) => {
                    tracing::warn!("RSVP failed: {}", e);
                    toast_api.error(e.to_string(), ToastOptions::new());
                }
            }
            rsvp_busy.set(false);
        });
    };

    let handle_delete = move |_| {
        spawn(async move {
            deleting.set(true);
            match api::delete_event(id_signal()).await {
                Ok(()) => {
                    toast_api.success("Event deleted".to_string(), ToastOptions::new());
                    show_delete.set(false);
                    on_deleted.call(());
                }
                Err(e) => {
                    toast_api.error(format!("Delete failed: {e}"), ToastOptions::new());
                }
            }
            deleting.set(false);
        });
    };

    let now = chrono::Utc::now();
    let offset = config().offset();
    let state = auth();

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        div {
            class: "view-page view-narrow",

            Button {
                variant: ButtonVariant::Ghost,
                onclick: move |_| on_back.call(()),
                Icon { icon: FaArrowLeft, width: 12, height: 12 }
                " All events"
            }

            match &*event.read() {
                None => rsx! { Spinner { label: "Loading event..." } },
                Some(Err(e)) => rsx! { Alert { message: e.clone() } },
                Some(Ok(event)) => {
                    let can_manage = state
                        .user
                        .as_ref()
                        .is_some_and(|u| u.is_admin() || event.is_organized_by(&u.id));
                    let going = match &*attendees.read() {
                        Some(Ok(list)) => list.len(),
                        _ => 0,
                    };
                    rsx! {
                        EventHeader {
                            event: event.clone(),
                            status: EventStatus::classify(event, now),
                            when: format!(
                                "{} – {}",
                                format_local(event.start_date, offset, "%A, %B %-d, %Y · %-I:%M %p"),
                                format_local(event.end_date, offset, "%-I:%M %p"),
                            ),
                        }

                        if can_manage {
                            div {
                                class: "toolbar",
                                Button {
                                    variant: ButtonVariant::Outline,
                                    onclick: {
                                        let id = event.id.clone();
                                        move |_| on_edit.call(id.clone())
                                    },
                                    "Edit"
                                }
                                Button {
                                    variant: ButtonVariant::Outline,
                                    onclick: {
                                        let id = event.id.clone();
                                        move |_| on_open_dashboard.call(id.clone())
                                    },
                                    "Feedback dashboard"
                                }
                                Button {
                                    variant: ButtonVariant::Destructive,
                                    onclick: move |_| show_delete.set(true),
                                    "Delete"
                                }
                            }
                        }

                        section {
                            class: "card",
                            h2 { class: "section-title", "About this event" }
                            Markdown { source: event.description.clone() }
                            if let Some(cost) = event.cost.as_ref().filter(|c| !c.trim().is_empty()) {
                                p { class: "card-meta", "Cost: {cost}" }
                            }
                            if let Some(tags) = event.tags.as_ref().filter(|t| !t.is_empty()) {
                                div {
                                    class: "card-chips",
                                    for tag in tags.iter() {
                                        span { key: "{tag}", class: "chip", "#{tag}" }
                                    }
                                }
                            }
                        }

                        RsvpPanel {
                            event: event.clone(),
                            signed_in: state.user.is_some(),
                            current: my_rsvp(),
                            going,
                            busy: rsvp_busy(),
                            ended: event.has_ended(now),
                            on_rsvp: handle_rsvp,
                        }

                        if event.has_ended(now) && state.user.is_some() {
                            section {
                                class: "card",
                                h2 { class: "section-title", "How was it?" }
                                p { class: "muted", "Share your feedback with the organisers." }
                                Button {
                                    onclick: {
                                        let id = event.id.clone();
                                        move |_| on_open_feedback.call(id.clone())
                                    },
                                    "Give feedback"
                                }
                            }
                        }

                        match &*attendees.read() {
                            None => rsx! { Spinner { label: "Loading attendees..." } },
                            Some(Err(e)) => rsx! {
                                section {
                                    class: "card",
                                    h2 { class: "section-title", "Attendees" }
                                    Alert { message: format!("Could not load attendees: {e}") }
                                    Button {
                                        variant: ButtonVariant::Outline,
                                        onclick: move |_| attendees.restart(),
                                        "Retry"
                                    }
                                }
                            },
                            Some(Ok(list)) => rsx! { AttendeeList { attendees: list.clone() } },
                        }
                    }
                }
            }

            if show_delete() {
                ConfirmDialog {
                    title: "Delete event?",
                    message: "This permanently removes the event, its RSVPs and feedback.",
                    busy: deleting(),
                    on_confirm: handle_delete,
                    on_cancel: move |_| show_delete.set(false),
                }
            }
        }
    }
}

#[component]
fn EventHeader(event: Event, status: EventStatus, when: String) -> Element {
    rsx! {
        if let Some(url) = &event.featured_image_url {
            img { class: "hero-image", src: "{url}", alt: "{event.title}" }
        }
        div {
            class: "card-chips",
            span { class: "chip", "{status.label()}" }
            span { class: "chip", "{event.type_label()}" }
        }
        h1 { class: "view-title", "{event.title}" }
        p {
            class: "card-meta",
            Icon { icon: FaCalendarDays, width: 12, height: 12 }
            " {when}"
        }
        p {
            class: "card-meta",
            if event.is_virtual_event() {
                Icon { icon: FaVideo, width: 12, height: 12 }
                if let Some(link) = &event.virtual_link {
                    " "
                    a { href: "{link}", target: "_blank", rel: "noopener", "Join online" }
                } else {
                    " Virtual event"
                }
            } else {
                Icon { icon: FaLocationDot, width: 12, height: 12 }
                " {event.location_text()}"
            }
        }
    }
}

#[component]
fn RsvpPanel(
    event: Event,
    signed_in: bool,
    current: Option<AttendanceStatus>,
    going: usize,
    busy: bool,
    ended: bool,
    on_rsvp: EventHandler<AttendanceStatus>,
) -> Element {
    let capacity = match event.max_attendees {
        Some(max) => format!("{going} / {max} going"),
        None => format!("{going} going"),
    };
    let full = event
        .max_attendees
        .is_some_and(|max| going as i64 >= max as i64)
        && current != Some(AttendanceStatus::Going);

    rsx! {
        section {
            class: "card",
            div {
                class: "section-header",
                h2 { class: "section-title", "RSVP" }
                span {
                    class: "card-meta",
                    Icon { icon: FaUsers, width: 12, height: 12 }
                    " {capacity}"
                }
            }
            if ended {
                p { class: "muted", "This event has already ended." }
            } else if !signed_in {
                p {
                    class: "muted",
                    a { href: "/login", "Sign in" }
                    " to RSVP."
                }
            } else {
                if let Some(status) = current {
                    p { class: "muted", "You're marked as {status.label()}." }
                }
                if full {
                    p { class: "muted", "This event is full." }
                }
                div {
                    class: "toolbar",
                    for status in [AttendanceStatus::Going, AttendanceStatus::Maybe, AttendanceStatus::NotGoing] {
                        Button {
                            key: "{status.as_str()}",
                            variant: if current == Some(status) { ButtonVariant::Primary } else { ButtonVariant::Outline },
                            disabled: busy || (full && status == AttendanceStatus::Going),
                            onclick: move |_| on_rsvp.call(status),
                            "{rsvp_label(status)}"
                        }
                    }
                }
            }
        }
    }
}

fn rsvp_label(status: AttendanceStatus) -> &'static str {
    match status {
        AttendanceStatus::Going => "Going",
        AttendanceStatus::Maybe => "Maybe",
        AttendanceStatus::NotGoing => "Can't go",
    }
}

#[component]
fn AttendeeList(attendees: Vec<Attendee>) -> Element {
    rsx! {
        section {
            class: "card",
            h2 { class: "section-title", "Attendees ({attendees.len()})" }
            if attendees.is_empty() {
                p { class: "muted", "No one has RSVP'd yet. Be the first!" }
            } else {
                ul {
                    class: "people-list",
                    for attendee in attendees.iter() {
                        li {
                            key: "{attendee.profile.id}",
                            img { class: "avatar", src: "{attendee.profile.avatar()}", alt: "" }
                            div {
                                span { class: "person-name", "{attendee.profile.display_name()}" }
                                if let Some(position) = &attendee.profile.current_position {
                                    span { class: "person-meta", "{position}" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
