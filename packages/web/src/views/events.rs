use dioxus::prelude::*;

use ui::views::{
    EventCalendarView, EventDetailView, EventFeedbackView, EventFormView, EventsListView,
    FeedbackDashboardView,
};

use crate::Route;

#[component]
pub fn EventsList() -> Element {
    let nav = use_navigator();
    rsx! {
        EventsListView {
            on_open_event: move |id: String| { nav.push(Route::EventDetail { id }); },
            on_edit_event: move |id: String| { nav.push(Route::EventEdit { id }); },
            on_create_event: move |_| { nav.push(Route::EventCreate {}); },
            on_open_calendar: move |_| { nav.push(Route::EventCalendar {}); },
        }
    }
}

#[component]
pub fn EventCalendar() -> Element {
    let nav = use_navigator();
    rsx! {
        EventCalendarView {
            on_open_event: move |id: String| { nav.push(Route::EventDetail { id }); },
            on_open_list: move |_| { nav.push(Route::EventsList {}); },
        }
    }
}

#[component]
pub fn EventDetail(id: String) -> Element {
    let nav = use_navigator();
    rsx! {
        EventDetailView {
            id,
            on_back: move |_| { nav.push(Route::EventsList {}); },
            on_edit: move |id: String| { nav.push(Route::EventEdit { id }); },
            on_deleted: move |_| { nav.replace(Route::EventsList {}); },
            on_open_feedback: move |id: String| { nav.push(Route::EventFeedback { id }); },
            on_open_dashboard: move |id: String| { nav.push(Route::EventFeedbackDashboard { id }); },
        }
    }
}

#[component]
pub fn EventCreate() -> Element {
    let nav = use_navigator();
    rsx! {
        EventFormView {
            on_saved: move |id: String| { nav.replace(Route::EventDetail { id }); },
            on_cancel: move |_| { nav.push(Route::EventsList {}); },
        }
    }
}

#[component]
pub fn EventEdit(id: String) -> Element {
    let nav = use_navigator();
    let back_id = id.clone();
    rsx! {
        EventFormView {
            id: Some(id),
            on_saved: move |id: String| { nav.replace(Route::EventDetail { id }); },
            on_cancel: move |_| { nav.push(Route::EventDetail { id: back_id.clone() }); },
        }
    }
}

#[component]
pub fn EventFeedback(id: String) -> Element {
    let nav = use_navigator();
    rsx! {
        EventFeedbackView {
            event_id: id,
            on_done: move |id: String| { nav.push(Route::EventDetail { id }); },
        }
    }
}

#[component]
pub fn EventFeedbackDashboard(id: String) -> Element {
    let nav = use_navigator();
    rsx! {
        FeedbackDashboardView {
            event_id: id,
            on_back: move |id: String| { nav.replace(Route::EventDetail { id }); },
        }
    }
}
