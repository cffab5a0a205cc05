use dioxus::prelude::*;

use ui::views::{ApplicationTrackingView, JobApplyView, ManageApplicationsView};

use crate::Route;

#[component]
pub fn ApplicationTracking() -> Element {
    rsx! {
        ApplicationTrackingView {}
    }
}

#[component]
pub fn JobApply(job_id: String) -> Element {
    let nav = use_navigator();
    rsx! {
        JobApplyView {
            job_id,
            on_done: move |_| { nav.push(Route::ApplicationTracking {}); },
        }
    }
}

#[component]
pub fn ManageJobApplications(job_id: String) -> Element {
    rsx! {
        ManageApplicationsView { job_id }
    }
}
