use dioxus::prelude::*;

use store::applications::{days_ago_label, ApplicationFilter};
use store::{ApplicationStatus, JobApplication};

use crate::components::{use_toast, Alert, Button, ButtonVariant, Spinner, ToastOptions};
use crate::icons::{FaBriefcase, FaFileLines};
use crate::{use_app_config, Icon, RequireAuth};

const VIEWS_CSS: Asset = asset!("/src/views/views.css");

pub(crate) fn status_class(status: ApplicationStatus) -> &'static str {
    match status {
        ApplicationStatus::Submitted => "chip chip-submitted",
        ApplicationStatus::Reviewing => "chip chip-reviewing",
        ApplicationStatus::Interview => "chip chip-interview",
        ApplicationStatus::Offered => "chip chip-offered",
        ApplicationStatus::Rejected => "chip chip-rejected",
        ApplicationStatus::Withdrawn => "chip chip-past",
    }
}

/// The caller's own job applications.
#[component]
pub fn ApplicationTrackingView() -> Element {
    rsx! {
        RequireAuth {
            message: "Please sign in to track your applications.",
            Tracking {}
        }
    }
}

#[component]
fn Tracking() -> Element {
    let config = use_app_config();
    let toast_api = use_toast();
    let mut filter = use_signal(ApplicationFilter::default);
    let mut applications = use_signal(|| Option::<Result<Vec<JobApplication>, String>>::None);

    let mut loader = use_resource(move || async move {
        applications.set(Some(
            api::list_my_applications().await.map_err(|e| e.to_string()),
        ));
    });

    let handle_withdraw = move |id: String| {
        spawn(async move {
            match api::update_application_status(id.clone(), ApplicationStatus::Withdrawn).await {
                Ok(updated) => {
                    if let Some(Ok(list)) = applications.write().as_mut() {
                        if let Some(row) = list.iter_mut().find(|a| a.id == id) {
                            row.status = updated.status;
                            row.updated_at = updated.updated_at;
                        }
                    }
                    toast_api.success("Application withdrawn".to_string(), ToastOptions::new());
                }
                Err(e) => toast_api.error(e.to_string(), ToastOptions::new()),
            }
        });
    };

    let offset = config().offset();
    let now = chrono::Utc::now();
    let current = filter();

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        div {
            class: "view-page",
            div {
                class: "view-header",
                div {
                    h1 { class: "view-title", "My Applications" }
                    p { class: "muted", "Track the status of the jobs you've applied for" }
                }
            }

            match applications() {
                None => rsx! { Spinner { label: "Loading applications..." } },
                Some(Err(e)) => rsx! {
                    Alert { message: format!("Failed to load applications: {e}") }
                    Button {
                        variant: ButtonVariant::Outline,
                        onclick: move |_| loader.restart(),
                        "Retry"
                    }
                },
                Some(Ok(list)) => {
                    let shown: Vec<(JobApplication, String)> = list
                        .iter()
                        .filter(|a| current.matches(a))
                        .map(|a| {
                            let applied = a
                                .created_at
                                .map(|d| days_ago_label(d, now, offset))
                                .unwrap_or_default();
                            (a.clone(), applied)
                        })
                        .collect();
                    rsx! {
                        div {
                            class: "filter-bar",
                            select {
                                class: "select",
                                value: current.as_str(),
                                onchange: move |evt| filter.set(ApplicationFilter::parse(&evt.value())),
                                for option in ApplicationFilter::options() {
                                    option {
                                        key: "{option.as_str()}",
                                        value: option.as_str(),
                                        "{option.label()} ({option.count(&list)})"
                                    }
                                }
                            }
                        }

                        if list.is_empty() {
                            div {
                                class: "empty-state",
                                Icon { icon: FaBriefcase, width: 28, height: 28 }
                                h3 { "You haven't applied to any jobs yet" }
                                p { class: "muted", "Applications you submit from a job posting will show up here." }
                            }
                        } else if shown.is_empty() {
                            div {
                                class: "empty-state",
                                h3 { "No applications with this status" }
                                Button {
                                    variant: ButtonVariant::Outline,
                                    onclick: move |_| filter.set(ApplicationFilter::All),
                                    "Show all"
                                }
                            }
                        } else {
                            div {
                                class: "card-list",
                                for (application, applied) in shown {
                                    ApplicationCard {
                                        key: "{application.id}",
                                        application: application.clone(),
                                        applied,
                                        on_withdraw: handle_withdraw,
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
fn ApplicationCard(
    application: JobApplication,
    applied: String,
    on_withdraw: EventHandler<String>,
) -> Element {
    let status = application.status();
    let id = application.id.clone();
    let can_withdraw = matches!(
        status,
        ApplicationStatus::Submitted | ApplicationStatus::Reviewing | ApplicationStatus::Interview
    );

    rsx! {
        article {
            class: "card application-card",
            div {
                class: "section-header",
                div {
                    h3 {
                        class: "card-title",
                        match &application.job {
                            Some(job) => rsx! { "{job.title}" },
                            None => rsx! { "Job no longer available" },
                        }
                    }
                    if let Some(job) = &application.job {
                        p {
                            class: "card-meta",
                            "{job.company_name}"
                            if let Some(location) = &job.location {
                                " · {location}"
                            }
                            if let Some(job_type) = &job.job_type {
                                " · {job_type}"
                            }
                        }
                    }
                }
                span { class: status_class(status), "{status.label()}" }
            }
            p { class: "card-meta", "Applied {applied}" }
            div {
                class: "card-actions",
                if let Some(url) = &application.resume_url {
                    a {
                        class: "btn btn-ghost",
                        href: "{url}",
                        target: "_blank",
                        rel: "noopener",
                        Icon { icon: FaFileLines, width: 12, height: 12 }
                        " Resume"
                    }
                }
                if can_withdraw {
                    Button {
                        variant: ButtonVariant::Ghost,
                        onclick: move |_| on_withdraw.call(id.clone()),
                        "Withdraw"
                    }
                }
            }
        }
    }
}
