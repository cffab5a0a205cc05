use dioxus::prelude::*;

use store::applications::{days_ago_label, ApplicationFilter};
use store::{ApplicationStatus, JobApplications};

use crate::components::{use_toast, Alert, Spinner, ToastOptions};
use crate::icons::FaFileLines;
use crate::views::application_tracking::status_class;
use crate::{use_app_config, Icon, RequireAuth};

const VIEWS_CSS: Asset = asset!("/src/views/views.css");

/// Applications received for a job posting, for its owner or an admin.
#[component]
pub fn ManageApplicationsView(job_id: String) -> Element {
    rsx! {
        RequireAuth {
            message: "Please sign in to review applications.",
            Manage { job_id }
        }
    }
}

#[component]
fn Manage(job_id: String) -> Element {
    let config = use_app_config();
    let toast_api = use_toast();
    let mut data = use_signal(|| Option::<Result<JobApplications, String>>::None);
    let mut filter = use_signal(ApplicationFilter::default);

    let load_id = job_id.clone();
    let _loader = use_resource(move || {
        let id = load_id.clone();
        async move {
            data.set(Some(
                api::list_job_applications(id).await.map_err(|e| e.to_string()),
            ));
        }
    });

    // Optimistic: the row changes immediately and is put back on failure.
    let handle_status = move |(application_id, status): (String, ApplicationStatus)| {
        let previous = match &*data.peek() {
            Some(Ok(loaded)) => loaded
                .applications
                .iter()
                .find(|a| a.id == application_id)
                .and_then(|a| a.status),
            _ => None,
        };
        set_status(&mut data, &application_id, Some(status));

        spawn(async move {
            match api::update_application_status(application_id.clone(), status).await {
                Ok(_) => toast_api.success(
                    format!("Status updated to {}", status.label()),
                    ToastOptions::new(),
                ),
                Err(e) => {
                    set_status(&mut data, &application_id, previous);
                    toast_api.error(format!("Update failed: {e}"), ToastOptions::new());
                }
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
            match data() {
                None => rsx! { Spinner { label: "Loading applications..." } },
                Some(Err(e)) => rsx! { Alert { message: e } },
                Some(Ok(JobApplications { job, applications })) => rsx! {
                    div {
                        class: "view-header",
                        div {
                            h1 { class: "view-title", "Applications for {job.title}" }
                            p { class: "muted", "{job.company_name} · {applications.len()} received" }
                        }
                        select {
                            class: "select",
                            value: current.as_str(),
                            onchange: move |evt| filter.set(ApplicationFilter::parse(&evt.value())),
                            for option in ApplicationFilter::options() {
                                option {
                                    key: "{option.as_str()}",
                                    value: option.as_str(),
                                    "{option.label()} ({option.count(&applications)})"
                                }
                            }
                        }
                    }

                    if applications.is_empty() {
                        div {
                            class: "empty-state",
                            h3 { "No applications yet" }
                        }
                    } else {
                        div {
                            class: "table-wrap",
                            table {
                                class: "table",
                                thead {
                                    tr {
                                        th { "Applicant" }
                                        th { "Applied" }
                                        th { "Resume" }
                                        th { "Status" }
                                    }
                                }
                                tbody {
                                    for application in applications.iter().filter(|a| current.matches(a)) {
                                        tr {
                                            key: "{application.id}",
                                            td {
                                                div {
                                                    class: "person",
                                                    if let Some(profile) = &application.applicant {
                                                        img { class: "avatar", src: "{profile.avatar()}", alt: "" }
                                                        div {
                                                            span { class: "person-name", "{profile.display_name()}" }
                                                            if let Some(email) = &profile.email {
                                                                span { class: "person-meta", "{email}" }
                                                            }
                                                        }
                                                    } else {
                                                        span { class: "person-name", "Unknown applicant" }
                                                    }
                                                }
                                                if let Some(letter) = application.cover_letter.as_ref().filter(|l| !l.trim().is_empty()) {
                                                    details {
                                                        summary { "Cover letter" }
                                                        p { class: "card-text", "{letter}" }
                                                    }
                                                }
                                            }
                                            td {
                                                {application.created_at.map(|d| days_ago_label(d, now, offset)).unwrap_or_default()}
                                            }
                                            td {
                                                if let Some(url) = &application.resume_url {
                                                    a {
                                                        href: "{url}",
                                                        target: "_blank",
                                                        rel: "noopener",
                                                        Icon { icon: FaFileLines, width: 12, height: 12 }
                                                        " View"
                                                    }
                                                }
                                            }
                                            td {
                                                span { class: status_class(application.status()), "{application.status().label()}" }
                                                select {
                                                    class: "select select-small",
                                                    value: application.status().as_str(),
                                                    onchange: {
                                                        let id = application.id.clone();
                                                        move |evt: FormEvent| {
                                                            if let Some(status) = ApplicationStatus::parse(&evt.value()) {
                                                                handle_status((id.clone(), status));
                                                            }
                                                        }
                                                    },
                                                    for status in ApplicationStatus::ALL {
                                                        option { key: "{status.as_str()}", value: status.as_str(), "{status.label()}" }
                                                    }
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
            }
        }
    }
}

fn set_status(
    data: &mut Signal<Option<Result<JobApplications, String>>>,
    application_id: &str,
    status: Option<ApplicationStatus>,
) {
    if let Some(Ok(loaded)) = data.write().as_mut() {
        if let Some(row) = loaded.applications.iter_mut().find(|a| a.id == application_id) {
            row.status = status;
        }
    }
}
