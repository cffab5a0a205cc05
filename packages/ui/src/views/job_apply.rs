use dioxus::prelude::*;

use store::{JobPosting, ResumeSource, SavedResume};

use crate::components::{
    read_picked_file, use_toast, Alert, Button, ButtonVariant, Label, PickedFile, Spinner,
    Textarea, ToastOptions,
};
use crate::icons::{FaBriefcase, FaFileLines, FaUpload};
use crate::{Icon, RequireAuth};

const VIEWS_CSS: Asset = asset!("/src/views/views.css");

#[derive(Clone, Copy, PartialEq)]
enum ResumeChoice {
    Saved,
    Upload,
}

#[derive(Clone, PartialEq)]
struct ApplyContext {
    job: JobPosting,
    already_applied: bool,
    resumes: Vec<SavedResume>,
}

/// Application form for one job posting.
#[component]
pub fn JobApplyView(job_id: String, on_done: EventHandler<()>) -> Element {
    rsx! {
        RequireAuth {
            message: "Please sign in to apply for jobs.",
            ApplyForm { job_id, on_done }
        }
    }
}

#[component]
fn ApplyForm(job_id: String, on_done: EventHandler<()>) -> Element {
    let toast_api = use_toast();
    let mut choice = use_signal(|| ResumeChoice::Upload);
    let mut selected_resume = use_signal(|| Option::<String>::None);
    let mut picked = use_signal(|| Option::<PickedFile>::None);
    let mut cover_letter = use_signal(String::new);
    let mut error = use_signal(|| Option::<String>::None);
    let mut submitting = use_signal(|| false);

    let load_id = job_id.clone();
    let context = use_resource(move || {
        let id = load_id.clone();
        async move {
            let job = api::get_job(id.clone()).await.map_err(|e| e.to_string())?;
            let already_applied = api::has_applied(id).await.map_err(|e| e.to_string())?;
            let resumes = api::list_my_resumes().await.map_err(|e| e.to_string())?;
            // Primary comes first; preselect it.
            if let Some(first) = resumes.first() {
                selected_resume.set(Some(first.id.clone()));
                choice.set(ResumeChoice::Saved);
            }
            Ok::<_, String>(ApplyContext {
                job,
                already_applied,
                resumes,
            })
        }
    });

    let handle_file = move |evt: FormEvent| {
        spawn(async move {
            match read_picked_file(&evt).await {
                Ok(file) => picked.set(file),
                Err(e) => error.set(Some(format!("Could not read file: {e}"))),
            }
        });
    };

    let submit_id = job_id.clone();
    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let job_id = submit_id.clone();
        spawn(async move {
            error.set(None);
            let resume = match choice() {
                ResumeChoice::Saved => match selected_resume() {
                    Some(resume_id) => ResumeSource::Saved { resume_id },
                    None => {
                        error.set(Some("Please choose a saved resume".to_string()));
                        return;
                    }
                },
                ResumeChoice::Upload => match picked() {
                    Some(file) => ResumeSource::Upload {
                        file_name: file.name,
                        content_type: file.content_type,
                        bytes: file.bytes,
                    },
                    None => {
                        error.set(Some("Please upload your resume".to_string()));
                        return;
                    }
                },
            };

            submitting.set(true);
            match api::apply_to_job(job_id.clone(), cover_letter(), resume).await {
                Ok(_) => {
                    toast_api.success(
                        "Application submitted successfully!".to_string(),
                        ToastOptions::new(),
                    );
                    on_done.call(());
                }
                Err(e) => {
                    tracing::warn!("Applying to job {} failed: {}", job_id, e);
                    error.set(Some(e.to_string()));
                }
            }
            submitting.set(false);
        });
    };

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        div {
            class: "view-page view-narrow",
            match &*context.read() {
                None => rsx! { Spinner { label: "Loading job..." } },
                Some(Err(e)) => rsx! { Alert { message: e.clone() } },
                Some(Ok(ctx)) => rsx! {
                    div {
                        class: "view-header",
                        div {
                            h1 { class: "view-title", "Apply for {ctx.job.title}" }
                            p {
                                class: "muted",
                                Icon { icon: FaBriefcase, width: 12, height: 12 }
                                " {ctx.job.company_name}"
                                if let Some(location) = &ctx.job.location {
                                    " · {location}"
                                }
                            }
                        }
                    }

                    if ctx.already_applied {
                        div {
                            class: "card empty-state",
                            h3 { "You have already applied for this job" }
                            p { class: "muted", "Track its progress from My Applications." }
                            Button {
                                variant: ButtonVariant::Outline,
                                onclick: move |_| on_done.call(()),
                                "View my applications"
                            }
                        }
                    } else {
                        form {
                            class: "form card",
                            onsubmit: handle_submit,

                            if let Some(message) = error() {
                                Alert { message }
                            }

                            div {
                                class: "form-field",
                                Label { "Resume" }
                                if !ctx.resumes.is_empty() {
                                    label {
                                        class: "radio",
                                        input {
                                            r#type: "radio",
                                            name: "resume-choice",
                                            checked: choice() == ResumeChoice::Saved,
                                            onchange: move |_| choice.set(ResumeChoice::Saved),
                                        }
                                        " Use a saved resume"
                                    }
                                    if choice() == ResumeChoice::Saved {
                                        ul {
                                            class: "resume-list",
                                            for resume in ctx.resumes.iter() {
                                                li {
                                                    key: "{resume.id}",
                                                    label {
                                                        class: "radio",
                                                        input {
                                                            r#type: "radio",
                                                            name: "saved-resume",
                                                            checked: selected_resume().as_deref() == Some(resume.id.as_str()),
                                                            onchange: {
                                                                let id = resume.id.clone();
                                                                move |_| selected_resume.set(Some(id.clone()))
                                                            },
                                                        }
                                                        Icon { icon: FaFileLines, width: 12, height: 12 }
                                                        " {resume.filename}"
                                                        if resume.is_primary == Some(true) {
                                                            span { class: "chip", "Primary" }
                                                        }
                                                    }
                                                }
                                            }
                                        }
                                    }
                                    label {
                                        class: "radio",
                                        input {
                                            r#type: "radio",
                                            name: "resume-choice",
                                            checked: choice() == ResumeChoice::Upload,
                                            onchange: move |_| choice.set(ResumeChoice::Upload),
                                        }
                                        " Upload a new resume"
                                    }
                                }
                                if choice() == ResumeChoice::Upload {
                                    label {
                                        class: "file-drop",
                                        Icon { icon: FaUpload, width: 16, height: 16 }
                                        match picked() {
                                            Some(file) => rsx! { " {file.name}" },
                                            None => rsx! { " Choose a PDF or Word document" },
                                        }
                                        input {
                                            class: "visually-hidden",
                                            r#type: "file",
                                            accept: ".pdf,.doc,.docx",
                                            onchange: handle_file,
                                        }
                                    }
                                }
                            }

                            div {
                                class: "form-field",
                                Label { html_for: "cover-letter", "Cover letter" }
                                Textarea {
                                    id: "cover-letter",
                                    rows: 8,
                                    placeholder: "Tell the employer why you're a good fit (optional)",
                                    value: cover_letter(),
                                    oninput: move |evt: FormEvent| cover_letter.set(evt.value()),
                                }
                            }

                            div {
                                class: "form-actions",
                                Button {
                                    variant: ButtonVariant::Outline,
                                    onclick: move |_| on_done.call(()),
                                    "Cancel"
                                }
                                Button {
                                    r#type: "submit",
                                    disabled: submitting(),
                                    if submitting() { "Submitting..." } else { "Submit Application" }
                                }
                            }
                        }
                    }
                },
            }
        }
    }
}
