use dioxus::prelude::*;

use store::{FeedbackDraft, FieldError, Recommendation};

use crate::components::{
    use_toast, Alert, Button, ButtonVariant, FieldMessage, Label, Spinner, Textarea, ToastOptions,
};
use crate::icons::FaStar;
use crate::{Icon, RequireAuth};

const VIEWS_CSS: Asset = asset!("/src/views/views.css");

/// Feedback form for one event. Pre-fills the caller's earlier answer.
#[component]
pub fn EventFeedbackView(event_id: String, on_done: EventHandler<String>) -> Element {
    rsx! {
        RequireAuth {
            message: "Please sign in to leave feedback.",
            FeedbackForm { event_id, on_done }
        }
    }
}

#[component]
fn FeedbackForm(event_id: String, on_done: EventHandler<String>) -> Element {
    let toast_api = use_toast();

    let mut draft = use_signal(FeedbackDraft::default);
    let mut errors = use_signal(Vec::<FieldError>::new);
    let mut submitting = use_signal(|| false);
    let mut has_existing = use_signal(|| false);

    let load_id = event_id.clone();
    let event = use_resource(move || {
        let id = load_id.clone();
        async move {
            let event = api::get_event(id.clone()).await.map_err(|e| e.to_string())?;
            if let Ok(Some(existing)) = api::get_my_feedback(id).await {
                draft.set(FeedbackDraft::from_feedback(&existing));
                has_existing.set(true);
            }
            Ok::<_, String>(event)
        }
    });

    let submit_id = event_id.clone();
    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let event_id = submit_id.clone();
        spawn(async move {
            let current = draft.peek().clone();
            if let Err(field_errors) = current.validate() {
                errors.set(field_errors);
                return;
            }
            errors.set(Vec::new());
            submitting.set(true);
            match api::submit_feedback(event_id.clone(), current).await {
                Ok(_) => {
                    toast_api.success(
                        "Thank you for your feedback!".to_string(),
                        ToastOptions::new(),
                    );
                    on_done.call(event_id);
                }
                Err(e) => {
                    tracing::warn!("Submitting feedback failed: {}", e);
                    toast_api.error(e.to_string(), ToastOptions::new());
                }
            }
            submitting.set(false);
        });
    };

    let d = draft();
    let back_id = event_id.clone();
    let notice_id = event_id.clone();
    // Feedback opens once the event is over.
    let ended = match &*event.read() {
        Some(Ok(event)) => Some(event.has_ended(chrono::Utc::now())),
        _ => None,
    };

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        div {
            class: "view-page view-narrow",
            match &*event.read() {
                None => rsx! { Spinner {} },
                Some(Err(e)) => rsx! { Alert { message: e.clone() } },
                Some(Ok(event)) => rsx! {
                    h1 { class: "view-title", "Event Feedback" }
                    p { class: "muted", "{event.title}" }
                },
            }

            if ended == Some(false) {
                div {
                    class: "card",
                    p { class: "muted", "This event hasn't ended yet. Feedback opens once it is over." }
                    Button {
                        variant: ButtonVariant::Outline,
                        onclick: move |_| on_done.call(notice_id.clone()),
                        "Back to event"
                    }
                }
            }

            if ended == Some(true) {
                form {
                    class: "form card",
                    onsubmit: handle_submit,

                    div {
                        class: "form-field",
                        Label { "How would you rate this event?" }
                        div {
                            class: "star-row",
                            for star in 1u8..=5 {
                                button {
                                    key: "{star}",
                                    r#type: "button",
                                    class: if star <= d.rating { "star filled" } else { "star" },
                                    title: "{star} star",
                                    onclick: move |_| draft.write().rating = star,
                                    Icon { icon: FaStar, width: 22, height: 22 }
                                }
                            }
                        }
                        FieldMessage { errors: errors(), field: "rating" }
                    }

                    div {
                        class: "form-field",
                        Label { "Would you recommend this event to other alumni?" }
                        div {
                            class: "toolbar",
                            for choice in [Recommendation::Yes, Recommendation::No] {
                                Button {
                                    key: "{choice.as_str()}",
                                    variant: if d.would_recommend == Some(choice) { ButtonVariant::Primary } else { ButtonVariant::Outline },
                                    onclick: move |_| draft.write().would_recommend = Some(choice),
                                    if choice == Recommendation::Yes { "Yes" } else { "No" }
                                }
                            }
                        }
                    }

                    div {
                        class: "form-field",
                        Label { html_for: "feedback-comments", "Comments" }
                        Textarea {
                            id: "feedback-comments",
                            placeholder: "What did you enjoy? What could be better?",
                            value: d.comments.clone(),
                            oninput: move |evt: FormEvent| draft.write().comments = evt.value(),
                        }
                    }

                    div {
                        class: "form-actions",
                        Button {
                            variant: ButtonVariant::Outline,
                            onclick: move |_| on_done.call(back_id.clone()),
                            "Cancel"
                        }
                        Button {
                            r#type: "submit",
                            disabled: submitting(),
                            if submitting() {
                                "Submitting..."
                            } else if has_existing() {
                                "Update Feedback"
                            } else {
                                "Submit Feedback"
                            }
                        }
                    }
                }
            }
        }
    }
}
