//! Form primitives shared by every view, plus the toast re-exports.

use dioxus::prelude::*;

pub use dioxus_primitives::toast::{use_toast, ToastOptions, ToastProvider};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
    Outline,
    Ghost,
    Destructive,
}

impl ButtonVariant {
    fn class(&self) -> &'static str {
        match self {
            Self::Primary => "btn btn-primary",
            Self::Secondary => "btn btn-secondary",
            Self::Outline => "btn btn-outline",
            Self::Ghost => "btn btn-ghost",
            Self::Destructive => "btn btn-destructive",
        }
    }
}

#[component]
pub fn Button(
    #[props(default)] variant: ButtonVariant,
    #[props(default)] class: String,
    #[props(default = "button".to_string())] r#type: String,
    #[props(default)] disabled: bool,
    #[props(default)] title: String,
    #[props(default)] onclick: EventHandler<MouseEvent>,
    children: Element,
) -> Element {
    rsx! {
        button {
            class: "{variant.class()} {class}",
            r#type: "{r#type}",
            disabled,
            title: "{title}",
            onclick: move |evt| onclick.call(evt),
            {children}
        }
    }
}

#[component]
pub fn Input(
    #[props(default)] id: String,
    #[props(default)] class: String,
    #[props(default = "text".to_string())] r#type: String,
    #[props(default)] placeholder: String,
    #[props(default)] value: String,
    #[props(default)] disabled: bool,
    #[props(default)] oninput: EventHandler<FormEvent>,
) -> Element {
    rsx! {
        input {
            id: "{id}",
            class: "input {class}",
            r#type: "{r#type}",
            placeholder: "{placeholder}",
            value: "{value}",
            disabled,
            oninput: move |evt| oninput.call(evt),
        }
    }
}

#[component]
pub fn Label(#[props(default)] html_for: String, children: Element) -> Element {
    rsx! {
        label { class: "label", r#for: "{html_for}", {children} }
    }
}

#[component]
pub fn Textarea(
    #[props(default)] id: String,
    #[props(default)] class: String,
    #[props(default)] placeholder: String,
    #[props(default)] value: String,
    #[props(default = 4)] rows: u32,
    #[props(default)] oninput: EventHandler<FormEvent>,
) -> Element {
    rsx! {
        textarea {
            id: "{id}",
            class: "textarea {class}",
            placeholder: "{placeholder}",
            rows: "{rows}",
            value: "{value}",
            oninput: move |evt| oninput.call(evt),
        }
    }
}

/// Inline red error box used by forms.
#[component]
pub fn Alert(message: String) -> Element {
    rsx! {
        div { class: "alert alert-error", role: "alert", "{message}" }
    }
}

/// Inline validation message under a field, if `field` failed.
#[component]
pub fn FieldMessage(errors: Vec<store::FieldError>, field: &'static str) -> Element {
    let message = errors.iter().find(|e| e.field == field).map(|e| e.message.clone());
    rsx! {
        if let Some(message) = message {
            p { class: "field-error", "{message}" }
        }
    }
}

#[component]
pub fn Spinner(#[props(default = "Loading...".to_string())] label: String) -> Element {
    rsx! {
        div { class: "spinner-row",
            span { class: "spinner" }
            span { "{label}" }
        }
    }
}

/// A file chosen through an `<input type="file">`.
#[derive(Clone, Debug, PartialEq)]
pub struct PickedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Read the first file selected in a file input's change event.
pub async fn read_picked_file(evt: &FormEvent) -> Result<Option<PickedFile>, String> {
    let Some(file) = evt.files().into_iter().next() else {
        return Ok(None);
    };
    let name = file.name();
    let bytes = file.read_bytes().await.map_err(|e| e.to_string())?;
    Ok(Some(PickedFile {
        content_type: file
            .content_type()
            .unwrap_or_else(|| "application/octet-stream".to_string()),
        name,
        bytes: bytes.to_vec(),
    }))
}
