use chrono::FixedOffset;
use dioxus::prelude::*;

use store::events::{local_to_utc, split_local};
use store::models::EVENT_TYPES;
use store::{Event, EventDraft, FieldError};

use crate::components::{
    read_picked_file, use_toast, Alert, Button, ButtonVariant, FieldMessage, Input, Label,
    PickedFile, Spinner, Textarea, ToastOptions,
};
use crate::views::events_list::capitalize;
use crate::{use_app_config, use_auth};

const VIEWS_CSS: Asset = asset!("/src/views/views.css");

/// Raw text of the form inputs; dates are local to the display timezone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventFormState {
    pub title: String,
    pub description: String,
    pub event_type: String,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
    pub location: String,
    pub is_virtual: bool,
    pub virtual_link: String,
    pub max_attendees: String,
    pub deadline_date: String,
    pub deadline_time: String,
    pub cost: String,
    pub tags: String,
}

impl EventFormState {
    pub fn from_event(event: &Event, offset: FixedOffset) -> Self {
        let draft = EventDraft::from_event(event);
        let (start_date, start_time) = split_local(event.start_date, offset);
        let (end_date, end_time) = split_local(event.end_date, offset);
        let (deadline_date, deadline_time) = event
            .registration_deadline
            .map(|d| split_local(d, offset))
            .unwrap_or_default();
        Self {
            title: draft.title,
            description: draft.description,
            event_type: draft.event_type,
            start_date,
            start_time,
            end_date,
            end_time,
            location: draft.location,
            is_virtual: draft.is_virtual,
            virtual_link: draft.virtual_link,
            max_attendees: draft.max_attendees.map(|n| n.to_string()).unwrap_or_default(),
            deadline_date,
            deadline_time,
            cost: draft.cost,
            tags: draft.tags.join(", "),
        }
    }

    /// Build and validate the draft. Unparseable inputs are reported as
    /// field errors alongside the draft's own rules.
    pub fn to_draft(&self, offset: FixedOffset) -> Result<EventDraft, Vec<FieldError>> {
        let mut errors = Vec::new();

        let max_attendees = match self.max_attendees.trim() {
            "" => None,
            raw => match raw.parse::<i32>() {
                Ok(n) => Some(n),
                Err(_) => {
                    errors.push(FieldError::new("max_attendees", "Maximum attendees must be a number"));
                    None
                }
            },
        };

        let registration_deadline = if self.deadline_date.trim().is_empty() {
            None
        } else {
            let time = if self.deadline_time.trim().is_empty() { "23:59" } else { &self.deadline_time };
            let parsed = local_to_utc(&self.deadline_date, time, offset);
            if parsed.is_none() {
                errors.push(FieldError::new("registration_deadline", "Invalid registration deadline"));
            }
            parsed
        };

        let draft = EventDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.event_type.clone(),
            event_type: self.event_type.clone(),
            start_date: local_to_utc(&self.start_date, &self.start_time, offset),
            end_date: local_to_utc(&self.end_date, &self.end_time, offset),
            location: self.location.clone(),
            is_virtual: self.is_virtual,
            virtual_link: self.virtual_link.clone(),
            max_attendees,
            registration_deadline,
            cost: self.cost.clone(),
            tags: self
                .tags
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        };

        if let Err(rule_errors) = draft.validate() {
            errors.extend(rule_errors);
        }
        if errors.is_empty() {
            Ok(draft)
        } else {
            Err(errors)
        }
    }
}

/// Create an event (`id` is `None`) or edit an existing one.
#[component]
pub fn EventFormView(
    #[props(default)] id: Option<String>,
    on_saved: EventHandler<String>,
    on_cancel: EventHandler<()>,
) -> Element {
    let auth = use_auth();
    let config = use_app_config();
    let toast_api = use_toast();

    let mut form = use_signal(EventFormState::default);
    let mut errors = use_signal(Vec::<FieldError>::new);
    let mut load_error = use_signal(|| Option::<String>::None);
    let mut loaded = use_signal(|| id.is_none());
    let mut image = use_signal(|| Option::<PickedFile>::None);
    let mut saving = use_signal(|| false);

    let editing = id.clone();
    let _loader = use_resource(move || {
        let editing = editing.clone();
        async move {
            let Some(event_id) = editing else {
                return;
            };
            match api::get_event(event_id).await {
                Ok(event) => {
                    form.set(EventFormState::from_event(&event, config.peek().offset()));
                    loaded.set(true);
                }
                Err(e) => load_error.set(Some(e.to_string())),
            }
        }
    });

    let save_id = id.clone();
    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let save_id = save_id.clone();
        spawn(async move {
            let draft = match form.peek().to_draft(config.peek().offset()) {
                Ok(draft) => draft,
                Err(field_errors) => {
                    errors.set(field_errors);
                    return;
                }
            };
            if save_id.is_none() {
                if let Err(field_errors) = draft.validate_new(chrono::Utc::now()) {
                    errors.set(field_errors);
                    return;
                }
            }
            errors.set(Vec::new());
            saving.set(true);

            let saved = match save_id {
                Some(event_id) => api::update_event(event_id, draft).await,
                None => api::create_event(draft).await,
            };

            match saved {
                Ok(event) => {
                    if let Some(file) = image.take() {
                        if let Err(e) = api::upload_event_image(
                            event.id.clone(),
                            file.name,
                            file.content_type,
                            file.bytes,
                        )
                        .await
                        {
                            toast_api.error(format!("Image upload failed: {e}"), ToastOptions::new());
                        }
                    }
                    toast_api.success("Event saved".to_string(), ToastOptions::new());
                    on_saved.call(event.id);
                }
                Err(e) => {
                    tracing::warn!("Saving event failed: {}", e);
                    toast_api.error(e.to_string(), ToastOptions::new());
                }
            }
            saving.set(false);
        });
    };

    let handle_image = move |evt: FormEvent| async move {
        match read_picked_file(&evt).await {
            Ok(file) => image.set(file),
            Err(e) => toast_api.error(format!("Could not read file: {e}"), ToastOptions::new()),
        }
    };

    let title = if id.is_some() { "Edit Event" } else { "Create Event" };
    let state = auth();

    if !state.loading && !state.is_admin() && id.is_none() {
        return rsx! {
            document::Link { rel: "stylesheet", href: VIEWS_CSS }
            div {
                class: "view-page view-narrow",
                Alert { message: "Only administrators can create events" }
            }
        };
    }

    if let Some(e) = load_error() {
        return rsx! {
            document::Link { rel: "stylesheet", href: VIEWS_CSS }
            div { class: "view-page view-narrow", Alert { message: e } }
        };
    }

    if !loaded() {
        return rsx! {
            document::Link { rel: "stylesheet", href: VIEWS_CSS }
            div { class: "view-page view-narrow", Spinner { label: "Loading event..." } }
        };
    }

    let f = form();
    let errs = errors();

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        div {
            class: "view-page view-narrow",
            h1 { class: "view-title", "{title}" }

            form {
                class: "form card",
                onsubmit: handle_submit,

                if !errs.is_empty() {
                    Alert { message: "Please fix the highlighted fields." }
                }

                div {
                    class: "form-field",
                    Label { html_for: "event-title", "Title" }
                    Input {
                        id: "event-title",
                        value: f.title.clone(),
                        oninput: move |evt: FormEvent| form.write().title = evt.value(),
                    }
                    FieldMessage { errors: errs.clone(), field: "title" }
                }

                div {
                    class: "form-field",
                    Label { html_for: "event-description", "Description (Markdown)" }
                    Textarea {
                        id: "event-description",
                        rows: 8,
                        value: f.description.clone(),
                        oninput: move |evt: FormEvent| form.write().description = evt.value(),
                    }
                    FieldMessage { errors: errs.clone(), field: "description" }
                }

                div {
                    class: "form-field",
                    Label { html_for: "event-type", "Event type" }
                    select {
                        id: "event-type",
                        class: "select",
                        value: f.event_type.clone(),
                        onchange: move |evt| form.write().event_type = evt.value(),
                        option { value: "", "Select a type" }
                        for t in EVENT_TYPES.iter() {
                            option { key: "{t}", value: *t, "{capitalize(t)}" }
                        }
                    }
                }

                div {
                    class: "form-row",
                    div {
                        class: "form-field",
                        Label { html_for: "event-start-date", "Start date" }
                        Input {
                            id: "event-start-date",
                            r#type: "date",
                            value: f.start_date.clone(),
                            oninput: move |evt: FormEvent| form.write().start_date = evt.value(),
                        }
                        FieldMessage { errors: errs.clone(), field: "start_date" }
                    }
                    div {
                        class: "form-field",
                        Label { html_for: "event-start-time", "Start time" }
                        Input {
                            id: "event-start-time",
                            r#type: "time",
                            value: f.start_time.clone(),
                            oninput: move |evt: FormEvent| form.write().start_time = evt.value(),
                        }
                    }
                }

                div {
                    class: "form-row",
                    div {
                        class: "form-field",
                        Label { html_for: "event-end-date", "End date" }
                        Input {
                            id: "event-end-date",
                            r#type: "date",
                            value: f.end_date.clone(),
                            oninput: move |evt: FormEvent| form.write().end_date = evt.value(),
                        }
                        FieldMessage { errors: errs.clone(), field: "end_date" }
                    }
                    div {
                        class: "form-field",
                        Label { html_for: "event-end-time", "End time" }
                        Input {
                            id: "event-end-time",
                            r#type: "time",
                            value: f.end_time.clone(),
                            oninput: move |evt: FormEvent| form.write().end_time = evt.value(),
                        }
                    }
                }

                div {
                    class: "form-field form-check",
                    input {
                        id: "event-virtual",
                        r#type: "checkbox",
                        checked: f.is_virtual,
                        onchange: move |evt| form.write().is_virtual = evt.checked(),
                    }
                    Label { html_for: "event-virtual", "This is a virtual event" }
                }

                if f.is_virtual {
                    div {
                        class: "form-field",
                        Label { html_for: "event-link", "Meeting link" }
                        Input {
                            id: "event-link",
                            r#type: "url",
                            placeholder: "https://",
                            value: f.virtual_link.clone(),
                            oninput: move |evt: FormEvent| form.write().virtual_link = evt.value(),
                        }
                        FieldMessage { errors: errs.clone(), field: "virtual_link" }
                    }
                } else {
                    div {
                        class: "form-field",
                        Label { html_for: "event-location", "Location" }
                        Input {
                            id: "event-location",
                            value: f.location.clone(),
                            oninput: move |evt: FormEvent| form.write().location = evt.value(),
                        }
                        FieldMessage { errors: errs.clone(), field: "location" }
                    }
                }

                div {
                    class: "form-row",
                    div {
                        class: "form-field",
                        Label { html_for: "event-max", "Maximum attendees" }
                        Input {
                            id: "event-max",
                            r#type: "number",
                            placeholder: "Unlimited",
                            value: f.max_attendees.clone(),
                            oninput: move |evt: FormEvent| form.write().max_attendees = evt.value(),
                        }
                        FieldMessage { errors: errs.clone(), field: "max_attendees" }
                    }
                    div {
                        class: "form-field",
                        Label { html_for: "event-cost", "Cost" }
                        Input {
                            id: "event-cost",
                            placeholder: "Free",
                            value: f.cost.clone(),
                            oninput: move |evt: FormEvent| form.write().cost = evt.value(),
                        }
                    }
                }

                div {
                    class: "form-row",
                    div {
                        class: "form-field",
                        Label { html_for: "event-deadline-date", "Registration deadline" }
                        Input {
                            id: "event-deadline-date",
                            r#type: "date",
                            value: f.deadline_date.clone(),
                            oninput: move |evt: FormEvent| form.write().deadline_date = evt.value(),
                        }
                        FieldMessage { errors: errs.clone(), field: "registration_deadline" }
                    }
                    div {
                        class: "form-field",
                        Label { html_for: "event-deadline-time", "Deadline time" }
                        Input {
                            id: "event-deadline-time",
                            r#type: "time",
                            value: f.deadline_time.clone(),
                            oninput: move |evt: FormEvent| form.write().deadline_time = evt.value(),
                        }
                    }
                }

                div {
                    class: "form-field",
                    Label { html_for: "event-tags", "Tags (comma separated)" }
                    Input {
                        id: "event-tags",
                        value: f.tags.clone(),
                        oninput: move |evt: FormEvent| form.write().tags = evt.value(),
                    }
                }

                div {
                    class: "form-field",
                    Label { html_for: "event-image", "Cover image" }
                    input {
                        id: "event-image",
                        r#type: "file",
                        accept: "image/*",
                        onchange: handle_image,
                    }
                    if let Some(file) = image() {
                        p { class: "muted", "Selected: {file.name}" }
                    }
                }

                div {
                    class: "form-actions",
                    Button {
                        variant: ButtonVariant::Outline,
                        onclick: move |_| on_cancel.call(()),
                        "Cancel"
                    }
                    Button {
                        r#type: "submit",
                        disabled: saving(),
                        if saving() { "Saving..." } else { "Save Event" }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(330 * 60).unwrap()
    }

    fn filled() -> EventFormState {
        EventFormState {
            title: "Alumni Meetup".into(),
            description: "Catch up with the batch of 2015".into(),
            event_type: "networking".into(),
            start_date: "2025-06-14".into(),
            start_time: "18:00".into(),
            end_date: "2025-06-14".into(),
            end_time: "21:00".into(),
            location: "Bengaluru".into(),
            tags: "reunion, , 2015 ".into(),
            ..Default::default()
        }
    }

    #[test]
    fn converts_local_inputs_to_utc() {
        let draft = filled().to_draft(ist()).unwrap();
        assert_eq!(
            draft.start_date,
            Some(Utc.with_ymd_and_hms(2025, 6, 14, 12, 30, 0).unwrap())
        );
        assert_eq!(draft.tags, vec!["reunion".to_string(), "2015".to_string()]);
        assert_eq!(draft.category, "networking");
        assert_eq!(draft.max_attendees, None);
    }

    #[test]
    fn reports_parse_and_rule_errors_together() {
        let mut state = filled();
        state.max_attendees = "lots".into();
        state.end_time = "17:00".into();
        let errors = state.to_draft(ist()).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"max_attendees"));
        assert!(fields.contains(&"end_date"));
    }

    #[test]
    fn deadline_defaults_to_end_of_day() {
        let mut state = filled();
        state.start_date = "2025-06-20".into();
        state.end_date = "2025-06-20".into();
        state.deadline_date = "2025-06-13".into();
        let draft = state.to_draft(ist()).unwrap();
        assert_eq!(
            draft.registration_deadline,
            Some(Utc.with_ymd_and_hms(2025, 6, 13, 18, 29, 0).unwrap())
        );
    }

    #[test]
    fn round_trips_an_existing_event() {
        let mut state = filled();
        state.max_attendees = "40".into();
        let draft = state.to_draft(ist()).unwrap();
        let event = Event {
            id: "e1".into(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            category: Some(draft.category.clone()),
            event_type: Some(draft.event_type.clone()),
            start_date: draft.start_date.unwrap(),
            end_date: draft.end_date.unwrap(),
            location: Some(draft.location.clone()),
            is_virtual: Some(false),
            virtual_link: None,
            max_attendees: draft.max_attendees,
            registration_deadline: None,
            cost: None,
            tags: Some(draft.tags.clone()),
            featured_image_url: None,
            organizer_id: None,
            created_by: None,
            is_published: Some(true),
            created_at: None,
            updated_at: None,
        };
        let restored = EventFormState::from_event(&event, ist());
        assert_eq!(restored.start_time, "18:00");
        assert_eq!(restored.max_attendees, "40");
        assert_eq!(restored.tags, "reunion, 2015");
    }
}
