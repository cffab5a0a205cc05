use dioxus::prelude::*;
use pulldown_cmark::{Event, Options, Parser};

/// Render Markdown to HTML. Raw HTML in the source is shown as text.
pub fn render_markdown(source: &str) -> String {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);

    let events = Parser::new_ext(source, opts).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut html_out = String::with_capacity(source.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html_out, events);
    html_out
}

/// An event description or other user-authored Markdown block.
#[component]
pub fn Markdown(source: String, #[props(default)] class: String) -> Element {
    let html = use_memo(use_reactive!(|source| render_markdown(&source)));

    rsx! {
        div {
            class: "markdown {class}",
            dangerous_inner_html: "{html}",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_common_markdown() {
        let html = render_markdown("# Agenda\n\n- **Keynote** at 10\n- ~~Lunch~~");
        assert!(html.contains("<h1>Agenda</h1>"));
        assert!(html.contains("<strong>Keynote</strong>"));
        assert!(html.contains("<del>Lunch</del>"));
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = render_markdown("Hi <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
