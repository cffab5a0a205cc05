use dioxus::prelude::*;

use crate::{use_auth, LogoutButton};

const VIEWS_CSS: Asset = asset!("/src/views/views.css");

/// Top bar: brand, the page links passed as children, and the user menu.
#[component]
pub fn Navbar(children: Element) -> Element {
    let auth = use_auth();
    let state = auth();

    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        nav {
            class: "navbar",
            a { class: "navbar-brand", href: "/events", "Alumni Portal" }
            div { class: "navbar-links", {children} }
            div {
                class: "navbar-user",
                if !state.online && !state.loading {
                    span { class: "badge badge-muted", title: "Server unreachable", "Offline" }
                }
                match &state.user {
                    Some(user) => rsx! {
                        span { class: "navbar-name", "{user.display_name()}" }
                        LogoutButton { class: "btn btn-ghost" }
                    },
                    None if !state.loading => rsx! {
                        a { class: "btn btn-ghost", href: "/login", "Sign in" }
                    },
                    None => rsx! {},
                }
            }
        }
    }
}
