//! Authentication context and hooks for the UI.

use api::UserInfo;
use dioxus::prelude::*;

/// Authentication state for the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<UserInfo>,
    pub loading: bool,
    /// Whether the server is reachable (last connectivity check succeeded).
    pub online: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
            online: false,
        }
    }
}

impl AuthState {
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(UserInfo::is_admin)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }
}

/// Get the current authentication state.
/// Returns a signal that updates when the user logs in or out.
pub fn use_auth() -> Signal<AuthState> {
    use_context::<Signal<AuthState>>()
}

/// Provider component that manages authentication state.
/// Wrap your app with this component to enable authentication.
#[component]
pub fn AuthProvider(children: Element) -> Element {
    let mut auth_state = use_signal(AuthState::default);

    // Fetch the current user on mount
    let _ = use_resource(move || async move {
        match api::get_current_user().await {
            Ok(user) => auth_state.set(AuthState {
                user,
                loading: false,
                online: true,
            }),
            Err(e) => {
                tracing::warn!("Could not load current user: {}", e);
                auth_state.set(AuthState {
                    user: None,
                    loading: false,
                    online: false,
                });
            }
        }
    });

    // Periodic connectivity check (every 30s)
    use_future(move || async move {
        loop {
            sleep_secs(30).await;

            if auth_state.peek().loading {
                continue;
            }
            match api::get_current_user().await {
                Ok(user) => {
                    let current = auth_state.peek().clone();
                    if current.user != user || !current.online {
                        auth_state.set(AuthState {
                            user,
                            loading: false,
                            online: true,
                        });
                    }
                }
                Err(_) => {
                    if auth_state.peek().online {
                        auth_state.write().online = false;
                    }
                }
            }
        }
    });

    use_context_provider(|| auth_state);

    rsx! {
        {children}
    }
}

pub(crate) async fn sleep_secs(secs: u64) {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::sleep(std::time::Duration::from_secs(secs)).await;
    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(std::time::Duration::from_secs(secs)).await;
}

/// Button to log out the current user.
#[component]
pub fn LogoutButton(
    #[props(default = "Sign out".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
) -> Element {
    let mut auth_state = use_auth();

    let onclick = move |_| async move {
        match api::logout().await {
            Ok(()) => {
                auth_state.set(AuthState {
                    user: None,
                    loading: false,
                    online: auth_state.peek().online,
                });
                // Redirect to login
                #[cfg(target_arch = "wasm32")]
                {
                    if let Some(window) = web_sys::window() {
                        let _ = window.location().set_href("/login");
                    }
                }
            }
            Err(e) => tracing::error!("Logout failed: {}", e),
        }
    };

    rsx! {
        button {
            class: "{class}",
            onclick: onclick,
            "{label}"
        }
    }
}

/// Renders `children` for signed-in users and a sign-in prompt otherwise.
#[component]
pub fn RequireAuth(
    #[props(default = "Please sign in to continue.".to_string())] message: String,
    children: Element,
) -> Element {
    let auth = use_auth();
    let state = auth();

    if state.loading {
        return rsx! {
            crate::components::Spinner {}
        };
    }

    if state.user.is_none() {
        return rsx! {
            div { class: "empty-state",
                p { "{message}" }
                a { class: "btn btn-primary", href: "/login", "Sign in" }
            }
        };
    }

    rsx! {
        {children}
    }
}
