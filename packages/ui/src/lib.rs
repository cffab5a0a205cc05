//! This crate contains all shared UI for the workspace.

use dioxus::prelude::*;

pub mod components;

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

pub mod views;

pub const VIEWS_CSS: Asset = asset!("/src/views/views.css");

mod navbar;
pub use navbar::Navbar;

mod auth;
pub use auth::{use_auth, AuthProvider, AuthState, LogoutButton, RequireAuth};

mod app_config;
pub use app_config::{use_app_config, AppConfigProvider};

mod realtime;
pub use realtime::{use_filtered_table_changes, use_table_changes};

pub mod markdown;
pub use markdown::{render_markdown, Markdown};

mod download;

pub use components::ToastProvider;
