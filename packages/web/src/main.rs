use dioxus::prelude::*;

use ui::{AppConfigProvider, AuthProvider, Navbar, ToastProvider, VIEWS_CSS};
use views::{
    ApplicationTracking, EventCalendar, EventCreate, EventDetail, EventEdit, EventFeedback,
    EventFeedbackDashboard, EventsList, JobApply, Login, ManageJobApplications, Register,
};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[route("/")]
    Root {},
    #[route("/login")]
    Login {},
    #[route("/register")]
    Register {},
    #[layout(Layout)]
        #[route("/events")]
        EventsList {},
        #[route("/events/new")]
        EventCreate {},
        #[route("/events/calendar")]
        EventCalendar {},
        #[route("/events/:id")]
        EventDetail { id: String },
        #[route("/events/:id/edit")]
        EventEdit { id: String },
        #[route("/events/:id/feedback")]
        EventFeedback { id: String },
        #[route("/events/:id/feedback/dashboard")]
        EventFeedbackDashboard { id: String },
        #[route("/jobs/applications")]
        ApplicationTracking {},
        #[route("/jobs/:job_id/apply")]
        JobApply { job_id: String },
        #[route("/jobs/:job_id/applications")]
        ManageJobApplications { job_id: String },
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    #[cfg(feature = "server")]
    {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                eprintln!("Failed to start tokio runtime: {e}");
                std::process::exit(1);
            }
        };
        if let Err(e) = runtime.block_on(launch_server()) {
            tracing::error!("Server stopped: {}", e);
            std::process::exit(1);
        }
    }

    #[cfg(not(feature = "server"))]
    {
        dioxus::launch(App);
    }
}

#[cfg(feature = "server")]
async fn launch_server() -> Result<(), Box<dyn std::error::Error>> {
    use dioxus::server::{DioxusRouterExt, ServeConfig};
    use tower::ServiceBuilder;
    use std::time::Duration;
    use tower_sessions::cookie::SameSite;
    use tower_sessions::{Expiry, SessionManagerLayer};
    use tower_sessions_sqlx_store::PostgresStore;

    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Fail fast on a missing backend configuration
    let config = api::backend::BackendConfig::from_env()?;
    tracing::info!("Using backend at {}", config.url);

    // Sessions are the only thing this server stores itself
    let pool = api::db::get_pool().await?;
    let session_store = PostgresStore::new(pool.clone());
    session_store.migrate().await?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(std::env::var("SESSION_SECURE").is_ok_and(|v| v == "true"))
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(
            Duration::from_secs(60 * 60 * 24 * 7).try_into()?,
        )); // 7 days

    let router = axum::Router::new()
        .serve_dioxus_application(ServeConfig::new(), App)
        .layer(ServiceBuilder::new().layer(session_layer));

    let addr = dioxus::cli_config::fullstack_address_or_localhost();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}

#[component]
fn App() -> Element {
    rsx! {
        document::Link { rel: "stylesheet", href: VIEWS_CSS }
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        AppConfigProvider {
            AuthProvider {
                ToastProvider {
                    Router::<Route> {}
                }
            }
        }
    }
}

/// Shared chrome for every signed-in page.
#[component]
fn Layout() -> Element {
    rsx! {
        Navbar {
            Link { to: Route::EventsList {}, "Events" }
            Link { to: Route::EventCalendar {}, "Calendar" }
            Link { to: Route::ApplicationTracking {}, "My Applications" }
        }
        main {
            Outlet::<Route> {}
        }
    }
}

/// Redirect `/` to `/events`
#[component]
fn Root() -> Element {
    let nav = use_navigator();
    nav.replace(Route::EventsList {});
    rsx! {}
}
