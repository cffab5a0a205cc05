//! Display settings fetched once from the server and shared via context.

use dioxus::prelude::*;
use store::AlumniConfig;

pub fn use_app_config() -> Signal<AlumniConfig> {
    use_context::<Signal<AlumniConfig>>()
}

#[component]
pub fn AppConfigProvider(children: Element) -> Element {
    let mut config = use_signal(AlumniConfig::default);

    let _ = use_resource(move || async move {
        match api::get_app_config().await {
            Ok(loaded) => config.set(loaded),
            Err(e) => tracing::warn!("Using default display settings: {}", e),
        }
    });

    use_context_provider(|| config);

    rsx! {
        {children}
    }
}
