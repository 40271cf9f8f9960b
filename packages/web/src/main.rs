use dioxus::prelude::*;

use richtext::{EditorConfig, ToolbarPosition};
use views::{Composer, Post, Published, Shell};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(Shell)]
    #[route("/")]
    Composer {},
    #[route("/published")]
    Published {},
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    #[cfg(feature = "server")]
    {
        match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime.block_on(launch_server()),
            Err(e) => eprintln!("Failed to start runtime: {e}"),
        }
    }

    #[cfg(not(feature = "server"))]
    {
        dioxus::launch(App);
    }
}

#[cfg(feature = "server")]
async fn launch_server() {
    use dioxus::server::{DioxusRouterExt, ServeConfig};

    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let router = axum::Router::new().serve_dioxus_application(ServeConfig::new(), App);

    // Use the address from dx serve or default to localhost:8080
    let addr = dioxus::cli_config::fullstack_address_or_localhost();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            return;
        }
    };
    tracing::info!("Server listening on {}", addr);

    if let Err(e) = axum::serve(listener, router.into_make_service()).await {
        tracing::error!("Server error: {}", e);
    }
}

/// Settings used until the server's `richtext.toml` arrives, and when it
/// has none: the composer keeps its toolbar under the text.
fn default_editor_config() -> EditorConfig {
    EditorConfig::default().with_toolbar_position(ToolbarPosition::Bottom)
}

fn editor_config_from(loaded: Result<Option<EditorConfig>, ServerFnError>) -> EditorConfig {
    match loaded {
        Ok(Some(config)) => config,
        Ok(None) => default_editor_config(),
        Err(e) => {
            tracing::error!("Failed to load editor config: {}", e);
            default_editor_config()
        }
    }
}

#[component]
fn App() -> Element {
    let mut editor_config = use_context_provider(|| Signal::new(default_editor_config()));
    use_context_provider(|| Signal::new(Vec::<Post>::new()));

    // Fetch the server's editor settings on mount
    let _ = use_resource(move || async move {
        editor_config.set(editor_config_from(api::editor_config().await));
    });

    rsx! {
        // Global app resources
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        Router::<Route> {}
    }
}
