//! # API crate: shared fullstack server functions
//!
//! Every public `async fn` in this file is a Dioxus server function, compiled
//! twice: once with full server logic (behind `#[cfg(feature = "server")]`)
//! and once as a thin client stub that forwards the call over HTTP.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`assist`] | Drafting suggestions from a chat-completions endpoint, with a canned fallback |
//!
//! ## Server functions exposed here
//!
//! - `suggest_copy`: suggested copy for an editor field
//! - `editor_config`: the server's `richtext.toml`, so server and browser
//!   render the editor with the same settings

use dioxus::prelude::*;
use serde::{Deserialize, Serialize};

pub use richtext::EditorConfig;

pub mod assist;

/// Suggested copy, as markup ready to hand to the editor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub markup: String,
    /// The assistant was unavailable and canned copy was used instead.
    pub fallback: bool,
}

/// Suggest copy for an editor field. `context` is the field's current markup.
#[cfg(feature = "server")]
#[post("/api/assist/suggest")]
pub async fn suggest_copy(field: String, context: String) -> Result<Suggestion, ServerFnError> {
    let config = assist::AssistConfig::from_env();
    Ok(assist::suggest(config.as_ref(), &field, &context).await)
}

#[cfg(not(feature = "server"))]
#[post("/api/assist/suggest")]
pub async fn suggest_copy(field: String, context: String) -> Result<Suggestion, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}

/// Editor settings from `richtext.toml` in the server's working directory,
/// `None` when the file does not exist.
#[cfg(feature = "server")]
#[get("/api/editor/config")]
pub async fn editor_config() -> Result<Option<EditorConfig>, ServerFnError> {
    EditorConfig::find(std::path::Path::new(".")).map_err(|e| ServerFnError::new(e.to_string()))
}

#[cfg(not(feature = "server"))]
#[get("/api/editor/config")]
pub async fn editor_config() -> Result<Option<EditorConfig>, ServerFnError> {
    Err(ServerFnError::new("Server only"))
}
