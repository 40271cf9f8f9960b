//! Drafting assistance: asks a chat-completions endpoint for copy to start a
//! field with.
//!
//! Without an API key, or when the request fails, a canned suggestion is
//! returned so the editor always gets something to show. Everything but
//! [`suggest`] is pure and usable on both sides.

use richtext::{markup, Document};
use serde_json::{json, Value};

use crate::Suggestion;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Longest context forwarded to the model, in chars.
const MAX_CONTEXT: usize = 2000;

/// Assistant endpoint configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

#[cfg(feature = "server")]
impl AssistConfig {
    /// Read from the environment (and `.env`). `None` when `ASSIST_API_KEY`
    /// is unset or blank.
    ///
    /// Environment variables:
    /// - `ASSIST_API_KEY` (required)
    /// - `ASSIST_API_URL` (optional)
    /// - `ASSIST_MODEL` (optional)
    pub fn from_env() -> Option<Self> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("ASSIST_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let api_url = std::env::var("ASSIST_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let model = std::env::var("ASSIST_MODEL")
            .ok()
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Some(Self {
            api_key: api_key.trim().to_string(),
            api_url,
            model,
        })
    }
}

#[cfg(feature = "server")]
#[derive(Debug, thiserror::Error)]
pub enum AssistError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("assistant answered with status {0}")]
    Status(u16),
    #[error("assistant response carried no text")]
    EmptyResponse,
}

/// Instruction for the model. `context` is the current field content as
/// markup and is reduced to plain text first.
pub fn build_prompt(field: &str, context: &str) -> String {
    let text = markup::parse(context).text();
    let text: String = text.trim().chars().take(MAX_CONTEXT).collect();
    let field = match field.trim() {
        "" => "post",
        f => f,
    };
    if text.is_empty() {
        format!("Write a short, friendly {field}. Answer with the text only, in plain sentences.")
    } else {
        format!(
            "Improve this {field} draft. Keep its meaning and language. \
             Answer with the text only, in plain sentences.\n\n{text}"
        )
    }
}

pub fn request_body(model: &str, prompt: &str) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "user", "content": prompt }
        ],
        "temperature": 0.7,
    })
}

/// Text of the first choice, if any.
pub fn extract_text(response: &Value) -> Option<String> {
    let text = response
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()?
        .trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Canned copy used when the assistant can't be reached.
pub fn fallback_suggestion(field: &str) -> String {
    match field.trim() {
        "bio" => "Tell people a little about yourself and what you share here.".to_string(),
        "comment" => "Thanks for sharing this! Here is what I think:".to_string(),
        _ => "Share what's on your mind. A short update is perfect.".to_string(),
    }
}

/// Plain assistant text as editor markup, one paragraph per line.
pub fn to_markup(text: &str) -> String {
    markup::serialize(&Document::from_text(text))
}

#[cfg(feature = "server")]
async fn request(config: &AssistConfig, prompt: &str) -> Result<String, AssistError> {
    let response = reqwest::Client::new()
        .post(&config.api_url)
        .header("Authorization", format!("Bearer {}", config.api_key))
        .json(&request_body(&config.model, prompt))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AssistError::Status(response.status().as_u16()));
    }
    let body: Value = response.json().await?;
    extract_text(&body).ok_or(AssistError::EmptyResponse)
}

/// Canned copy for `field`, ready for the editor.
pub fn fallback(field: &str) -> Suggestion {
    Suggestion {
        markup: to_markup(&fallback_suggestion(field)),
        fallback: true,
    }
}

/// Suggested copy for `field`. Never fails: errors are logged and replaced
/// by [`fallback`].
#[cfg(feature = "server")]
pub async fn suggest(config: Option<&AssistConfig>, field: &str, context: &str) -> Suggestion {
    let Some(config) = config else {
        return fallback(field);
    };
    match request(config, &build_prompt(field, context)).await {
        Ok(text) => Suggestion {
            markup: to_markup(&text),
            fallback: false,
        },
        Err(e) => {
            tracing::error!("Suggestion for {field} failed: {e}");
            fallback(field)
        }
    }
}
