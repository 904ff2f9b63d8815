//! One stateless chat turn: prompt, completion, citations.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::llm::CompletionProvider;
use crate::models::{Message, Source};
use crate::prompt::{build_prompt, extract_citations};

/// Body of `POST /chat`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<Message>,
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// Reply to one chat turn. `diagram` is always `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatReply {
    pub response: String,
    pub citations: Vec<String>,
    pub diagram: Option<serde_json::Value>,
}

/// Run one turn against `provider`.
///
/// With `history_window` set, only the most recent messages are sent.
/// Provider failures become [`Error::Provider`]; their details are logged
/// here and not meant for end users.
pub async fn run_turn(
    provider: &dyn CompletionProvider,
    message: &str,
    history: &[Message],
    sources: &[Source],
    history_window: Option<usize>,
) -> Result<ChatReply> {
    let message = message.trim();
    if message.is_empty() {
        return Err(Error::EmptyMessage);
    }

    let history = match history_window {
        Some(n) if history.len() > n => &history[history.len() - n..],
        _ => history,
    };

    let prompt = build_prompt(message, history, sources);
    debug!(
        model = provider.model_name(),
        sources = sources.len(),
        history = history.len(),
        prompt_chars = prompt.user.len(),
        "sending chat completion"
    );

    let response = provider.complete(&prompt).await.map_err(|e| {
        error!(error = %e, "chat completion failed");
        Error::Provider(e.to_string())
    })?;

    let citations = extract_citations(&response, sources);

    Ok(ChatReply {
        response,
        citations,
        diagram: None,
    })
}
