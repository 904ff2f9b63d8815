//! Chat completion provider abstraction.
//!
//! - **[`OpenAIProvider`]** calls an OpenAI-compatible `chat/completions`
//!   endpoint with a system and a user message.
//! - **[`DisabledProvider`]** always fails; used when `llm.provider = "disabled"`.
//!
//! Calls are single-shot: no retries and no streaming. The request timeout
//! comes from `llm.timeout_secs`.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::prompt::Prompt;

/// Returned when the provider answers with no text.
pub const EMPTY_REPLY_FALLBACK: &str =
    "I'm sorry, I couldn't generate a response. Could you try rephrasing your question?";

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Model identifier, for logs.
    fn model_name(&self) -> &str;

    /// Generate a reply for `prompt`.
    async fn complete(&self, prompt: &Prompt) -> Result<String>;
}

/// Instantiate the provider named in `config`.
///
/// # Errors
///
/// Fails for an unknown provider, or for `openai` without `OPENAI_API_KEY`.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn CompletionProvider>> {
    if !config.is_enabled() {
        return Ok(Arc::new(DisabledProvider));
    }
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAIProvider::from_env(config)?)),
        other => bail!("Unknown llm provider: {}", other),
    }
}

// ============ Disabled Provider ============

pub struct DisabledProvider;

#[async_trait]
impl CompletionProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _prompt: &Prompt) -> Result<String> {
        bail!("LLM provider is disabled")
    }
}

// ============ OpenAI Provider ============

pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAIProvider {
    /// Build a provider reading the key from `OPENAI_API_KEY`.
    pub fn from_env(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;
        Self::new(config, api_key)
    }

    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user },
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("OpenAI API error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        Ok(parse_completion(&json))
    }
}

/// Text of `choices[0].message.content`, or [`EMPTY_REPLY_FALLBACK`].
fn parse_completion(json: &serde_json::Value) -> String {
    json.pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
        .filter(|c| !c.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| EMPTY_REPLY_FALLBACK.to_string())
}
