//! OpenAI chat-completions client.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::client::{AiError, ReasoningClient, Reply, Result, Usage};
use crate::conversation::Conversation;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Reasoning client backed by the OpenAI chat-completions API.
pub struct OpenAiClient {
    model: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client for `model`.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create from an optional key, failing when it is absent or empty.
    pub fn try_new(api_key: Option<String>, model: impl Into<String>) -> Result<Self> {
        match api_key {
            Some(key) if !key.is_empty() => Ok(Self::new(key, model)),
            _ => Err(AiError::MissingApiKey),
        }
    }

    /// Point at a different API root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ReasoningClient for OpenAiClient {
    async fn reply(&self, conversation: &Conversation) -> Result<Reply> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let body = json!({
            "model": self.model,
            "messages": conversation.messages(),
        });

        debug!(
            "Sending {} messages of conversation {} to {}",
            conversation.messages().len(),
            conversation.id(),
            self.model
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AiError::Api { status: status.as_u16(), body });
        }

        let json: serde_json::Value = resp.json().await?;

        let text = json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or(AiError::MissingContent)?
            .trim()
            .to_string();

        let usage = json
            .get("usage")
            .and_then(|u| serde_json::from_value::<Usage>(u.clone()).ok())
            .unwrap_or_default();

        Ok(Reply { text, usage })
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
