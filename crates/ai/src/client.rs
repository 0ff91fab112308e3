//! Reasoning service seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::conversation::Conversation;

/// Error type for reasoning service calls.
pub type Result<T> = std::result::Result<T, AiError>;

/// Errors talking to the reasoning service.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// Transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response
    #[error("API error (status {status}): {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Response did not contain a message
    #[error("API response missing content")]
    MissingContent,

    /// No API key configured
    #[error("missing API key (pass --api-key or set OPENAI_API_KEY)")]
    MissingApiKey,
}

/// Token accounting for one call or a whole conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Prompt tokens
    pub prompt_tokens: u64,
    /// Completion tokens
    pub completion_tokens: u64,
    /// Total tokens
    pub total_tokens: u64,
}

impl std::ops::AddAssign for Usage {
    fn add_assign(&mut self, other: Self) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// A reply from the reasoning service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply text
    pub text: String,
    /// Tokens used by this call
    pub usage: Usage,
}

impl Reply {
    /// Reply with no usage information.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: Usage::default(),
        }
    }
}

/// A service that answers the next turn of a conversation.
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    /// Produce the reply to the conversation's latest message.
    async fn reply(&self, conversation: &Conversation) -> Result<Reply>;

    /// Provider name for logs.
    fn provider_name(&self) -> &'static str;
}
