//! Reasoning service access.
//!
//! Conversations, the chat-completions client, and the per-article assistant
//! that asks for titles, methods and criterion verdicts.

#![warn(missing_docs)]

pub mod conversation;
pub mod client;
pub mod openai;
pub mod prompts;
pub mod assistant;

pub use conversation::{Conversation, Message, Role};
pub use client::{ReasoningClient, Reply, Usage, AiError, Result};
pub use openai::OpenAiClient;
pub use prompts::{Classification, parse_title, parse_method, parse_classification};
pub use assistant::ArticleAssistant;
