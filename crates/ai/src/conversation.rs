//! Per-article conversation context.

use rmq_core::ConversationId;
use serde::{Deserialize, Serialize};

use crate::client::Usage;

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Our questions
    User,
    /// Service replies
    Assistant,
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author
    pub role: Role,
    /// Text
    pub content: String,
}

/// Ordered message history sent to the reasoning service with every turn.
#[derive(Debug, Clone)]
pub struct Conversation {
    id: ConversationId,
    messages: Vec<Message>,
    usage: Usage,
}

impl Conversation {
    /// Start an empty conversation.
    pub fn new() -> Self {
        Self {
            id: ConversationId::new(),
            messages: Vec::new(),
            usage: Usage::default(),
        }
    }

    /// Conversation identifier.
    pub fn id(&self) -> ConversationId {
        self.id
    }

    /// Messages in order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Append a message.
    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message {
            role,
            content: content.into(),
        });
    }

    /// Append a user question.
    pub fn ask_user(&mut self, content: impl Into<String>) {
        self.push(Role::User, content);
    }

    /// Append a service reply and account for its tokens.
    pub fn record_reply(&mut self, content: impl Into<String>, usage: Usage) {
        self.push(Role::Assistant, content);
        self.usage += usage;
    }

    /// Tokens consumed so far.
    pub fn usage(&self) -> Usage {
        self.usage
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
