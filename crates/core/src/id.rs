//! Identifiers for rmq entities.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Key of an article document in the store.
///
/// New documents are keyed by the article title; documents found through a
/// DOI match keep whatever key they were created with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleKey(String);

impl ArticleKey {
    /// Create a key from a title or existing document name.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the raw key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArticleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArticleKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ArticleKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Unique identifier for a per-article conversation with the reasoning service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(Ulid);

impl ConversationId {
    /// Generate a new ConversationId
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for ConversationId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_ids_are_unique() {
        assert_ne!(ConversationId::new(), ConversationId::new());
    }

    #[test]
    fn test_conversation_id_parses_its_display() {
        let id = ConversationId::new();
        let parsed: ConversationId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_article_key_serializes_as_plain_string() {
        let key = ArticleKey::new("A Study of Things");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"A Study of Things\"");
    }
}
