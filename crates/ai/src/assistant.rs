//! Per-article assistant session.

use rmq_core::{ConversationId, Verdict};
use tracing::{debug, info, warn};

use crate::client::{ReasoningClient, Result, Usage};
use crate::conversation::Conversation;
use crate::prompts::{
    classification_prompt, method_prompt, parse_classification, parse_method, parse_title,
    title_prompt, Classification,
};

/// Conversation with the reasoning service about a single article.
///
/// Every question is asked in the same conversation, so later questions see
/// the excerpts sent earlier.
pub struct ArticleAssistant<'a> {
    client: &'a dyn ReasoningClient,
    conversation: Conversation,
}

impl<'a> ArticleAssistant<'a> {
    /// Open a new conversation.
    pub fn new(client: &'a dyn ReasoningClient) -> Self {
        let conversation = Conversation::new();
        info!("Conversation {} opened with {}", conversation.id(), client.provider_name());
        Self { client, conversation }
    }

    /// Conversation identifier.
    pub fn id(&self) -> ConversationId {
        self.conversation.id()
    }

    /// Underlying conversation.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Ask one question and return the reply text.
    pub async fn ask(&mut self, prompt: impl Into<String>) -> Result<String> {
        self.conversation.ask_user(prompt);
        let reply = self.client.reply(&self.conversation).await?;
        self.conversation.record_reply(reply.text.clone(), reply.usage);
        Ok(reply.text)
    }

    /// Title of the article from a short excerpt.
    pub async fn extract_title(&mut self, excerpt: &str) -> Result<String> {
        let reply = self.ask(title_prompt(excerpt)).await?;
        let title = parse_title(&reply);
        info!("Extracted title: {}", title);
        Ok(title)
    }

    /// Research method of the article from a longer excerpt.
    pub async fn classify_method(&mut self, excerpt: &str) -> Result<String> {
        let reply = self.ask(method_prompt(excerpt)).await?;
        let method = parse_method(&reply);
        info!("Extracted research method: {}", method);
        Ok(method)
    }

    /// Title and method in a single question.
    pub async fn classify_article(&mut self, article_text: &str) -> Result<Classification> {
        let reply = self.ask(classification_prompt(article_text)).await?;
        Ok(parse_classification(&reply))
    }

    /// Ask a criterion question and read the verdict from the last line.
    ///
    /// A failed call is reported as `Unknown` rather than an error.
    pub async fn evaluate(&mut self, prompt: &str) -> Verdict {
        debug!("Sending criterion prompt: {}", prompt);
        match self.ask(prompt).await {
            Ok(reply) => Verdict::from_reply(&reply),
            Err(e) => {
                warn!("Criterion question failed in conversation {}: {}", self.id(), e);
                Verdict::Unknown
            }
        }
    }

    /// Close the conversation and return its token usage.
    pub fn finish(self) -> Usage {
        let usage = self.conversation.usage();
        info!(
            "Conversation {} closed ({} prompt + {} completion = {} tokens)",
            self.conversation.id(),
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens
        );
        usage
    }
}
