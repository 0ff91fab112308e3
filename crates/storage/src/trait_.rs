//! Storage trait abstraction.

use async_trait::async_trait;
use rmq_core::{Article, ArticleKey};
use tracing::info;

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),
}

/// What `save_article` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new document was written under the article title.
    Created(ArticleKey),
    /// An existing document with the same DOI was updated in place.
    Updated(ArticleKey),
}

impl SaveOutcome {
    /// Key of the document written.
    pub fn key(&self) -> &ArticleKey {
        match self {
            Self::Created(key) | Self::Updated(key) => key,
        }
    }
}

/// Article document store.
///
/// Backends provide keyed document access and a DOI query; the upsert policy
/// of `save_article` is shared by all of them.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Create or overwrite the document at `key`.
    async fn put_article(&mut self, key: &ArticleKey, article: &Article) -> Result<()>;

    /// Load an article by key.
    async fn load_article(&self, key: &ArticleKey) -> Result<Option<Article>>;

    /// Overwrite an existing document; fails with `NotFound` if absent.
    async fn update_article(&mut self, key: &ArticleKey, article: &Article) -> Result<()>;

    /// Delete an article. Deleting a missing key is not an error.
    async fn delete_article(&mut self, key: &ArticleKey) -> Result<()>;

    /// List all stored articles with their keys.
    async fn list_articles(&self) -> Result<Vec<(ArticleKey, Article)>>;

    /// First stored article carrying `doi`.
    async fn find_by_doi(&self, doi: &str) -> Result<Option<(ArticleKey, Article)>> {
        Ok(self
            .list_articles()
            .await?
            .into_iter()
            .find(|(_, article)| article.doi.as_deref() == Some(doi)))
    }

    /// Whether any stored article carries `doi`.
    async fn doi_exists(&self, doi: &str) -> Result<bool> {
        Ok(self.find_by_doi(doi).await?.is_some())
    }

    /// Upsert by DOI.
    ///
    /// If a document with the same DOI exists it is updated under its
    /// existing key; otherwise a new document is created keyed by title.
    async fn save_article(&mut self, article: &Article) -> Result<SaveOutcome> {
        if let Some(doi) = article.doi.as_deref() {
            if let Some((key, _)) = self.find_by_doi(doi).await? {
                self.update_article(&key, article).await?;
                info!("Updated existing article with DOI '{}'", doi);
                return Ok(SaveOutcome::Updated(key));
            }
        }

        let key = article.key();
        self.put_article(&key, article).await?;
        info!("Article '{}' saved", article.name);
        Ok(SaveOutcome::Created(key))
    }
}
