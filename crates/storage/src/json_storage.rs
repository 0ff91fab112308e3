//! JSON file storage implementation.
//!
//! Stores one pretty-printed JSON document per article under `articles/` and
//! keeps small per-document meta markers (version + updated_at) under
//! `meta/articles/`. File names are the URL-encoded document key.

use std::path::{Path, PathBuf};

use rmq_core::{Article, ArticleKey};
use tokio::fs;
use tracing::{debug, warn};

use super::{ArticleStore, StorageError, Result};

const ARTICLES: &str = "articles";

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Create storage, creating the data and meta directories if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join(ARTICLES)).await?;
        fs::create_dir_all(root.join("meta").join(ARTICLES)).await?;

        Ok(Self { root })
    }

    fn article_path(&self, key: &ArticleKey) -> PathBuf {
        self.root
            .join(ARTICLES)
            .join(format!("{}.json", urlencoding::encode(key.as_str())))
    }

    fn meta_path(&self, key: &ArticleKey) -> PathBuf {
        self.root
            .join("meta")
            .join(ARTICLES)
            .join(format!("{}.meta.json", urlencoding::encode(key.as_str())))
    }

    /// Current version marker of a document (0 if never written).
    pub async fn version(&self, key: &ArticleKey) -> Result<u64> {
        let meta: Option<serde_json::Value> = read_json(&self.meta_path(key)).await?;
        Ok(meta
            .and_then(|m| m.get("version").and_then(|v| v.as_u64()))
            .unwrap_or(0))
    }

    /// Read and increment per-document version, return new version.
    async fn bump_version(&self, key: &ArticleKey) -> Result<u64> {
        let version = self.version(key).await? + 1;
        let meta = serde_json::json!({"version": version, "updated_at": chrono::Utc::now()});
        fs::write(self.meta_path(key), serde_json::to_string_pretty(&meta)?.as_bytes()).await?;
        Ok(version)
    }

    async fn write_article(&self, key: &ArticleKey, article: &Article) -> Result<()> {
        let json = serde_json::to_string_pretty(article)?;
        fs::write(self.article_path(key), json.as_bytes()).await?;
        let version = self.bump_version(key).await?;
        debug!("Wrote article '{}' (version {})", key, version);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ArticleStore for JsonStorage {
    async fn put_article(&mut self, key: &ArticleKey, article: &Article) -> Result<()> {
        self.write_article(key, article).await
    }

    async fn load_article(&self, key: &ArticleKey) -> Result<Option<Article>> {
        read_json(&self.article_path(key)).await
    }

    async fn update_article(&mut self, key: &ArticleKey, article: &Article) -> Result<()> {
        if fs::metadata(self.article_path(key)).await.is_err() {
            return Err(StorageError::NotFound(key.to_string()));
        }
        self.write_article(key, article).await
    }

    async fn delete_article(&mut self, key: &ArticleKey) -> Result<()> {
        for path in [self.article_path(key), self.meta_path(key)] {
            fs::remove_file(path).await.or_else(|e| {
                if e.kind() == std::io::ErrorKind::NotFound { Ok(()) } else { Err(e) }
            })?;
        }
        debug!("Deleted article '{}'", key);
        Ok(())
    }

    async fn list_articles(&self) -> Result<Vec<(ArticleKey, Article)>> {
        let mut items = Vec::new();
        let mut rd = fs::read_dir(self.root.join(ARTICLES)).await?;
        while let Some(entry) = rd.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Some(key) = key_from_path(&path) else {
                continue;
            };
            match read_json(&path).await {
                Ok(Some(article)) => items.push((key, article)),
                Ok(None) => {}
                Err(e) => warn!("Skipping unreadable article {}: {}", path.display(), e),
            }
        }
        items.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(items)
    }
}

fn key_from_path(path: &Path) -> Option<ArticleKey> {
    let stem = path.file_stem()?.to_str()?;
    let decoded = urlencoding::decode(stem).ok()?;
    Some(ArticleKey::new(decoded.into_owned()))
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SaveOutcome;
    use rmq_core::{QualityReport, Verdict};
    use tempfile::TempDir;

    fn article(name: &str, doi: Option<&str>) -> Article {
        let mut article = Article::new(name, "Experiments", doi.map(String::from));
        article.add_filename(format!("{name}.pdf"));
        article
    }

    #[tokio::test]
    async fn test_save_creates_document_keyed_by_title() {
        let dir = TempDir::new().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        let outcome = storage.save_article(&article("On Testing", Some("10.1/a"))).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Created(ArticleKey::new("On Testing")));

        let loaded = storage.load_article(&ArticleKey::new("On Testing")).await.unwrap().unwrap();
        assert_eq!(loaded.doi.as_deref(), Some("10.1/a"));
        assert_eq!(storage.version(outcome.key()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_save_with_known_doi_updates_existing_key() {
        let dir = TempDir::new().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        storage.save_article(&article("Original Title", Some("10.1/a"))).await.unwrap();

        let mut report = QualityReport::new();
        report.record("Randomization", Verdict::Yes);
        let renamed = article("Slightly Different Title", Some("10.1/a")).with_rm_quality(report);
        let outcome = storage.save_article(&renamed).await.unwrap();

        assert_eq!(outcome, SaveOutcome::Updated(ArticleKey::new("Original Title")));
        let all = storage.list_articles().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].1.name, "Slightly Different Title");
        assert_eq!(all[0].1.rm_quality.count(Verdict::Yes), 1);
        assert_eq!(storage.version(&ArticleKey::new("Original Title")).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_articles_without_doi_are_keyed_by_title() {
        let dir = TempDir::new().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        storage.save_article(&article("First", None)).await.unwrap();
        let outcome = storage.save_article(&article("Second", None)).await.unwrap();

        assert_eq!(outcome, SaveOutcome::Created(ArticleKey::new("Second")));
        assert_eq!(storage.list_articles().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_doi_exists() {
        let dir = TempDir::new().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        storage.save_article(&article("A", Some("10.1/a"))).await.unwrap();

        assert!(storage.doi_exists("10.1/a").await.unwrap());
        assert!(!storage.doi_exists("10.1/b").await.unwrap());
    }

    #[tokio::test]
    async fn test_keys_with_path_characters_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        let title = "Input/Output: a 50% study?";

        storage.save_article(&article(title, None)).await.unwrap();

        let all = storage.list_articles().await.unwrap();
        assert_eq!(all[0].0.as_str(), title);
        assert!(storage.load_article(&ArticleKey::new(title)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unreadable_document_is_skipped_in_listing() {
        let dir = TempDir::new().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        storage.save_article(&article("Good", Some("10.1/good"))).await.unwrap();
        std::fs::write(dir.path().join(ARTICLES).join("Broken.json"), "{ not json").unwrap();

        let all = storage.list_articles().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].0.as_str(), "Good");
        assert!(storage.doi_exists("10.1/good").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        let err = storage
            .update_article(&ArticleKey::new("ghost"), &article("ghost", None))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = TempDir::new().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        let key = ArticleKey::new("A");
        storage.save_article(&article("A", Some("10.1/a"))).await.unwrap();

        storage.delete_article(&key).await.unwrap();
        storage.delete_article(&key).await.unwrap();

        assert!(storage.load_article(&key).await.unwrap().is_none());
        assert!(!storage.doi_exists("10.1/a").await.unwrap());
        assert_eq!(storage.version(&key).await.unwrap(), 0);
    }
}
