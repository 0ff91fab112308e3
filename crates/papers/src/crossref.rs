//! Crossref DOI lookup by title.
//!
//! API: https://api.crossref.org/works?query.bibliographic=<title>&rows=1
//! Polite pool: a User-Agent carrying a mailto address (see Crossref etiquette).

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::{PaperError, Result};

const CR_API_BASE: &str = "https://api.crossref.org";

/// Bibliographic lookup from title to DOI.
#[async_trait]
pub trait DoiLookup: Send + Sync {
    /// Best-match DOI for a title, if any.
    async fn doi_for_title(&self, title: &str) -> Result<Option<String>>;
}

/// Look up a DOI, retrying once if the first attempt fails.
///
/// The error of the second attempt is returned if both fail.
pub async fn lookup_with_retry(lookup: &dyn DoiLookup, title: &str) -> Result<Option<String>> {
    match lookup.doi_for_title(title).await {
        Ok(doi) => Ok(doi),
        Err(e) => {
            warn!("DOI retrieval failed ({}), trying once more", e);
            lookup.doi_for_title(title).await
        }
    }
}

/// Crossref REST API client.
pub struct CrossrefClient {
    client: reqwest::Client,
    base_url: String,
}

impl CrossrefClient {
    /// Create a client; `mailto` opts into the polite pool.
    pub fn new(mailto: Option<&str>) -> Result<Self> {
        let user_agent = match mailto {
            Some(mail) => format!("rmq/{} (mailto:{})", env!("CARGO_PKG_VERSION"), mail),
            None => format!("rmq/{}", env!("CARGO_PKG_VERSION")),
        };
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            base_url: CR_API_BASE.to_string(),
        })
    }

    /// Point at a different API root (tests, mirrors).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl DoiLookup for CrossrefClient {
    #[instrument(skip(self))]
    async fn doi_for_title(&self, title: &str) -> Result<Option<String>> {
        let url = format!("{}/works", self.base_url.trim_end_matches('/'));
        let resp = self
            .client
            .get(&url)
            .query(&[("query.bibliographic", title), ("rows", "1")])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(PaperError::Status(resp.status().as_u16()));
        }

        let body: serde_json::Value = resp.json().await?;
        let doi = first_doi(&body);
        debug!(doi = ?doi, "Crossref lookup finished");
        Ok(doi)
    }
}

fn first_doi(body: &serde_json::Value) -> Option<String> {
    body["message"]["items"]
        .as_array()
        .and_then(|items| items.first())
        .and_then(|item| item["DOI"].as_str())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_first_doi() {
        let body = serde_json::json!({
            "message": { "items": [{ "DOI": "10.1000/first" }, { "DOI": "10.1000/second" }] }
        });
        assert_eq!(first_doi(&body).as_deref(), Some("10.1000/first"));

        let empty = serde_json::json!({ "message": { "items": [] } });
        assert_eq!(first_doi(&empty), None);
    }

    /// Fails the first `failures` calls, then answers.
    struct Flaky {
        calls: AtomicUsize,
        failures: usize,
    }

    #[async_trait]
    impl DoiLookup for Flaky {
        async fn doi_for_title(&self, _title: &str) -> Result<Option<String>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(PaperError::Status(503))
            } else {
                Ok(Some("10.1000/xyz".to_string()))
            }
        }
    }

    #[tokio::test]
    async fn test_retry_once_recovers() {
        let lookup = Flaky { calls: AtomicUsize::new(0), failures: 1 };
        let doi = lookup_with_retry(&lookup, "A title").await.unwrap();
        assert_eq!(doi.as_deref(), Some("10.1000/xyz"));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_only_once() {
        let lookup = Flaky { calls: AtomicUsize::new(0), failures: 2 };
        assert!(lookup_with_retry(&lookup, "A title").await.is_err());
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 2);
    }
}
