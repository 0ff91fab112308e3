//! The article pipeline - runs one pass per PDF file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use rmq_ai::{ArticleAssistant, ReasoningClient};
use rmq_core::{Article, QualityReport, Settings};
use rmq_criteria::CriteriaStore;
use rmq_papers::{lookup_with_retry, DoiLookup, PdfTextSource, TextSource};
use rmq_storage::{ArticleStore, SaveOutcome};
use tracing::{debug, error, info, warn};

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Characters of text used to find the title
    pub title_excerpt_chars: usize,
    /// Characters of text used to classify the method
    pub method_excerpt_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            title_excerpt_chars: 1000,
            method_excerpt_chars: 5000,
        }
    }
}

impl From<&Settings> for PipelineConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            title_excerpt_chars: settings.title_excerpt_chars,
            method_excerpt_chars: settings.method_excerpt_chars,
        }
    }
}

/// The article pipeline.
///
/// For every article:
/// ```text
/// Title → DOI lookup → (skip if stored) → Method → Criteria checks → Save
/// ```
pub struct ArticlePipeline<S: ArticleStore> {
    store: S,
    criteria: CriteriaStore,
    reasoner: Box<dyn ReasoningClient>,
    doi_lookup: Box<dyn DoiLookup>,
    text_source: Box<dyn TextSource>,
    config: PipelineConfig,
}

impl<S: ArticleStore> ArticlePipeline<S> {
    /// Create a pipeline reading PDFs with pdf-extract.
    pub fn new(
        store: S,
        criteria: CriteriaStore,
        reasoner: Box<dyn ReasoningClient>,
        doi_lookup: Box<dyn DoiLookup>,
    ) -> Self {
        Self {
            store,
            criteria,
            reasoner,
            doi_lookup,
            text_source: Box::new(PdfTextSource),
            config: PipelineConfig::default(),
        }
    }

    /// Replace the text source.
    pub fn with_text_source(mut self, text_source: Box<dyn TextSource>) -> Self {
        self.text_source = text_source;
        self
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Process one article file.
    pub async fn process_file(&mut self, path: &Path) -> anyhow::Result<ProcessOutcome> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("Processing: {}", path.display());

        let mut assistant = ArticleAssistant::new(self.reasoner.as_ref());

        // 1. Title from a short excerpt
        let excerpt = self
            .text_source
            .excerpt(path, self.config.title_excerpt_chars)
            .await
            .with_context(|| format!("extracting text from {}", path.display()))?;
        let title = assistant.extract_title(&excerpt).await.context("extracting title")?;

        // 2. DOI, one retry
        let doi = match lookup_with_retry(self.doi_lookup.as_ref(), &title).await {
            Ok(Some(doi)) => {
                info!("DOI found: {}", doi);
                Some(doi)
            }
            Ok(None) => {
                warn!("No DOI found for title '{}'", title);
                None
            }
            Err(e) => {
                warn!("DOI lookup failed twice for '{}': {}", title, e);
                None
            }
        };

        if let Some(doi) = &doi {
            if self.store.doi_exists(doi).await? {
                info!("Article with DOI {} already stored, skipping classification", doi);
                assistant.finish();
                return Ok(ProcessOutcome::AlreadyStored { doi: doi.clone() });
            }
        }

        // 3. Method from a longer excerpt
        let excerpt = self
            .text_source
            .excerpt(path, self.config.method_excerpt_chars)
            .await
            .with_context(|| format!("extracting text from {}", path.display()))?;
        let method = assistant.classify_method(&excerpt).await.context("classifying method")?;

        // 4. Criteria checks
        let report = evaluate_criteria(&mut self.criteria, &mut assistant, &method).await?;

        // 5. Persist
        let mut article = Article::new(title, method.clone(), doi).with_rm_quality(report);
        article.add_filename(filename);
        let saved = self.store.save_article(&article).await?;

        assistant.finish();

        Ok(ProcessOutcome::Stored {
            saved,
            method,
            report: article.rm_quality,
        })
    }

    /// Process every PDF in a directory, in file name order.
    ///
    /// A failing article is logged and recorded; the batch continues.
    pub async fn process_directory(&mut self, dir: &Path) -> anyhow::Result<BatchSummary> {
        let files = pdf_files(dir)
            .await
            .with_context(|| format!("reading {}", dir.display()))?;
        info!("Found {} PDF files in {}", files.len(), dir.display());

        let mut summary = BatchSummary::default();
        for path in files {
            let outcome = match self.process_file(&path).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Failed to process {}: {:#}", path.display(), e);
                    ProcessOutcome::Failed(format!("{e:#}"))
                }
            };
            summary.outcomes.push((path, outcome));
        }

        info!(
            "Batch finished: {} stored, {} already stored, {} failed",
            summary.stored(),
            summary.already_stored(),
            summary.failed()
        );
        Ok(summary)
    }

    /// Criteria repository.
    pub fn criteria(&self) -> &CriteriaStore {
        &self.criteria
    }

    /// Get a reference to the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a mutable reference to the store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

/// Ask one question per criterion of `method` and collect the verdicts.
///
/// A method without a criteria file yields an empty report.
async fn evaluate_criteria(
    criteria: &mut CriteriaStore,
    assistant: &mut ArticleAssistant<'_>,
    method: &str,
) -> anyhow::Result<QualityReport> {
    let descriptions: Vec<String> = match criteria
        .load_if_present(method)
        .with_context(|| format!("loading criteria for {method}"))?
    {
        Some(set) => set.iter().map(|c| c.description().to_string()).collect(),
        None => {
            info!("No criteria found for {}", method);
            return Ok(QualityReport::new());
        }
    };

    let mut report = QualityReport::new();
    for description in descriptions {
        let prompt = criteria.generate_prompt_for_criterion(method, &description);
        let verdict = assistant.evaluate(&prompt).await;
        debug!("Extracted: ({}, {})", description, verdict);
        report.record(description, verdict);
    }
    Ok(report)
}

async fn pdf_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut rd = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        let path = entry.path();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Result of processing one article.
#[derive(Debug)]
pub enum ProcessOutcome {
    /// Article classified, checked and saved
    Stored {
        /// Document written
        saved: SaveOutcome,
        /// Classified method
        method: String,
        /// Criteria verdicts
        report: QualityReport,
    },
    /// An article with the same DOI was already stored
    AlreadyStored {
        /// DOI found in the store
        doi: String,
    },
    /// Processing failed
    Failed(String),
}

/// Outcomes of a directory run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Outcome per file, in processing order
    pub outcomes: Vec<(PathBuf, ProcessOutcome)>,
}

impl BatchSummary {
    /// Articles saved.
    pub fn stored(&self) -> usize {
        self.count(|o| matches!(o, ProcessOutcome::Stored { .. }))
    }

    /// Articles skipped because their DOI was stored.
    pub fn already_stored(&self) -> usize {
        self.count(|o| matches!(o, ProcessOutcome::AlreadyStored { .. }))
    }

    /// Articles that failed.
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ProcessOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&ProcessOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rmq_ai::{Conversation, Reply};
    use rmq_core::{ArticleKey, Verdict};
    use rmq_papers::PaperError;
    use rmq_storage::JsonStorage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Answers by the kind of question asked.
    struct FakeReasoner {
        title: &'static str,
        method: &'static str,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ReasoningClient for FakeReasoner {
        async fn reply(&self, conversation: &Conversation) -> rmq_ai::Result<Reply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let question = conversation.messages().last().map(|m| m.content.as_str()).unwrap_or("");
            let text = if question.starts_with("Extract the title") {
                format!("Title: {}", self.title)
            } else if question.starts_with("Classify the research method") {
                format!("Resulting Method: {}", self.method)
            } else if question.contains("Randomization") {
                "Random assignment is described.\nYes".to_string()
            } else {
                "No".to_string()
            };
            Ok(Reply::text(text))
        }

        fn provider_name(&self) -> &'static str {
            "fake"
        }
    }

    struct FakeDoi(Option<&'static str>);

    #[async_trait]
    impl DoiLookup for FakeDoi {
        async fn doi_for_title(&self, _title: &str) -> rmq_papers::Result<Option<String>> {
            Ok(self.0.map(String::from))
        }
    }

    /// Serves fixed text, failing for files named `broken.pdf`.
    struct FakeText;

    #[async_trait]
    impl TextSource for FakeText {
        async fn excerpt(&self, path: &Path, _max_chars: usize) -> rmq_papers::Result<String> {
            if path.ends_with("broken.pdf") {
                return Err(PaperError::Pdf {
                    path: path.display().to_string(),
                    message: "encrypted".to_string(),
                });
            }
            Ok("Some article text.".to_string())
        }
    }

    struct Fixture {
        _dir: TempDir,
        articles: PathBuf,
        criteria: PathBuf,
        store: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let articles = dir.path().join("articles");
        let criteria = dir.path().join("csv");
        let store = dir.path().join("store");
        std::fs::create_dir_all(&articles).unwrap();
        std::fs::create_dir_all(&criteria).unwrap();
        std::fs::write(
            criteria.join("Experiments.csv"),
            "description,level,moscow_priority,attribute_text\n\
             Randomization,High,Must Have,random assignment used\n\
             Randomization,High,Could Have,blinding applied\n\
             Sample size,Medium,Should Have,power analysis reported\n",
        )
        .unwrap();
        Fixture { _dir: dir, articles, criteria, store }
    }

    async fn pipeline(
        fx: &Fixture,
        method: &'static str,
        doi: Option<&'static str>,
        calls: Arc<AtomicUsize>,
    ) -> ArticlePipeline<JsonStorage> {
        let store = JsonStorage::new(&fx.store).await.unwrap();
        let reasoner = FakeReasoner { title: "On Randomness", method, calls };
        ArticlePipeline::new(
            store,
            CriteriaStore::new(&fx.criteria),
            Box::new(reasoner),
            Box::new(FakeDoi(doi)),
        )
        .with_text_source(Box::new(FakeText))
    }

    #[tokio::test]
    async fn test_article_is_checked_against_every_criterion() {
        let fx = fixture();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut pipeline = pipeline(&fx, "experiments", Some("10.1/rand"), calls.clone()).await;

        let outcome = pipeline.process_file(&fx.articles.join("a.pdf")).await.unwrap();

        let ProcessOutcome::Stored { saved, method, report } = outcome else {
            panic!("expected Stored");
        };
        assert_eq!(saved, SaveOutcome::Created(ArticleKey::new("On Randomness")));
        assert_eq!(method, "Experiments");
        assert_eq!(report.verdicts.len(), 2);
        assert_eq!(report.count(Verdict::Yes), 1);
        assert_eq!(report.count(Verdict::Unknown), 0);
        // title + method + one question per criterion
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        let stored = pipeline
            .store()
            .load_article(&ArticleKey::new("On Randomness"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.doi.as_deref(), Some("10.1/rand"));
        assert!(stored.filenames.contains("a.pdf"));
        assert_eq!(stored.rm_quality, report);
    }

    #[tokio::test]
    async fn test_known_doi_skips_classification() {
        let fx = fixture();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut pipeline = pipeline(&fx, "Experiments", Some("10.1/rand"), calls.clone()).await;
        pipeline
            .store_mut()
            .save_article(&Article::new("Earlier", "Experiments", Some("10.1/rand".into())))
            .await
            .unwrap();

        let outcome = pipeline.process_file(&fx.articles.join("a.pdf")).await.unwrap();

        assert!(matches!(outcome, ProcessOutcome::AlreadyStored { ref doi } if doi == "10.1/rand"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(pipeline.store().list_articles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_doi_still_stores_article() {
        let fx = fixture();
        let mut pipeline = pipeline(&fx, "Experiments", None, Arc::new(AtomicUsize::new(0))).await;

        pipeline.process_file(&fx.articles.join("a.pdf")).await.unwrap();

        let stored = pipeline.store().list_articles().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].1.doi, None);
    }

    #[tokio::test]
    async fn test_method_without_criteria_has_empty_report() {
        let fx = fixture();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut pipeline = pipeline(&fx, "Grounded Theory", Some("10.1/gt"), calls.clone()).await;

        let outcome = pipeline.process_file(&fx.articles.join("a.pdf")).await.unwrap();

        let ProcessOutcome::Stored { report, method, .. } = outcome else {
            panic!("expected Stored");
        };
        assert_eq!(method, "Grounded Theory");
        assert!(report.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_directory_run_skips_other_files_and_survives_failures() {
        let fx = fixture();
        for name in ["a.pdf", "B.PDF", "broken.pdf", "notes.txt"] {
            std::fs::write(fx.articles.join(name), b"%PDF").unwrap();
        }
        let mut pipeline = pipeline(&fx, "Experiments", None, Arc::new(AtomicUsize::new(0))).await;

        let summary = pipeline.process_directory(&fx.articles).await.unwrap();

        assert_eq!(summary.outcomes.len(), 3);
        assert_eq!(summary.failed(), 1);
        // Same title for both readable files: the second overwrites the first.
        assert_eq!(summary.stored(), 2);
        let stored = pipeline.store().list_articles().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!(pipeline.criteria().get("Experiments").is_some());
    }
}
