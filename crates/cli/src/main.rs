//! rmq CLI - research method quality pipeline.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rmq_ai::OpenAiClient;
use rmq_core::{ArticleKey, Settings};
use rmq_criteria::CriteriaStore;
use rmq_papers::CrossrefClient;
use rmq_pipeline::{ArticlePipeline, PipelineConfig, ProcessOutcome};
use rmq_storage::{ArticleStore, JsonStorage};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rmq")]
#[command(about = "Classify research articles and check them against method criteria", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Directory of `<method>.csv` criteria files
    #[arg(long, global = true)]
    criteria_dir: Option<PathBuf>,

    /// Root of the article document store
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// Chat model
    #[arg(long, global = true)]
    model: Option<String>,

    /// API key of the reasoning service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Contact address sent to Crossref
    #[arg(long, global = true)]
    crossref_mailto: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify and check every PDF in a directory
    Process {
        /// Directory of PDF files
        #[arg(long)]
        articles: Option<PathBuf>,
    },
    /// Inspect criteria
    #[command(subcommand)]
    Criteria(CriteriaCommand),
    /// Inspect stored articles
    #[command(subcommand)]
    Article(ArticleCommand),
}

#[derive(Subcommand)]
enum CriteriaCommand {
    /// Load a criteria file (or a method's file) and dump it
    Show {
        /// Path to a CSV file, or a research method
        source: String,
    },
    /// Print the question asked for one criterion
    Prompt {
        /// Research method
        method: String,
        /// Criterion description
        description: String,
    },
    /// Criteria of a method as JSON
    List {
        /// Research method
        method: String,
    },
    /// Methods with a criteria file
    Methods,
}

#[derive(Subcommand)]
enum ArticleCommand {
    /// Show an article
    Show {
        /// Document key (the title the article was saved under)
        key: String,
    },
    /// Delete an article
    Delete {
        /// Document key
        key: String,
    },
    /// List stored articles
    List,
    /// Check whether an article with this DOI is stored
    Exists {
        /// DOI
        doi: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings = settings(&cli.global);

    match cli.command {
        Commands::Process { articles } => {
            let dir = articles.unwrap_or_else(|| settings.articles_dir.clone());
            let reasoner = OpenAiClient::try_new(cli.global.api_key, settings.model.clone())?;
            info!("Using model {}", reasoner.model());

            let store = JsonStorage::new(&settings.store_dir).await?;
            let crossref = CrossrefClient::new(settings.crossref_mailto.as_deref())?;
            let mut pipeline = ArticlePipeline::new(
                store,
                CriteriaStore::new(&settings.criteria_dir),
                Box::new(reasoner),
                Box::new(crossref),
            )
            .with_config(PipelineConfig::from(&settings));

            let summary = pipeline.process_directory(&dir).await?;
            for (path, outcome) in &summary.outcomes {
                println!("{}: {}", path.display(), describe(outcome));
            }
            println!(
                "{} stored, {} already stored, {} failed",
                summary.stored(),
                summary.already_stored(),
                summary.failed()
            );
        }
        Commands::Criteria(cmd) => criteria_command(cmd, &settings)?,
        Commands::Article(cmd) => {
            let store = JsonStorage::new(&settings.store_dir).await?;
            article_command(cmd, store).await?;
        }
    }

    Ok(())
}

/// Environment settings overridden by command-line flags.
fn settings(args: &GlobalArgs) -> Settings {
    let mut settings = Settings::from_env();
    if let Some(dir) = &args.criteria_dir {
        settings.criteria_dir = dir.clone();
    }
    if let Some(dir) = &args.store_dir {
        settings.store_dir = dir.clone();
    }
    if let Some(model) = &args.model {
        settings.model = model.clone();
    }
    if let Some(mail) = &args.crossref_mailto {
        settings.crossref_mailto = Some(mail.clone());
    }
    settings
}

fn criteria_command(cmd: CriteriaCommand, settings: &Settings) -> Result<()> {
    let mut criteria = CriteriaStore::new(&settings.criteria_dir);

    match cmd {
        CriteriaCommand::Show { source } => {
            let path = Path::new(&source);
            if path.is_file() {
                let stats = criteria.load_from_csv(path)?;
                info!("Loaded {} rows ({} skipped)", stats.rows, stats.skipped);
            } else if criteria.load_if_present(&source)?.is_none() {
                println!("No criteria defined for {source}");
                return Ok(());
            }
            print!("{}", criteria.print_all_criteria());
        }
        CriteriaCommand::Prompt { method, description } => {
            criteria.load_if_present(&method)?;
            println!("{}", criteria.generate_prompt_for_criterion(&method, &description));
        }
        CriteriaCommand::List { method } => match criteria.is_criteria_available(&method)? {
            Some(records) => println!("{}", serde_json::to_string_pretty(&records)?),
            None => println!("No criteria defined for {method}"),
        },
        CriteriaCommand::Methods => {
            for method in criteria.available_methods()? {
                println!("{method}");
            }
        }
    }

    Ok(())
}

async fn article_command(cmd: ArticleCommand, mut store: JsonStorage) -> Result<()> {
    match cmd {
        ArticleCommand::Show { key } => match store.load_article(&ArticleKey::new(key)).await? {
            Some(article) => println!("{article}"),
            None => println!("Article not found"),
        },
        ArticleCommand::Delete { key } => {
            store.delete_article(&ArticleKey::new(key.clone())).await?;
            println!("Deleted: {key}");
        }
        ArticleCommand::List => {
            let articles = store.list_articles().await?;
            println!("Articles ({})", articles.len());
            for (key, article) in articles {
                println!(
                    "  {} | {} | {}",
                    key,
                    article.research_method,
                    article.doi.as_deref().unwrap_or("-")
                );
            }
        }
        ArticleCommand::Exists { doi } => {
            if store.doi_exists(&doi).await? {
                println!("Article with DOI {doi} exists");
            } else {
                println!("No article with DOI {doi}");
            }
        }
    }

    Ok(())
}

fn describe(outcome: &ProcessOutcome) -> String {
    match outcome {
        ProcessOutcome::Stored { saved, method, report } => format!(
            "{} as {} ({} criteria checked)",
            saved.key(),
            method,
            report.verdicts.len()
        ),
        ProcessOutcome::AlreadyStored { doi } => format!("already stored (DOI {doi})"),
        ProcessOutcome::Failed(message) => format!("failed: {message}"),
    }
}
