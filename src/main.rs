use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use lda::config::{Config, ParamOverrides};
use lda::db::traits::LAST_TRAINED_MODEL;
use lda::db::ModelStore;

/// lda: Latent Dirichlet Allocation topic modeling.
///
/// Fits topic models to plain-text documents, stores them locally, and lets
/// you explore topics and infer them for new text.
#[derive(Parser)]
#[command(name = "lda", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the model database
    Init,

    /// Fit a topic model to a directory of documents or a line-per-document file
    Train {
        /// Directory of .txt/.md files, or a file with one document per line
        path: PathBuf,

        /// Name to store the model under (default: "default")
        #[arg(long, default_value = "default")]
        name: String,

        /// Number of topics
        #[arg(long)]
        topics: Option<usize>,

        /// Gibbs sweeps over the corpus
        #[arg(long)]
        iterations: Option<usize>,

        /// Sweeps discarded before averaging samples
        #[arg(long)]
        burn_in: Option<usize>,

        /// Document-topic prior (default: 50 / topics)
        #[arg(long)]
        alpha: Option<f64>,

        /// Topic-word prior
        #[arg(long)]
        beta: Option<f64>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Drop words that appear in fewer documents than this
        #[arg(long)]
        min_doc_freq: Option<usize>,

        /// Drop words that appear in more than this share of documents
        #[arg(long)]
        max_doc_ratio: Option<f64>,

        /// Re-estimate alpha every N sweeps after burn-in (0 = off)
        #[arg(long, default_value = "0")]
        optimize_interval: usize,
    },

    /// Show the topics of a stored model
    Topics {
        /// Model name (default: the last trained model)
        #[arg(long)]
        name: Option<String>,

        /// Words to show per topic
        #[arg(long)]
        top_words: Option<usize>,
    },

    /// Show the dominant topic of each training document
    Documents {
        #[arg(long)]
        name: Option<String>,

        /// Maximum documents to list (default: 20)
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Infer topic mixtures for new documents
    Infer {
        /// Directory of .txt/.md files, or a file with one document per line
        path: PathBuf,

        #[arg(long)]
        name: Option<String>,

        /// Gibbs sweeps per document (default: 100)
        #[arg(long, default_value = "100")]
        iterations: usize,

        /// Also report held-out perplexity over the documents
        #[arg(long)]
        perplexity: bool,
    },

    /// List training documents with the most similar topic mixtures
    Similar {
        /// Index of the training document (see `lda documents`)
        doc: usize,

        #[arg(long)]
        name: Option<String>,

        /// Number of documents to show (default: 5)
        #[arg(long, default_value = "5")]
        count: usize,
    },

    /// Write a Markdown topic report
    Report {
        #[arg(long)]
        name: Option<String>,

        /// Output file (default: <name>-topics.md)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List stored models
    Models,

    /// Delete a stored model
    Delete {
        name: String,
    },

    /// Show system status (DB size, stored models, last training run)
    Status,

    /// Show package information
    About,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lda=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            info!("Initializing lda database...");
            let db = lda::db::initialize_sqlite(&config.db_path)?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nNext step: cargo run -- train <PATH>");
        }

        Commands::Train {
            path,
            name,
            topics,
            iterations,
            burn_in,
            alpha,
            beta,
            seed,
            min_doc_freq,
            max_doc_ratio,
            optimize_interval,
        } => {
            let params = config.training_params(&ParamOverrides {
                num_topics: topics,
                alpha,
                beta,
                iterations,
                burn_in,
                seed,
                optimize_interval,
            })?;

            let mut corpus_options = config.corpus_options();
            if let Some(f) = min_doc_freq {
                corpus_options.min_doc_freq = f;
            }
            if let Some(r) = max_doc_ratio {
                corpus_options.max_doc_ratio = r;
            }

            println!("Reading documents from {}...", path.display());
            let corpus = lda::corpus::Corpus::load_path(&path, &corpus_options)?;
            println!(
                "  {} documents, {} distinct words, {} tokens",
                corpus.len(),
                corpus.vocabulary.len(),
                corpus.token_count()
            );

            let db = lda::db::initialize_sqlite(&config.db_path)?;
            let path_str = path.display().to_string();
            let report =
                lda::pipeline::train::run(&db, corpus, params, &name, Some(&path_str)).await?;

            lda::output::terminal::display_training_report(&report);
            let summaries = lda::topics::summary::summarize(&report.model, config.top_words);
            lda::topics::summary::display(&summaries, &report.name);

            println!("{}", format!("Model saved as '{}'.", report.name).bold());
        }

        Commands::Topics { name, top_words } => {
            let db = lda::db::open_sqlite(&config.db_path)?;
            let (name, stored) = load_model(&db, name).await?;
            let summaries = lda::topics::summary::summarize(
                &stored.model,
                top_words.unwrap_or(config.top_words),
            );
            lda::topics::summary::display(&summaries, &name);
        }

        Commands::Documents { name, limit } => {
            let db = lda::db::open_sqlite(&config.db_path)?;
            let (_, stored) = load_model(&db, name).await?;
            lda::output::terminal::display_documents(&stored.model, limit);
        }

        Commands::Infer {
            path,
            name,
            iterations,
            perplexity,
        } => {
            let db = lda::db::open_sqlite(&config.db_path)?;
            let (_, stored) = load_model(&db, name).await?;
            let texts = lda::corpus::read_texts(&path)?;
            let seed = stored.model.params.seed;
            let model = Arc::new(stored.model);

            let bodies: Vec<String> = texts.iter().map(|(_, t)| t.clone()).collect();
            let results =
                lda::pipeline::infer::run(Arc::clone(&model), texts, iterations, seed).await?;
            lda::output::terminal::display_inferred(&model, &results);

            if perplexity {
                let held_out = tokio::task::spawn_blocking(move || {
                    lda::model::Inferencer::new(&model, iterations, seed)?.perplexity(&bodies)
                })
                .await??;
                match held_out {
                    Some(ppl) => {
                        println!("\n  Held-out perplexity: {}", format!("{ppl:.1}").bold())
                    }
                    None => println!(
                        "\n  Held-out perplexity: {}",
                        "unavailable, no input word is in the model's vocabulary".yellow()
                    ),
                }
            }
        }

        Commands::Similar { doc, name, count } => {
            let db = lda::db::open_sqlite(&config.db_path)?;
            let (_, stored) = load_model(&db, name).await?;
            let similar =
                lda::topics::similarity::most_similar_documents(&stored.model, doc, count)?;
            lda::output::terminal::display_similar(&stored.model, doc, &similar);
        }

        Commands::Report { name, output } => {
            let db = lda::db::open_sqlite(&config.db_path)?;
            let (name, stored) = load_model(&db, name).await?;
            let output = output.unwrap_or_else(|| PathBuf::from(format!("{name}-topics.md")));
            let summaries = lda::topics::summary::summarize(&stored.model, config.top_words);
            lda::output::markdown::generate_report(
                &output,
                &name,
                &stored.model,
                &summaries,
                stored.record.perplexity,
            )?;
            println!("Report written to {}", output.display());
        }

        Commands::Models => {
            let db = lda::db::open_sqlite(&config.db_path)?;
            let records = db.list_models().await?;
            let last = db.get_state(LAST_TRAINED_MODEL).await?;
            lda::output::terminal::display_model_list(&records, last.as_deref());
        }

        Commands::Delete { name } => {
            let db = lda::db::open_sqlite(&config.db_path)?;
            if db.delete_model(&name).await? {
                println!("Deleted model '{name}'.");
            } else {
                anyhow::bail!("No model named '{name}'. Run `lda models` to list them.");
            }
        }

        Commands::Status => {
            if !lda::status::database_exists(&config.db_path) {
                println!("Database: not initialized");
                println!("\nRun `lda init` to set up the database.");
                return Ok(());
            }
            let db = lda::db::open_sqlite(&config.db_path)?;
            lda::status::show(&db, &config.db_path).await?;
        }

        Commands::About => {
            let manifest = lda::manifest::PackageManifest::load(&config.readme_path)?;
            lda::output::terminal::display_manifest(&manifest);
        }
    }

    Ok(())
}

/// Load a model by name, falling back to the last trained model.
async fn load_model(
    db: &Arc<dyn ModelStore>,
    name: Option<String>,
) -> Result<(String, lda::db::models::StoredModel)> {
    let name = match name {
        Some(name) => name,
        None => db.get_state(LAST_TRAINED_MODEL).await?.ok_or_else(|| {
            anyhow::anyhow!("No model trained yet. Run `lda train <PATH>` first.")
        })?,
    };

    match db.load_model(&name).await? {
        Some(stored) => Ok((name, stored)),
        None => anyhow::bail!("No model named '{name}'. Run `lda models` to list them."),
    }
}
