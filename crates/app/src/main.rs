//! studymaster: flashcard decks with mastery tracking from the terminal.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use services::{Clock, DeckManager};
use storage::repository::Storage;
use study_core::model::DeckId;

mod commands;
mod config;

use config::{AppConfig, DB_URL_ENV};

#[derive(Parser)]
#[command(name = "studymaster", version, about = "Flashcard study planner")]
struct Cli {
    /// Config file path (defaults to ./studymaster.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite URL or file path; overrides config and STUDYMASTER_DB_URL
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List decks
    Decks,

    /// Create an empty deck
    Create {
        name: String,
    },

    /// Add a card to a deck
    AddCard {
        deck_id: DeckId,
        question: String,
        answer: String,
    },

    /// Delete a deck
    Delete {
        deck_id: DeckId,
    },

    /// Show a deck with per-card advice and the recommended session length
    Show {
        deck_id: DeckId,
    },

    /// Rate one card: 1 hard, 2 medium, 3 easy
    Rate {
        deck_id: DeckId,
        card: usize,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=3))]
        confidence: u8,
    },

    /// Study a deck interactively
    Study {
        deck_id: DeckId,

        /// Shuffle the cards first
        #[arg(long)]
        shuffle: bool,
    },

    /// Find decks whose name or cards contain the text
    Search {
        query: String,
    },

    /// Show study statistics and achievements
    Stats,

    /// Export all decks as tab-separated flashcard text
    Export {
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Import tab-separated flashcard text
    Import {
        file: PathBuf,
    },

    /// Create a deck from a `question,answer` file
    ImportCsv {
        name: String,
        file: PathBuf,
    },
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?
        .with_overrides(std::env::var(DB_URL_ENV).ok(), cli.db);
    let db_url = config.database_url();
    config::prepare_sqlite_file(&db_url)?;
    debug!(%db_url, "opening deck store");

    let storage = Storage::sqlite(&db_url)
        .await
        .with_context(|| format!("failed to open {db_url}"))?;
    let mut mgr = DeckManager::load(Clock::default(), storage).await?;
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Decks => commands::list_decks(&mgr, &mut out),
        Commands::Create { name } => {
            let id = mgr.create_deck(name, Vec::new()).await?;
            writeln!(out, "Created deck {id}")?;
            Ok(())
        }
        Commands::AddCard {
            deck_id,
            question,
            answer,
        } => {
            let index = mgr.add_card(deck_id, question, answer).await?;
            writeln!(out, "Added card #{index}")?;
            Ok(())
        }
        Commands::Delete { deck_id } => {
            if mgr.delete_deck(deck_id).await? {
                writeln!(out, "Deleted deck {deck_id}")?;
            } else {
                writeln!(out, "No deck {deck_id}")?;
            }
            Ok(())
        }
        Commands::Show { deck_id } => commands::show_deck(&mgr, deck_id, &mut out),
        Commands::Rate {
            deck_id,
            card,
            confidence,
        } => commands::rate(&mut mgr, deck_id, card, confidence, &mut out).await,
        Commands::Study { deck_id, shuffle } => {
            let mut input = io::stdin().lock();
            commands::study(
                &mut mgr,
                deck_id,
                shuffle || config.shuffle,
                &mut input,
                &mut out,
            )
            .await
        }
        Commands::Search { query } => commands::search(&mgr, &query, &mut out),
        Commands::Stats => commands::show_stats(&mgr, &mut out),
        Commands::Export { out: path } => commands::export(&mgr, path.as_deref(), &mut out),
        Commands::Import { file } => commands::import(&mut mgr, &file, &mut out).await,
        Commands::ImportCsv { name, file } => {
            commands::import_csv(&mut mgr, &name, &file, &mut out).await
        }
    }
}

const DEFAULT_LOG_FILTER: &str = "studymaster=info,services=info";

/// `RUST_LOG` when set and valid, otherwise the default directives.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[tokio::main]
async fn main() {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(log_filter(rust_log.as_deref()))
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
