//! CLI for the extension catalog.
//!
//! Fetches extension manifests from every configured repository, applies a
//! filter state expressed as a URL query string, and prints the matching
//! extensions. Custom repositories can be added and removed; both the
//! repository list and the response cache persist under `--data-dir`.

use clap::{Parser, Subcommand};
use extension_catalog::{AddStatus, CatalogSession, ExtensionRecord};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Extension Catalog - Browse and filter extensions from configured repositories.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the repository list and the response cache.
    #[arg(long, default_value = ".extension-catalog")]
    data_dir: PathBuf,

    /// GitHub Personal Access Token, used for branch detection when adding
    /// repositories.
    #[arg(long, env = "GITHUB_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the catalog and print extensions matching a filter query.
    List {
        /// Filter state as a URL query string, e.g. "s=manga&cr=safe&l=en".
        #[arg(long, default_value = "")]
        query: String,

        /// Print the normalized shareable query string instead of records.
        #[arg(long)]
        share: bool,
    },

    /// List the configured repositories.
    Repos,

    /// Add a repository by `owner/name` slug or GitHub URL.
    AddRepo {
        /// Repository slug or URL, optionally with a `/tree/<branch>` segment.
        input: String,
    },

    /// Remove a custom repository by id.
    RemoveRepo {
        /// Repository id, e.g. "someone-extensions".
        id: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            ExitCode::from(1)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        // Use compact formatting without module target paths for cleaner output
        .with(fmt::layer().compact().with_target(false))
        // Allow runtime log filtering via RUST_LOG env var (e.g., RUST_LOG=debug)
        // Falls back to "info" level if RUST_LOG is not set or invalid
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        // Register as the global default subscriber
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = CatalogSession::load(&args.data_dir);
    if let Some(token) = args.token {
        let octocrab = octocrab::Octocrab::builder()
            .personal_token(token)
            .build()?;
        session = session.with_octocrab(octocrab);
    }

    match args.command {
        Command::List { query, share } => {
            session.fetch_all(false).await;
            session.restore_from_query(&query);

            if share {
                session.sync_url();
                println!("{}", session.current_query());
                return Ok(());
            }

            let matches = session.filtered();
            for record in &matches {
                print_record(record);
            }
            println!(
                "\n{} of {} extensions match",
                matches.len(),
                session.records().len()
            );
        }
        Command::Repos => {
            let custom: Vec<String> = session
                .store()
                .custom()
                .iter()
                .map(|source| source.id.clone())
                .collect();
            for source in session.store().all() {
                let marker = if custom.contains(&source.id) {
                    ""
                } else {
                    " (default)"
                };
                println!(
                    "{}  {} @ {}{}",
                    source.id, source.display_name, source.branch, marker
                );
            }
        }
        Command::AddRepo { input } => match session.add_repository(&input).await? {
            AddStatus::Added(source) => {
                println!("Added {} (branch {})", source.display_name, source.branch);
            }
            AddStatus::AlreadyAdded(source) => {
                println!("Already configured: {}", source.id);
            }
        },
        Command::RemoveRepo { id } => {
            if session.remove_repository(&id).await {
                println!("Removed {id}");
            } else {
                return Err(format!("no custom repository with id '{id}'").into());
            }
        }
    }

    Ok(())
}

/// Prints one catalog record as a single line.
fn print_record(record: &ExtensionRecord) {
    let Some(metadata) = &record.metadata else {
        return;
    };

    let language = metadata
        .language
        .as_deref()
        .map(extension_catalog::lang::display_name)
        .unwrap_or_else(|| "Unknown".to_string());

    println!(
        "{:<32} {:<10} {:<8} {:<16} {}",
        format!("{}/{}", record.source_id, record.id),
        metadata.version,
        metadata.content_rating,
        language,
        metadata.name
    );
}
