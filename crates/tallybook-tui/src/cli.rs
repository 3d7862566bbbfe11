//! Command line interface.
//!
//! Without a subcommand the terminal UI starts. The subcommands run one
//! ledger or asset-cache operation and exit, which is handy for scripts.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use tallybook_core::assets::{manifest, AssetWorker, HttpFetcher, CACHE_NAME};
use tallybook_core::export;
use tallybook_core::utils::{format_amount, pad_to_width, truncate_string};
use tallybook_core::view;
use tallybook_core::{Config, EntryId, EntryInput, FileStorage, LedgerStore};

/// Subdirectory of the cache dir holding asset buckets
const ASSET_CACHE_SUBDIR: &str = "assets";

#[derive(Debug, Parser)]
#[command(name = "tallybook", version, about = "A personal ledger that works offline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add an entry dated today
    Add {
        description: String,
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// List all entries with the running total
    List,
    /// Delete an entry by id
    Delete {
        id: u64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Export the ledger to a CSV file
    Export {
        /// Directory to write into (defaults to the configured export dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Manage the offline asset cache
    Assets {
        #[command(subcommand)]
        command: AssetsCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum AssetsCommand {
    /// Pre-fetch the asset manifest into the cache
    Install,
    /// Fetch one asset, from the cache when possible, and write it to stdout
    Fetch { path: String },
    /// Show what the cache holds
    Status,
}

pub async fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Add {
            description,
            amount,
        } => add(config, &description, &amount),
        Command::List => list(config),
        Command::Delete { id, yes } => delete(config, EntryId(id), yes),
        Command::Export { out } => export_csv(config, out),
        Command::Assets { command } => assets(config, command).await,
    }
}

fn open_store(config: &Config) -> Result<LedgerStore<FileStorage>> {
    let data_dir = config.data_dir()?;
    let storage = FileStorage::new(data_dir.clone())
        .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;
    Ok(LedgerStore::new(storage))
}

fn add(config: &Config, description: &str, amount: &str) -> Result<()> {
    let input = EntryInput::parse(description, amount)?;
    let mut store = open_store(config)?;
    let entry = store.add(input)?;
    println!(
        "Added #{} {} {} ${}",
        entry.id,
        entry.date_display(),
        entry.description,
        format_amount(entry.amount)
    );
    Ok(())
}

fn list(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let view = view::render(&store)?;

    if let Some(placeholder) = view.placeholder() {
        println!("{}", placeholder);
    } else {
        println!("{:>5}  {:<10}  {:<32}  {:>14}", "ID", "DATE", "DESCRIPTION", "AMOUNT");
        for row in &view.rows {
            println!(
                "{:>5}  {:<10}  {}  {:>14}",
                row.id.to_string(),
                row.date,
                pad_to_width(&truncate_string(&row.description, 32), 32),
                format!("${}", row.amount)
            );
        }
    }
    println!("Total: ${}", view.total_display);
    Ok(())
}

/// Ask a yes/no question on the terminal, defaulting to no
fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim(), "y" | "Y" | "yes" | "Yes"))
}

fn delete(config: &Config, id: EntryId, yes: bool) -> Result<()> {
    let mut store = open_store(config)?;
    let entry = store
        .list_all()?
        .into_iter()
        .find(|e| e.id == id)
        .ok_or_else(|| anyhow::anyhow!("No entry with id {}", id))?;

    let prompt = format!(
        "Delete {} \"{}\" ${}?",
        entry.date_display(),
        entry.description,
        format_amount(entry.amount)
    );
    if !yes && !confirm(&prompt)? {
        println!("Cancelled");
        return Ok(());
    }

    store.delete(id)?;
    println!("Deleted #{}", id);
    Ok(())
}

fn export_csv(config: &Config, out: Option<PathBuf>) -> Result<()> {
    let store = open_store(config)?;
    let entries = store.list_all()?;
    let dir = out.unwrap_or_else(|| config.export_dir());

    let path = export::write_csv(&dir, &entries, store.today())?;
    println!("Exported {} entries to {}", entries.len(), path.display());
    Ok(())
}

async fn assets(config: &Config, command: AssetsCommand) -> Result<()> {
    let origin = manifest::parse_origin(config.asset_origin())?;
    let cache_root = config.cache_dir()?.join(ASSET_CACHE_SUBDIR);
    let mut worker = AssetWorker::new(HttpFetcher::new()?, origin, cache_root);

    match command {
        AssetsCommand::Install => {
            let mut states = worker.subscribe();
            let progress = tokio::spawn(async move {
                while states.changed().await.is_ok() {
                    let state = *states.borrow_and_update();
                    eprintln!("Asset cache: {:?}", state);
                }
            });

            let result = worker.install().await;
            // Closes the channel so the progress task ends
            drop(worker);
            let _ = progress.await;

            let count = result?;
            info!(count, "Assets installed from CLI");
            println!("Cached {} assets in {}", count, CACHE_NAME);
        }
        AssetsCommand::Fetch { path } => {
            let response = worker.fetch_path(&path).await?;
            eprintln!(
                "{} {} ({} bytes, from {:?})",
                response.status,
                response.url,
                response.body.len(),
                response.source
            );
            let mut stdout = io::stdout();
            stdout.write_all(&response.body)?;
            stdout.flush()?;
        }
        AssetsCommand::Status => {
            println!("Origin: {}", worker.origin());
            println!("State:  {:?}", worker.state());
            match worker.bucket() {
                Some(bucket) => {
                    println!(
                        "Bucket: {} ({} assets, cached {} at {})",
                        bucket.name(),
                        bucket.len(),
                        bucket.age_display(),
                        bucket.cached_at().format("%Y-%m-%d %H:%M UTC")
                    );
                    for url in bucket.urls() {
                        println!("  {}", url);
                    }
                }
                None => println!("Bucket: {} (not installed)", CACHE_NAME),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_negative_amount() {
        let cli = Cli::try_parse_from(["tallybook", "add", "Tea", "-1"]).unwrap();
        match cli.command {
            Some(Command::Add { description, amount }) => {
                assert_eq!(description, "Tea");
                assert_eq!(amount, "-1");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["tallybook"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_add_list_delete_against_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: Some(dir.path().join("data")),
            export_dir: Some(dir.path().join("exports")),
            ..Default::default()
        };

        add(&config, "Coffee", "3.5").unwrap();
        add(&config, "Coffee, Large", "4").unwrap();
        assert!(add(&config, "Tea", "abc").is_err());
        list(&config).unwrap();

        delete(&config, EntryId(1), true).unwrap();
        assert!(delete(&config, EntryId(1), true).is_err());

        export_csv(&config, None).unwrap();
        let exported: Vec<_> = std::fs::read_dir(dir.path().join("exports")).unwrap().collect();
        assert_eq!(exported.len(), 1);

        let store = open_store(&config).unwrap();
        let entries = store.list_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, "Coffee, Large");
    }
}
