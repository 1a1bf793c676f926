//! eosworker - offline asset cache for the EOS solver web app
//!
//! `install` precaches the compiled-in asset manifest into the versioned
//! cache store, `resolve` answers a single request cache-first, `status`
//! lists the stores on disk and `clean` deletes superseded version tags.

use clap::Parser;
use std::sync::Arc;

use eosworker::cli::{Cli, Command};
use eosworker::fetcher::HttpFetcher;
use eosworker::manifest::CACHE_NAME;
use eosworker::store::RequestKey;
use eosworker::worker::Worker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Install { keep_stale } => {
            let config = cli.worker_config(*keep_stale)?;
            let worker = Worker::new(config, cli.registry()?, Arc::new(HttpFetcher::new()));

            let report = worker.install().await?;
            println!(
                "Installed {} assets into '{}'",
                report.entries, report.cache_name
            );
            for name in &report.purged {
                println!("Removed superseded store '{}'", name);
            }
        }

        Command::Resolve { url, output } => {
            let target = cli.scope_url()?.join(url)?;
            let config = cli.worker_config(false)?;
            let worker = Worker::new(config, cli.registry()?, Arc::new(HttpFetcher::new()));

            // A restarted worker serves from the store its install committed.
            worker.resume()?;
            let resolution = worker.handle_fetch(&RequestKey::get(&target)).await?;

            match output {
                Some(path) => {
                    std::fs::write(path, &resolution.body)?;
                    println!(
                        "{} [{}] {} -> {} ({} bytes)",
                        target,
                        resolution.source,
                        resolution.status,
                        path.display(),
                        resolution.body.len()
                    );
                }
                None => {
                    println!(
                        "{} [{}] {} ({} bytes)",
                        target,
                        resolution.source,
                        resolution.status,
                        resolution.body.len()
                    );
                }
            }
        }

        Command::Status => {
            let registry = cli.registry()?;
            let names = registry.names()?;
            if names.is_empty() {
                println!("No cache stores under {}", registry.root().display());
            }
            for name in names {
                let store = registry.open(&name)?;
                let marker = if name == CACHE_NAME { " (current)" } else { "" };
                println!("{}: {} entries{}", name, store.len()?, marker);
            }
        }

        Command::Clean => {
            let registry = cli.registry()?;
            let purged = registry.purge_stale(CACHE_NAME)?;
            if purged.is_empty() {
                println!("No superseded stores to remove");
            }
            for name in purged {
                println!("Removed superseded store '{}'", name);
            }
        }
    }

    Ok(())
}
