mod crawl;
mod store;

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::crawl::CrawlContext;
use crate::store::OpenStore;

#[derive(Debug, Parser)]
#[command(name = "lordscraper")]
#[command(about = "Landlord register crawler")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl every postcode in the input list and store registrations
    Crawl {
        /// Postcode list to read (overrides LORDSCRAPER_POSTCODES_PATH)
        #[arg(long)]
        postcodes: Option<PathBuf>,

        /// Number of postcodes processed concurrently (overrides LORDSCRAPER_MAX_WORKERS)
        #[arg(long)]
        workers: Option<NonZeroUsize>,

        /// List the parsed postcodes without touching the network or the store
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the record store's resume summary
    Summary,
    /// Postgres maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check the database connection
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = lordscraper_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_thread_names(true)
        .init();

    match cli.command {
        Some(Commands::Crawl {
            postcodes,
            workers,
            dry_run,
        }) => {
            let path = postcodes.unwrap_or_else(|| config.postcodes_path.clone());
            let workers = match workers {
                Some(n) => n,
                None => NonZeroUsize::new(config.max_workers)
                    .ok_or_else(|| anyhow::anyhow!("LORDSCRAPER_MAX_WORKERS must be at least 1"))?,
            };
            let postcodes = crawl::load_postcodes(&path)?;

            if dry_run {
                crawl::print_dry_run(&postcodes, workers);
                return Ok(());
            }

            let store = OpenStore::open(&config).await?;
            store.log_summary().await?;

            let ctx = CrawlContext::from_config(&config, Arc::clone(&store.store));
            crawl::run_crawl(&ctx, &postcodes, workers).await;

            store.log_summary().await?;
            store.close().await;
        }
        Some(Commands::Summary) => {
            let store = OpenStore::open(&config).await?;
            let summary = store.store.summary().await?;
            println!("distinct postcodes: {}", summary.distinct_postcodes);
            println!("total records:      {}", summary.total_records);
            println!(
                "last postcode:      {}",
                summary.last_postcode.as_deref().unwrap_or("-")
            );
            store.close().await;
        }
        Some(Commands::Db { command }) => {
            let pool = lordscraper_db::connect_pool_from_config(&config).await?;
            match command {
                DbCommands::Migrate => {
                    let applied = lordscraper_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
                DbCommands::Ping => {
                    lordscraper_db::ping(&pool).await?;
                    println!("database reachable");
                }
            }
            pool.close().await;
        }
        None => println!("lordscraper: no command given, try --help"),
    }

    Ok(())
}
