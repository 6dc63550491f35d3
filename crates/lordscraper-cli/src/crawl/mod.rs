//! The `crawl` command: postcode list in, stored registrations out.
//!
//! Called from `main` once configuration and the record store are ready.
//! Per-postcode failures are logged and counted rather than propagated, so a
//! single bad postcode does not abort the run.

mod pool;
mod worker;

use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use lordscraper_core::{AppConfig, Postcode};
use lordscraper_db::RecordStore;
use lordscraper_scraper::{Classifier, ErrorSink, RetryPolicy};

use pool::{run_pool, RunTotals};

/// Everything a worker needs, passed explicitly into each job.
#[derive(Clone)]
pub(crate) struct CrawlContext {
    pub base_url: String,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub classifier: Classifier,
    pub store: Arc<dyn RecordStore>,
}

impl CrawlContext {
    pub(crate) fn from_config(config: &AppConfig, store: Arc<dyn RecordStore>) -> Self {
        Self {
            base_url: config.base_url.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            retry: RetryPolicy {
                max_attempts: config.max_attempts,
                delay: Duration::from_millis(config.retry_delay_ms),
            },
            classifier: Classifier::new(ErrorSink::new(&config.error_log_path)),
            store,
        }
    }
}

/// Reads the postcode list, logging how many entries will be investigated.
pub(crate) fn load_postcodes(path: &Path) -> anyhow::Result<Vec<Postcode>> {
    let postcodes = lordscraper_core::read_postcode_file(path)?;
    tracing::info!(
        path = %path.display(),
        count = postcodes.len(),
        "found postcodes to investigate"
    );
    Ok(postcodes)
}

/// Prints the parsed postcode list without touching the network or the store.
pub(crate) fn print_dry_run(postcodes: &[Postcode], workers: NonZeroUsize) {
    println!(
        "[dry-run] would crawl {} postcode(s) with {workers} worker(s)",
        postcodes.len()
    );
    for postcode in postcodes {
        println!("  {postcode}");
    }
}

/// Runs the pool over `postcodes` and logs the run totals.
pub(crate) async fn run_crawl(
    ctx: &CrawlContext,
    postcodes: &[Postcode],
    workers: NonZeroUsize,
) -> RunTotals {
    tracing::info!(
        postcodes = postcodes.len(),
        workers = workers.get(),
        base_url = %ctx.base_url,
        "starting crawl"
    );

    let totals = run_pool(ctx, postcodes, workers.get()).await;

    tracing::info!(
        postcodes = totals.postcodes,
        failed_postcodes = totals.failed_postcodes,
        addresses_found = totals.addresses_found,
        stored = totals.stored,
        skipped = totals.skipped,
        duplicates = totals.duplicates,
        empty = totals.empty,
        no_registration = totals.no_registration,
        failed_addresses = totals.failed_addresses,
        "crawl complete"
    );

    totals
}
