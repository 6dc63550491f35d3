//! Bounded worker pool over the postcode list.

use futures::stream::{self, StreamExt};
use lordscraper_core::Postcode;

use super::worker::{process_postcode, PostcodeReport, SearchStatus};
use super::CrawlContext;

/// Totals aggregated from every postcode report in a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RunTotals {
    pub postcodes: usize,
    /// Postcodes whose job returned an error or never got an address list.
    pub failed_postcodes: usize,
    pub addresses_found: usize,
    pub stored: usize,
    pub skipped: usize,
    pub duplicates: usize,
    pub empty: usize,
    pub no_registration: usize,
    pub failed_addresses: usize,
}

impl RunTotals {
    fn record(&mut self, report: &PostcodeReport) {
        self.postcodes += 1;
        if matches!(
            report.search,
            SearchStatus::HttpError(_) | SearchStatus::Exhausted
        ) {
            self.failed_postcodes += 1;
        }
        self.addresses_found += report.addresses_found;
        self.stored += report.stored;
        self.skipped += report.skipped;
        self.duplicates += report.duplicates;
        self.empty += report.empty;
        self.no_registration += report.no_registration;
        self.failed_addresses += report.failed;
    }

    fn record_error(&mut self) {
        self.postcodes += 1;
        self.failed_postcodes += 1;
    }
}

/// Processes `postcodes` with at most `max_workers` in flight at once.
///
/// Completes when every postcode job has finished. No job's failure stops
/// the others.
pub(crate) async fn run_pool(
    ctx: &CrawlContext,
    postcodes: &[Postcode],
    max_workers: usize,
) -> RunTotals {
    let mut results = stream::iter(postcodes)
        .map(|postcode| async move { (postcode, process_postcode(ctx, postcode).await) })
        .buffer_unordered(max_workers.max(1));

    let mut totals = RunTotals::default();
    while let Some((postcode, result)) = results.next().await {
        match result {
            Ok(report) => {
                tracing::info!(
                    postcode = %report.postcode,
                    search = ?report.search,
                    addresses = report.addresses_found,
                    stored = report.stored,
                    skipped = report.skipped,
                    duplicates = report.duplicates,
                    empty = report.empty,
                    no_registration = report.no_registration,
                    failed = report.failed,
                    "postcode finished"
                );
                totals.record(&report);
            }
            Err(e) => {
                tracing::error!(%postcode, error = %format!("{e:#}"), "postcode failed");
                totals.record_error();
            }
        }
    }

    totals
}
