//! One postcode, start to finish: search, list addresses, look up each one.

use anyhow::Context;
use lordscraper_core::{AddressCandidate, Postcode};
use lordscraper_db::InsertOutcome;
use lordscraper_scraper::{
    fetch_with_retry, parse_addresses, parse_registration_fields, Fetched, Outcome,
    RegisterClient, Stage,
};

use super::CrawlContext;

/// How the postcode search itself ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SearchStatus {
    /// An address list page came back and was walked.
    Searched,
    NotFound,
    HttpError(u16),
    /// Every attempt timed out.
    Exhausted,
}

/// What happened to one address candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AddressOutcome {
    /// Already stored for this postcode; not fetched again.
    Skipped,
    Stored,
    /// The store already held this address, possibly under another postcode.
    Duplicate,
    /// Detail page parsed to nothing.
    Empty,
    NoRegistration,
    /// HTTP error or timeout exhaustion.
    Failed,
}

/// Per-postcode result handed back to the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PostcodeReport {
    pub postcode: Postcode,
    pub search: SearchStatus,
    pub addresses_found: usize,
    pub skipped: usize,
    pub stored: usize,
    pub duplicates: usize,
    pub empty: usize,
    pub no_registration: usize,
    pub failed: usize,
}

impl PostcodeReport {
    fn new(postcode: &Postcode, search: SearchStatus) -> Self {
        Self {
            postcode: postcode.clone(),
            search,
            addresses_found: 0,
            skipped: 0,
            stored: 0,
            duplicates: 0,
            empty: 0,
            no_registration: 0,
            failed: 0,
        }
    }

    fn record(&mut self, outcome: AddressOutcome) {
        let counter = match outcome {
            AddressOutcome::Skipped => &mut self.skipped,
            AddressOutcome::Stored => &mut self.stored,
            AddressOutcome::Duplicate => &mut self.duplicates,
            AddressOutcome::Empty => &mut self.empty,
            AddressOutcome::NoRegistration => &mut self.no_registration,
            AddressOutcome::Failed => &mut self.failed,
        };
        *counter += 1;
    }
}

/// Runs the full pipeline for `postcode` in its own register session.
///
/// Site outcomes, HTTP errors and timeouts end up in the report. A
/// non-timeout transport failure or a store failure ends the postcode and is
/// returned as an error.
pub(crate) async fn process_postcode(
    ctx: &CrawlContext,
    postcode: &Postcode,
) -> anyhow::Result<PostcodeReport> {
    let client = RegisterClient::new(&ctx.base_url, ctx.request_timeout)?;

    tracing::info!(%postcode, "searching postcode");
    let fetched = fetch_with_retry(ctx.retry, || client.search_postcode(postcode))
        .await
        .with_context(|| format!("postcode search failed for {postcode}"))?;

    let response = match fetched {
        Fetched::Response(response) => response,
        Fetched::Exhausted => {
            tracing::warn!(%postcode, "postcode search timed out on every attempt; skipping");
            return Ok(PostcodeReport::new(postcode, SearchStatus::Exhausted));
        }
    };

    let body = match ctx.classifier.classify(Stage::PostcodeSearch, response).await {
        Outcome::Success(body) => body,
        Outcome::HttpError(status) => {
            return Ok(PostcodeReport::new(postcode, SearchStatus::HttpError(status)));
        }
        Outcome::NotFound | Outcome::NoRegistration | Outcome::NotInRegister => {
            tracing::info!(%postcode, "postcode not found");
            return Ok(PostcodeReport::new(postcode, SearchStatus::NotFound));
        }
    };

    let candidates = parse_addresses(&body);
    tracing::info!(%postcode, count = candidates.len(), "addresses found");

    let mut report = PostcodeReport::new(postcode, SearchStatus::Searched);
    report.addresses_found = candidates.len();

    for candidate in &candidates {
        let outcome = process_address(ctx, &client, postcode, candidate).await?;
        report.record(outcome);
    }

    Ok(report)
}

async fn process_address(
    ctx: &CrawlContext,
    client: &RegisterClient,
    postcode: &Postcode,
    candidate: &AddressCandidate,
) -> anyhow::Result<AddressOutcome> {
    let address = candidate.display_address.as_str();

    if ctx
        .store
        .exists(postcode.as_str(), address)
        .await
        .with_context(|| format!("record store lookup failed for {address}"))?
    {
        tracing::debug!(%postcode, address, "already stored; skipping lookup");
        return Ok(AddressOutcome::Skipped);
    }

    tracing::info!(%postcode, address, "investigating address");
    let fetched = fetch_with_retry(ctx.retry, || {
        client.lookup_address(&candidate.full_address_token)
    })
    .await
    .with_context(|| format!("address lookup failed for {address}"))?;

    let response = match fetched {
        Fetched::Response(response) => response,
        Fetched::Exhausted => {
            tracing::warn!(%postcode, address, "address lookup timed out on every attempt");
            return Ok(AddressOutcome::Failed);
        }
    };

    let body = match ctx.classifier.classify(Stage::AddressLookup, response).await {
        Outcome::Success(body) => body,
        Outcome::HttpError(_) => return Ok(AddressOutcome::Failed),
        Outcome::NoRegistration | Outcome::NotInRegister | Outcome::NotFound => {
            tracing::info!(%postcode, address, "no registration details available");
            return Ok(AddressOutcome::NoRegistration);
        }
    };

    let fields = parse_registration_fields(&body);
    if fields.is_empty() {
        tracing::warn!(%postcode, address, "detail page had no registration fields; discarding");
        return Ok(AddressOutcome::Empty);
    }

    let details = fields.with_address(address);
    let inserted = ctx
        .store
        .insert(postcode.as_str(), &details)
        .await
        .with_context(|| format!("record store insert failed for {address}"))?;
    match inserted {
        InsertOutcome::Inserted => {
            tracing::info!(%postcode, address, "registration stored");
            Ok(AddressOutcome::Stored)
        }
        InsertOutcome::AlreadyPresent => Ok(AddressOutcome::Duplicate),
    }
}
