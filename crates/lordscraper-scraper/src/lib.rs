pub mod classify;
pub mod client;
pub mod error;
pub mod parse;
pub mod retry;

pub use classify::{classify, Classifier, ErrorSink, Outcome, Stage};
pub use client::{generate_browser_headers, quote_plus, RawResponse, RegisterClient};
pub use error::ScraperError;
pub use parse::{parse_addresses, parse_registration_fields, try_parse_addresses};
pub use retry::{fetch_with_retry, Fetched, RetryPolicy};
