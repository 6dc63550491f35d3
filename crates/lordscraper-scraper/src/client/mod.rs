//! HTTP session for the landlord register's search forms.

mod form;
mod headers;

use std::time::Duration;

use lordscraper_core::Postcode;
use reqwest::{Client, Url};

use crate::error::ScraperError;

pub use form::quote_plus;
pub use headers::generate_browser_headers;

pub(crate) const POSTCODE_SEARCH_PATH: &str = "search/postcode";
pub(crate) const ADDRESS_LOOKUP_PATH: &str = "search/registration/property";

/// Status and body of one register response, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// One browsing session against the register.
///
/// Holds its own cookie jar and a generated browser header set. A session is
/// opened per postcode and dropped once that postcode is finished; sessions
/// are never shared between postcodes.
pub struct RegisterClient {
    client: Client,
    base_url: Url,
}

impl RegisterClient {
    /// Opens a session against `base_url` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidBaseUrl`] if `base_url` does not parse,
    /// or [`ScraperError::Http`] if the underlying `reqwest::Client` cannot be
    /// constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ScraperError> {
        // Exactly one trailing slash so joins append rather than replace the
        // last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ScraperError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .cookie_store(true)
            .default_headers(generate_browser_headers())
            .build()?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// `POST /search/postcode` with body `postcode=<value>`.
    ///
    /// # Errors
    ///
    /// Returns the transport error unchanged so the retry layer can tell
    /// timeouts from other failures.
    pub async fn search_postcode(&self, postcode: &Postcode) -> Result<RawResponse, reqwest::Error> {
        let body = format!("postcode={}", postcode.form_value());
        self.post_form(POSTCODE_SEARCH_PATH, body).await
    }

    /// `POST /search/registration/property` with body
    /// `selectedAddress=<url-encoded token>`.
    ///
    /// # Errors
    ///
    /// Returns the transport error unchanged, as [`Self::search_postcode`].
    pub async fn lookup_address(
        &self,
        full_address_token: &str,
    ) -> Result<RawResponse, reqwest::Error> {
        let body = format!("selectedAddress={}", quote_plus(full_address_token));
        self.post_form(ADDRESS_LOOKUP_PATH, body).await
    }

    fn endpoint(&self, path: &str) -> Url {
        // Both paths are fixed relative references; joining onto an
        // http(s) base cannot fail.
        self.base_url
            .join(path)
            .unwrap_or_else(|_| self.base_url.clone())
    }

    async fn post_form(&self, path: &str, body: String) -> Result<RawResponse, reqwest::Error> {
        let url = self.endpoint(path);
        tracing::debug!(%url, "posting register form");
        let response = self.client.post(url).body(body).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
