//! HTML extraction for the register's address list and detail pages.

use lordscraper_core::{AddressCandidate, RegistrationFields};
use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;

const ADDRESS_OPTIONS_SELECTOR: &str = "select#suggested-addresses option";
const DETAIL_SELECTOR: &str = "dd";

const LEAD_OWNER_TESTID: &str = "property-lead-owner";
const JOINT_OWNER_TESTID: &str = "property-joint-owner";
const REG_AUTHORITY_TESTID: &str = "property-reg-authority";
const CONTACT_DETAILS_TESTID: &str = "property-contact-details";
const AGENT_LOCAL_AUTHORITY_PHRASE: &str = "Please contact the relevant Local Authority";

fn selector(css: &str) -> Result<Selector, ScraperError> {
    Selector::parse(css).map_err(|e| ScraperError::Selector {
        selector: css.to_owned(),
        reason: e.to_string(),
    })
}

fn text_or_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Extracts address candidates from a postcode search page.
///
/// Never fails: a missing dropdown yields an empty list, and an internal
/// parse failure is logged with its cause and also yields an empty list.
#[must_use]
pub fn parse_addresses(html: &str) -> Vec<AddressCandidate> {
    match try_parse_addresses(html) {
        Ok(addresses) => addresses,
        Err(e) => {
            tracing::error!(error = %e, "failed to parse address list; treating as empty");
            Vec::new()
        }
    }
}

/// Fallible core of [`parse_addresses`].
///
/// The first option is the "N addresses found" placeholder and is skipped.
/// Options with blank text or no `value` are dropped.
///
/// # Errors
///
/// Returns [`ScraperError::Selector`] if the option selector fails to compile.
pub fn try_parse_addresses(html: &str) -> Result<Vec<AddressCandidate>, ScraperError> {
    let document = Html::parse_document(html);
    let options = selector(ADDRESS_OPTIONS_SELECTOR)?;

    let addresses = document
        .select(&options)
        .skip(1)
        .filter_map(|option| {
            let display_address = text_or_none(&element_text(option))?;
            let full_address_token = option
                .value()
                .attr("value")
                .filter(|v| !v.is_empty())?
                .to_owned();
            Some(AddressCandidate {
                display_address,
                full_address_token,
            })
        })
        .collect();

    Ok(addresses)
}

/// Extracts the five registration fields from a property detail page.
///
/// Each field is located independently; one missing field never affects the
/// others. An all-absent result is valid.
#[must_use]
pub fn parse_registration_fields(html: &str) -> RegistrationFields {
    let document = Html::parse_document(html);
    let details = match selector(DETAIL_SELECTOR) {
        Ok(sel) => document.select(&sel).collect::<Vec<_>>(),
        Err(e) => {
            tracing::error!(error = %e, "failed to compile detail selector");
            return RegistrationFields::default();
        }
    };

    let by_testid = |testid: &str| {
        details
            .iter()
            .find(|dd| dd.value().attr("data-testid") == Some(testid))
            .and_then(|dd| text_or_none(&element_text(*dd)))
    };

    let agent_details = details
        .iter()
        .map(|dd| element_text(*dd))
        .find(|text| text.contains(AGENT_LOCAL_AUTHORITY_PHRASE))
        .and_then(|text| text_or_none(&text));

    RegistrationFields {
        application_by: by_testid(LEAD_OWNER_TESTID),
        joint_owners: by_testid(JOINT_OWNER_TESTID),
        agent_details,
        local_authority: by_testid(REG_AUTHORITY_TESTID),
        contact_address: by_testid(CONTACT_DETAILS_TESTID),
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
