//! Postcode keys and the input list they are read from.

use std::path::Path;

use crate::ConfigError;

/// A trimmed, whitespace-collapsed postcode such as `"EH1 1AA"`.
///
/// The register's search form expects spaces replaced by `+`; use
/// [`Postcode::form_value`] when building the request body.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Postcode(String);

impl Postcode {
    /// Normalizes `raw` into a postcode. Returns `None` when nothing but
    /// whitespace remains.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            None
        } else {
            Some(Self(collapsed))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The value sent as `postcode=<value>` to the search endpoint.
    #[must_use]
    pub fn form_value(&self) -> String {
        self.0.replace(' ', "+")
    }
}

impl std::fmt::Display for Postcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Postcode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Strips the quote, comma and newline characters spreadsheet exports leave
/// around each entry.
#[must_use]
pub fn parse_input_entry(entry: &str) -> String {
    entry
        .chars()
        .filter(|c| !matches!(c, '"' | ',' | '\n' | '\r'))
        .collect()
}

/// Parses a postcode list with one entry per line. Entries that reduce to
/// nothing after cleaning are skipped.
#[must_use]
pub fn parse_postcode_list(content: &str) -> Vec<Postcode> {
    content
        .lines()
        .filter_map(|line| Postcode::parse(&parse_input_entry(line)))
        .collect()
}

/// Reads and parses the postcode list at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::PostcodeFileIo`] if the file cannot be read.
pub fn read_postcode_file(path: &Path) -> Result<Vec<Postcode>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PostcodeFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(parse_postcode_list(&content))
}
