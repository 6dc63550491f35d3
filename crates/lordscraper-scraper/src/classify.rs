//! Outcome classification for register responses.
//!
//! The register answers misses with ordinary 200 pages, so outcomes are read
//! from marker phrases in the body. Matching is substring containment to stay
//! tolerant of markup changes around the phrases.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::client::RawResponse;
use crate::error::ScraperError;

pub const POSTCODE_NOT_FOUND_MARKER: &str = "Postcode not found";
pub const NO_REGISTRATION_MARKER: &str = "No registration details available";
pub const NOT_IN_REGISTER_MARKER: &str = "This property is not in the register";

/// Which request produced the response being classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PostcodeSearch,
    AddressLookup,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::PostcodeSearch => write!(f, "postcode search"),
            Stage::AddressLookup => write!(f, "address lookup"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The register does not know the postcode.
    NotFound,
    /// The property exists but has no registration details.
    NoRegistration,
    /// The property is not in the register at all.
    NotInRegister,
    /// A page worth parsing.
    Success(String),
    /// Any status other than 200.
    HttpError(u16),
}

/// Classifies a response without side effects.
///
/// Status is checked first, then the stage's marker phrases; anything left
/// is [`Outcome::Success`].
#[must_use]
pub fn classify(stage: Stage, response: RawResponse) -> Outcome {
    if response.status != 200 {
        return Outcome::HttpError(response.status);
    }

    let body = response.body;
    match stage {
        Stage::PostcodeSearch => {
            if body.contains(POSTCODE_NOT_FOUND_MARKER) {
                return Outcome::NotFound;
            }
        }
        Stage::AddressLookup => {
            if body.contains(NO_REGISTRATION_MARKER) {
                return Outcome::NoRegistration;
            }
            if body.contains(NOT_IN_REGISTER_MARKER) {
                return Outcome::NotInRegister;
            }
        }
    }
    Outcome::Success(body)
}

/// File that receives the full body of the latest non-200 response.
///
/// Each capture overwrites the previous one. Clones share one write lock, so
/// concurrent captures never interleave.
#[derive(Debug, Clone)]
pub struct ErrorSink {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl ErrorSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `body` to the sink, replacing its previous contents.
    ///
    /// The body goes to a sibling temp file first and is renamed into place.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::ErrorSink`] if the file cannot be written.
    pub async fn capture(&self, body: &str) -> Result<(), ScraperError> {
        let _guard = self.lock.lock().await;
        let tmp = self.tmp_path();
        let written = match tokio::fs::write(&tmp, body).await {
            Ok(()) => tokio::fs::rename(&tmp, &self.path).await,
            Err(e) => Err(e),
        };
        written.map_err(|e| ScraperError::ErrorSink {
            path: self.path.display().to_string(),
            source: e,
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// [`classify`] plus the error-sink side effect for HTTP errors.
#[derive(Debug, Clone)]
pub struct Classifier {
    sink: ErrorSink,
}

impl Classifier {
    #[must_use]
    pub fn new(sink: ErrorSink) -> Self {
        Self { sink }
    }

    #[must_use]
    pub fn sink(&self) -> &ErrorSink {
        &self.sink
    }

    pub async fn classify(&self, stage: Stage, response: RawResponse) -> Outcome {
        if response.status != 200 {
            tracing::error!(
                %stage,
                status = response.status,
                "register returned an error status"
            );
            match self.sink.capture(&response.body).await {
                Ok(()) => tracing::error!(
                    path = %self.sink.path().display(),
                    "error response written to error sink"
                ),
                Err(e) => tracing::error!(error = %e, "could not capture error response"),
            }
        }
        classify(stage, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(body: &str) -> RawResponse {
        RawResponse {
            status: 200,
            body: body.to_owned(),
        }
    }

    #[test]
    fn non_200_is_http_error_even_with_markers() {
        let response = RawResponse {
            status: 500,
            body: format!("<p>{POSTCODE_NOT_FOUND_MARKER}</p>"),
        };
        assert_eq!(
            classify(Stage::PostcodeSearch, response),
            Outcome::HttpError(500)
        );
    }

    #[test]
    fn postcode_not_found_marker() {
        let outcome = classify(
            Stage::PostcodeSearch,
            ok("<div class=\"error\">Postcode not found</div>"),
        );
        assert_eq!(outcome, Outcome::NotFound);
    }

    #[test]
    fn postcode_search_success_keeps_body() {
        let body = "<select id=\"suggested-addresses\"></select>";
        assert_eq!(
            classify(Stage::PostcodeSearch, ok(body)),
            Outcome::Success(body.to_owned())
        );
    }

    #[test]
    fn no_registration_marker() {
        let outcome = classify(
            Stage::AddressLookup,
            ok("<h2>No registration details available</h2>"),
        );
        assert_eq!(outcome, Outcome::NoRegistration);
    }

    #[test]
    fn not_in_register_marker() {
        let outcome = classify(
            Stage::AddressLookup,
            ok("<p>This property is not in the register</p><dd data-testid=\"property-lead-owner\">X</dd>"),
        );
        assert_eq!(outcome, Outcome::NotInRegister);
    }

    #[test]
    fn detail_markers_do_not_apply_to_postcode_search() {
        let body = "No registration details available";
        assert_eq!(
            classify(Stage::PostcodeSearch, ok(body)),
            Outcome::Success(body.to_owned())
        );
    }

    #[test]
    fn postcode_marker_does_not_apply_to_address_lookup() {
        let body = "Postcode not found";
        assert_eq!(
            classify(Stage::AddressLookup, ok(body)),
            Outcome::Success(body.to_owned())
        );
    }

    #[tokio::test]
    async fn classifier_captures_error_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error.log");
        let classifier = Classifier::new(ErrorSink::new(&path));

        let response = RawResponse {
            status: 503,
            body: "<h1>Service Unavailable</h1>".to_owned(),
        };
        let outcome = classifier.classify(Stage::AddressLookup, response).await;

        assert_eq!(outcome, Outcome::HttpError(503));
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "<h1>Service Unavailable</h1>");
    }

    #[tokio::test]
    async fn classifier_overwrites_previous_capture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error.log");
        let classifier = Classifier::new(ErrorSink::new(&path));

        for body in ["first failure body", "second"] {
            let response = RawResponse {
                status: 502,
                body: body.to_owned(),
            };
            classifier.classify(Stage::PostcodeSearch, response).await;
        }

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }

    #[tokio::test]
    async fn classifier_leaves_sink_untouched_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error.log");
        let classifier = Classifier::new(ErrorSink::new(&path));

        classifier
            .classify(Stage::PostcodeSearch, ok("<html></html>"))
            .await;

        assert!(!path.exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_captures_leave_one_complete_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error.log");
        let sink = ErrorSink::new(&path);

        let bodies: Vec<String> = (b'a'..=b'h')
            .map(|c| char::from(c).to_string().repeat(256 * 1024))
            .collect();
        let handles: Vec<_> = bodies
            .iter()
            .cloned()
            .map(|body| {
                let sink = sink.clone();
                tokio::spawn(async move { sink.capture(&body).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(
            bodies.contains(&written),
            "error sink holds a mixed body of {} bytes",
            written.len()
        );
        assert!(!dir.path().join("error.log.tmp").exists());
    }
}
