//! Browser identity for register sessions.

use rand::seq::IndexedRandom;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONTENT_TYPE,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};

const CHROME_WINDOWS_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
];

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Generates a Chrome-on-Windows header set with the form content type.
///
/// The user agent is picked at random, so two sessions opened back to back
/// usually present different identities.
#[must_use]
pub fn generate_browser_headers() -> HeaderMap {
    let user_agent = CHROME_WINDOWS_USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(CHROME_WINDOWS_USER_AGENTS[0]);

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(user_agent));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-GB,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_carry_form_content_type() {
        let headers = generate_browser_headers();
        assert_eq!(headers[CONTENT_TYPE], FORM_CONTENT_TYPE);
    }

    #[test]
    fn user_agent_is_a_known_chrome_windows_identity() {
        let headers = generate_browser_headers();
        let ua = headers[USER_AGENT].to_str().unwrap();
        assert!(CHROME_WINDOWS_USER_AGENTS.contains(&ua));
        assert!(ua.contains("Windows NT"));
        assert!(ua.contains("Chrome/"));
    }
}
