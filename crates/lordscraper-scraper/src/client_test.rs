use super::*;

fn test_client(base_url: &str) -> RegisterClient {
    RegisterClient::new(base_url, Duration::from_secs(5)).expect("client construction should not fail")
}

#[test]
fn endpoint_joins_bare_domain() {
    let client = test_client("https://www.landlordregistrationscotland.gov.uk");
    assert_eq!(
        client.endpoint(POSTCODE_SEARCH_PATH).as_str(),
        "https://www.landlordregistrationscotland.gov.uk/search/postcode"
    );
}

#[test]
fn endpoint_strips_trailing_slash() {
    let client = test_client("https://www.landlordregistrationscotland.gov.uk/");
    assert_eq!(
        client.endpoint(ADDRESS_LOOKUP_PATH).as_str(),
        "https://www.landlordregistrationscotland.gov.uk/search/registration/property"
    );
}

#[test]
fn endpoint_keeps_base_path_prefix() {
    let client = test_client("http://127.0.0.1:8080/register");
    assert_eq!(
        client.endpoint(POSTCODE_SEARCH_PATH).as_str(),
        "http://127.0.0.1:8080/register/search/postcode"
    );
}

#[test]
fn new_rejects_invalid_base_url() {
    let result = RegisterClient::new("not a url", Duration::from_secs(5));
    assert!(
        matches!(result, Err(ScraperError::InvalidBaseUrl { .. })),
        "expected InvalidBaseUrl"
    );
}
