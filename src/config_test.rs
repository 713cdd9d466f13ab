use super::*;

// =============================================================
// Base URL normalization
// =============================================================

#[test]
fn new_strips_trailing_slash() {
    let config = ClientConfig::new("https://api.shhava.com/").expect("config");
    assert_eq!(config.base_url(), "https://api.shhava.com");
}

#[test]
fn new_keeps_clean_url_untouched() {
    let config = ClientConfig::new("http://127.0.0.1:3000").expect("config");
    assert_eq!(config.base_url(), "http://127.0.0.1:3000");
}

#[test]
fn new_rejects_non_http_url() {
    assert!(ClientConfig::new("ftp://api.shhava.com").is_err());
    assert!(ClientConfig::new("api.shhava.com").is_err());
}
