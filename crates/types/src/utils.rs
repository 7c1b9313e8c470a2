//! Utility functions and helpers

use url::Url;

/// Generate a correlation ID for request tracing
pub fn generate_correlation_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Validate Ethereum address format (`0x` followed by 40 hex characters)
pub fn is_valid_address(address: &str) -> bool {
    if !address.starts_with("0x") {
        return false;
    }

    if address.len() != 42 {
        return false;
    }

    address[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Validate a `0x`-prefixed hex string. `0x` alone is valid (empty data).
pub fn is_hex_string(value: &str) -> bool {
    match value.strip_prefix("0x") {
        Some(rest) => rest.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Rendered in place of endpoints that do not parse as URLs
pub const INVALID_URL: &str = "<invalid url>";

/// Endpoint URL safe for logs: credentials, query and fragment dropped, path masked
pub fn redact_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return INVALID_URL.to_string();
    };

    // Both fail only for URLs that cannot carry credentials
    let _ = url.set_username("");
    let _ = url.set_password(None);

    let has_path = !matches!(url.path(), "" | "/");
    url.set_path(if has_path { "/***" } else { "" });
    url.set_query(None);
    url.set_fragment(None);

    url.to_string().trim_end_matches('/').to_string()
}
