//! Error types for image generation.

use std::time::Duration;

/// Errors that can occur while generating the first-view image.
#[derive(Debug, thiserror::Error)]
pub enum FirstViewError {
    /// API key missing or invalid.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Generation did not finish within the caller's timeout.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Billing is not enabled for the account.
    #[error("billing error: {0}")]
    Billing(String),

    /// Provider answered 200 but without usable image data.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., saving file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for first-view generation.
pub type Result<T> = std::result::Result<T, FirstViewError>;

const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Cleans a provider error body before it is surfaced.
///
/// Collapses whitespace, redacts anything that looks like a Google API key
/// and truncates to a bounded length on a char boundary.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let redacted = collapsed
        .split(' ')
        .map(|word| match word.find("AIza") {
            Some(pos) => format!("{}[REDACTED]", &word[..pos]),
            None => word.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ");

    if redacted.chars().count() <= MAX_ERROR_MESSAGE_LEN {
        return redacted;
    }
    let mut truncated: String = redacted.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
    truncated.push_str("...");
    truncated
}

/// Reads a `Retry-After` header given in seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};

    #[test]
    fn test_error_display() {
        let err = FirstViewError::Api {
            status: 404,
            message: "Not found".into(),
        };
        assert_eq!(err.to_string(), "API error: 404 - Not found");

        let err = FirstViewError::ContentBlocked("Safety filter triggered".into());
        assert_eq!(err.to_string(), "content blocked: Safety filter triggered");

        let err = FirstViewError::Timeout(Duration::from_secs(300));
        assert_eq!(err.to_string(), "operation timed out after 300s");
    }

    #[test]
    fn test_sanitize_collapses_whitespace() {
        assert_eq!(
            sanitize_error_message("  quota\n\n exceeded\t now "),
            "quota exceeded now"
        );
    }

    #[test]
    fn test_sanitize_redacts_api_key() {
        let msg = sanitize_error_message("bad key=AIzaSyD-secret-value given");
        assert_eq!(msg, "bad key=[REDACTED] given");
    }

    #[test]
    fn test_sanitize_truncates_long_messages() {
        let long = "あ".repeat(MAX_ERROR_MESSAGE_LEN + 10);
        let msg = sanitize_error_message(&long);
        assert!(msg.ends_with("..."));
        assert_eq!(msg.chars().count(), MAX_ERROR_MESSAGE_LEN + 3);
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("30"));
        assert_eq!(parse_retry_after(&headers), Some(30));

        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(parse_retry_after(&headers), None);
    }
}
