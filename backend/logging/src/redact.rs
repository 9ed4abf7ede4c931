//! Log Redaction
//!
//! Scrubs API keys, bearer tokens, and inline base64 images from strings before logging.

use regex::Regex;
use std::sync::LazyLock;

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9_\-]{16,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});
static DATA_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"data:[a-z]+/[a-z0-9.+\-]+;base64,[A-Za-z0-9+/=]+").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = API_KEY_RE.replace_all(input, "[REDACTED_TOKEN]");
    DATA_URL_RE.replace_all(&redacted, "[REDACTED_IMAGE]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        let raw = "Sending with Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9 key sk-proj-abcdefghijklmnop1234";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"));
        assert!(!clean.contains("sk-proj-abcdefghijklmnop1234"));
    }

    #[test]
    fn strips_inline_images() {
        let clean = redact_sensitive_data("url=data:image/jpeg;base64,/9j/4AAQSkZJRg== ok");
        assert_eq!(clean, "url=[REDACTED_IMAGE] ok");
    }
}
