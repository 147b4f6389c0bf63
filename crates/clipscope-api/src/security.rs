//! Input screening for analysis requests.
//!
//! Inputs are either a video page URL or a search keyword. URL inputs must be
//! http(s), must not target internal or metadata endpoints, and must belong
//! to a supported video platform.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;
use url::Url;

use clipscope_models::reference::MAX_REFERENCE_LENGTH;
use clipscope_models::is_video_platform_url;

/// Blocked URL patterns (internal ranges and cloud metadata endpoints).
static BLOCKED_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^https?://127\.",
        r"^https?://localhost",
        r"^https?://0\.0\.0\.0",
        r"^https?://10\.",
        r"^https?://172\.(1[6-9]|2[0-9]|3[0-1])\.",
        r"^https?://192\.168\.",
        r"^https?://169\.254\.",
        r"^https?://\[::1\]",
        r"^https?://\[fd",
        r"^https?://\[fe80",
        r"^https?://metadata\.",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){}", p)).expect("valid blocked pattern"))
    .collect()
});

/// Why an input was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputRejection {
    Empty,
    TooLong,
    InvalidUrl(String),
    Blocked,
    UnsupportedPlatform(String),
}

impl InputRejection {
    pub fn message(&self) -> String {
        match self {
            Self::Empty => "Input cannot be empty".to_string(),
            Self::TooLong => format!("Input exceeds maximum length of {} characters", MAX_REFERENCE_LENGTH),
            Self::InvalidUrl(reason) => format!("Invalid URL: {}", reason),
            Self::Blocked => "URL appears to target an internal or restricted endpoint".to_string(),
            Self::UnsupportedPlatform(host) => format!(
                "'{}' is not a supported video platform. Use a TikTok, YouTube or Instagram link, or a search keyword.",
                host
            ),
        }
    }
}

/// Strip control characters, keeping newlines and tabs.
pub fn sanitize_string(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

fn looks_like_url(input: &str) -> bool {
    let lower = input.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.contains("://")
}

/// Sanitize and screen a caller input; returns the cleaned input.
pub fn screen_input(raw: &str) -> Result<String, InputRejection> {
    let cleaned = sanitize_string(raw).trim().to_string();
    if cleaned.is_empty() {
        return Err(InputRejection::Empty);
    }
    if cleaned.chars().count() > MAX_REFERENCE_LENGTH {
        return Err(InputRejection::TooLong);
    }
    if !looks_like_url(&cleaned) {
        return Ok(cleaned);
    }

    let parsed = Url::parse(&cleaned).map_err(|e| InputRejection::InvalidUrl(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(InputRejection::InvalidUrl(format!(
            "protocol '{}' is not allowed",
            parsed.scheme()
        )));
    }

    if BLOCKED_PATTERNS.iter().any(|p| p.is_match(&cleaned)) {
        warn!(url = %cleaned, "Blocked URL pattern detected");
        return Err(InputRejection::Blocked);
    }

    if !is_video_platform_url(&cleaned) {
        let host = parsed.host_str().unwrap_or_default().to_string();
        return Err(InputRejection::UnsupportedPlatform(host));
    }

    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_pass_through() {
        assert_eq!(screen_input("  desk lamp hacks ").unwrap(), "desk lamp hacks");
    }

    #[test]
    fn test_control_chars_stripped() {
        assert_eq!(screen_input("lamp\u{0007}\u{0000}s").unwrap(), "lamps");
        assert_eq!(sanitize_string("a\tb\nc\u{001b}"), "a\tb\nc");
    }

    #[test]
    fn test_platform_url_accepted() {
        let url = "https://www.tiktok.com/@maker/video/7234567890123456789";
        assert_eq!(screen_input(url).unwrap(), url);
    }

    #[test]
    fn test_blocked_internal_urls() {
        for url in [
            "http://127.0.0.1/video",
            "http://localhost:8080/x",
            "http://169.254.169.254/latest/meta-data",
            "http://192.168.1.4/a.mp4",
            "http://metadata.google.internal/computeMetadata",
        ] {
            assert_eq!(screen_input(url), Err(InputRejection::Blocked), "{}", url);
        }
    }

    #[test]
    fn test_unsupported_platform() {
        let err = screen_input("https://example.com/video.mp4").unwrap_err();
        assert_eq!(err, InputRejection::UnsupportedPlatform("example.com".to_string()));
    }

    #[test]
    fn test_rejects_other_schemes_and_empty() {
        assert!(matches!(screen_input("file:///etc/passwd"), Err(InputRejection::InvalidUrl(_))));
        assert_eq!(screen_input(" \u{0000} "), Err(InputRejection::Empty));
        assert_eq!(screen_input(&"a".repeat(2049)), Err(InputRejection::TooLong));
    }
}
