//! Utility functions for video URL recognition.
//!
//! Shared by the reference classifier and the HTTP layer so both agree on
//! what counts as a link to a single short video.

use url::Url;

/// Short-video platforms whose links are analyzed directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoPlatform {
    TikTok,
    YouTube,
    Instagram,
}

impl VideoPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoPlatform::TikTok => "tiktok",
            VideoPlatform::YouTube => "youtube",
            VideoPlatform::Instagram => "instagram",
        }
    }
}

/// Detect the platform a URL points at.
///
/// Only http(s) URLs are considered. Subdomains are accepted
/// (`vm.tiktok.com`, `m.youtube.com`).
pub fn detect_platform(url: &str) -> Option<VideoPlatform> {
    let parsed = Url::parse(url.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    let host = parsed.host_str()?.to_ascii_lowercase();

    if host_matches(&host, "tiktok.com") {
        Some(VideoPlatform::TikTok)
    } else if host_matches(&host, "youtube.com") || host == "youtu.be" {
        Some(VideoPlatform::YouTube)
    } else if host_matches(&host, "instagram.com") {
        Some(VideoPlatform::Instagram)
    } else {
        None
    }
}

/// Whether the input looks like a link to a recognized video platform.
pub fn is_video_platform_url(url: &str) -> bool {
    detect_platform(url).is_some()
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{}", domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_platform() {
        assert_eq!(
            detect_platform("https://www.tiktok.com/@chef/video/7301234567890123456"),
            Some(VideoPlatform::TikTok)
        );
        assert_eq!(
            detect_platform("https://vm.tiktok.com/ZMabc123/"),
            Some(VideoPlatform::TikTok)
        );
        assert_eq!(
            detect_platform("https://youtube.com/shorts/dQw4w9WgXcQ"),
            Some(VideoPlatform::YouTube)
        );
        assert_eq!(
            detect_platform("https://youtu.be/dQw4w9WgXcQ"),
            Some(VideoPlatform::YouTube)
        );
        assert_eq!(
            detect_platform("https://www.instagram.com/reel/Cabc123/"),
            Some(VideoPlatform::Instagram)
        );
    }

    #[test]
    fn test_detect_platform_rejects_others() {
        assert_eq!(detect_platform("https://example.com/video/1"), None);
        assert_eq!(detect_platform("https://nottiktok.com/video/1"), None);
        assert_eq!(detect_platform("ftp://tiktok.com/video/1"), None);
        assert_eq!(detect_platform("kitchen gadgets"), None);
        assert_eq!(detect_platform(""), None);
    }


    #[test]
    fn test_case_and_whitespace() {
        assert!(is_video_platform_url("  https://WWW.TIKTOK.COM/@a/video/1  "));
    }
}
