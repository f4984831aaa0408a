//! Platform capability detection for the export action.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static MOBILE_USER_AGENT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)android|iphone|ipad|ipod|mobile|blackberry|iemobile|opera mini").ok()
});

/// How the rendered map can leave the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// A native share sheet is available (mobile-like user agents)
    NativeShare,
    /// Plain file download
    Download,
}

impl Platform {
    /// Detect the export capability from a User-Agent header value
    pub fn detect(user_agent: Option<&str>) -> Self {
        let Some(user_agent) = user_agent.map(str::trim).filter(|ua| !ua.is_empty()) else {
            return Platform::Download;
        };

        match MOBILE_USER_AGENT.as_ref() {
            Some(re) if re.is_match(user_agent) => Platform::NativeShare,
            _ => Platform::Download,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mobile_user_agents_can_share() {
        let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Mobile/15E148 Safari/604.1";
        let android = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Mobile Safari/537.36";

        assert_eq!(Platform::detect(Some(iphone)), Platform::NativeShare);
        assert_eq!(Platform::detect(Some(android)), Platform::NativeShare);
    }

    #[test]
    fn test_desktop_and_missing_user_agents_download() {
        let desktop = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

        assert_eq!(Platform::detect(Some(desktop)), Platform::Download);
        assert_eq!(Platform::detect(Some("  ")), Platform::Download);
        assert_eq!(Platform::detect(None), Platform::Download);
    }
}
