//! Browser capability reporting and remediation text.

use serde::{Deserialize, Serialize};

use super::MediaCapabilities;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BrowserSupportInfo {
    pub is_supported: bool,
    pub is_secure_context: bool,
    pub has_media_devices: bool,
    pub has_get_user_media: bool,
    pub error_message: Option<String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Browser {
    Chrome,
    Firefox,
    Safari,
    Edge,
    Opera,
    Unknown,
}

/// Recomputed on every call; capabilities only change across reloads, so
/// there is nothing worth caching.
pub fn check_support(caps: &MediaCapabilities) -> BrowserSupportInfo {
    if !caps.has_host_environment {
        return BrowserSupportInfo {
            is_supported: false,
            is_secure_context: false,
            has_media_devices: false,
            has_get_user_media: false,
            error_message: Some("Not in browser environment".into()),
            suggestions: vec!["This feature only works in browsers".into()],
        };
    }

    let mut suggestions = Vec::new();
    let mut is_supported = true;
    let mut error_message: Option<String> = None;

    if !caps.is_secure_context {
        is_supported = false;
        error_message = Some("Camera access requires HTTPS".into());
        suggestions.push("Use HTTPS or localhost for testing".into());
        suggestions.push("Deploy to a secure hosting service like Vercel or Netlify".into());
    }

    if !caps.has_media_devices {
        is_supported = false;
        error_message.get_or_insert_with(|| "MediaDevices API not supported".into());
        suggestions.push("Use a modern browser (Chrome 53+, Firefox 36+, Safari 11+, Edge 12+)".into());
        suggestions.push("Update your browser to the latest version".into());
    }

    let has_get_user_media = caps.has_media_devices && caps.has_get_user_media;
    if !has_get_user_media {
        is_supported = false;
        error_message.get_or_insert_with(|| "getUserMedia not supported".into());
        suggestions.push("Use a browser that supports camera access".into());
        suggestions.push("Enable camera permissions in browser settings".into());
    }

    if caps.has_camera_api() {
        let agent = caps.user_agent.to_lowercase();

        if agent.contains("firefox") && agent.contains("mobile") {
            suggestions.push("Firefox Mobile may have limited camera support".into());
        }

        if agent.contains("safari") && !agent.contains("chrome") {
            if let Some(version) = safari_major_version(&agent) {
                if version < 11 {
                    is_supported = false;
                    error_message = Some("Safari version too old".into());
                    suggestions.push("Update Safari to version 11 or later".into());
                }
            }
        }
    }

    if is_supported && suggestions.is_empty() {
        suggestions.push("Camera access should work in this browser".into());
    }

    BrowserSupportInfo {
        is_supported,
        is_secure_context: caps.is_secure_context,
        has_media_devices: caps.has_media_devices,
        has_get_user_media,
        error_message,
        suggestions,
    }
}

fn safari_major_version(lower_agent: &str) -> Option<u32> {
    let (_, rest) = lower_agent.split_once("version/")?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

pub fn detect_browser(user_agent: &str) -> Browser {
    if user_agent.contains("Chrome") && !user_agent.contains("Edg") {
        Browser::Chrome
    } else if user_agent.contains("Firefox") {
        Browser::Firefox
    } else if user_agent.contains("Safari") && !user_agent.contains("Chrome") {
        Browser::Safari
    } else if user_agent.contains("Edg") {
        Browser::Edge
    } else if user_agent.contains("Opera") {
        Browser::Opera
    } else {
        Browser::Unknown
    }
}

pub fn recommended_browsers() -> Vec<String> {
    ["Chrome (recommended)", "Firefox", "Safari 11+", "Edge", "Opera"]
        .into_iter()
        .map(String::from)
        .collect()
}

pub fn permission_instructions(browser: Browser) -> Vec<String> {
    let steps: [&str; 3] = match browser {
        Browser::Chrome => [
            "1. Click the camera icon in the address bar",
            "2. Select \"Always allow\" for this site",
            "3. Refresh the page",
        ],
        Browser::Firefox => [
            "1. Click the shield icon in the address bar",
            "2. Click \"Allow\" when prompted for camera access",
            "3. Refresh if needed",
        ],
        Browser::Safari => [
            "1. Go to Safari > Settings for This Website",
            "2. Set Camera to \"Allow\"",
            "3. Refresh the page",
        ],
        Browser::Edge => [
            "1. Click the camera icon in the address bar",
            "2. Select \"Allow\" for camera access",
            "3. Refresh the page",
        ],
        Browser::Opera | Browser::Unknown => [
            "1. Look for camera/permission icons in the address bar",
            "2. Allow camera access when prompted",
            "3. Refresh the page if needed",
        ],
    };
    steps.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const CHROME_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
    const EDGE_UA: &str = "Mozilla/5.0 (Windows NT 10.0) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36 Edg/120.0";
    const OLD_SAFARI_UA: &str = "Mozilla/5.0 (Macintosh) AppleWebKit/603.1 (KHTML, like Gecko) Version/10.1 Safari/603.1";

    fn caps(secure: bool, media: bool, gum: bool, agent: &str) -> MediaCapabilities {
        MediaCapabilities {
            has_host_environment: true,
            is_secure_context: secure,
            has_media_devices: media,
            has_get_user_media: gum,
            user_agent: agent.into(),
        }
    }

    #[test]
    fn test_supported_environment() {
        let info = check_support(&caps(true, true, true, CHROME_UA));
        assert!(info.is_supported);
        assert_eq!(info.error_message, None);
        assert_eq!(info.suggestions, vec!["Camera access should work in this browser"]);
    }

    #[test]
    fn test_insecure_context_reports_first_cause() {
        let info = check_support(&caps(false, false, false, CHROME_UA));
        assert!(!info.is_supported);
        assert_eq!(info.error_message.as_deref(), Some("Camera access requires HTTPS"));
        assert_eq!(info.suggestions.len(), 6);
    }

    #[test]
    fn test_get_user_media_requires_media_devices() {
        let info = check_support(&caps(true, false, true, CHROME_UA));
        assert!(!info.has_get_user_media);
        assert_eq!(info.error_message.as_deref(), Some("MediaDevices API not supported"));
    }

    #[test]
    fn test_old_safari_is_rejected() {
        let info = check_support(&caps(true, true, true, OLD_SAFARI_UA));
        assert!(!info.is_supported);
        assert_eq!(info.error_message.as_deref(), Some("Safari version too old"));
    }

    #[test]
    fn test_headless_host() {
        let mut headless = caps(true, true, true, "");
        headless.has_host_environment = false;
        let info = check_support(&headless);
        assert!(!info.is_supported);
        assert!(!info.is_secure_context);
    }

    #[rstest]
    #[case(CHROME_UA, Browser::Chrome)]
    #[case(EDGE_UA, Browser::Edge)]
    #[case(OLD_SAFARI_UA, Browser::Safari)]
    #[case("Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0", Browser::Firefox)]
    #[case("curl/8.0", Browser::Unknown)]
    fn test_detect_browser(#[case] agent: &str, #[case] expected: Browser) {
        assert_eq!(detect_browser(agent), expected);
    }

    #[test]
    fn test_instructions_have_three_steps() {
        for browser in [Browser::Chrome, Browser::Firefox, Browser::Safari, Browser::Edge, Browser::Unknown] {
            assert_eq!(permission_instructions(browser).len(), 3);
        }
        assert_eq!(recommended_browsers()[0], "Chrome (recommended)");
    }
}
