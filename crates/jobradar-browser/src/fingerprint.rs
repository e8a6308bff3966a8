/// Default user agent presented to the boards.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fixed viewport; the boards serve desktop result layouts at this size.
pub const VIEWPORT_WIDTH: u32 = 1920;
/// See [`VIEWPORT_WIDTH`].
pub const VIEWPORT_HEIGHT: u32 = 1080;

/// Browser fingerprint presented to a board during a fetch session.
#[derive(Debug, Clone)]
pub struct FingerprintConfig {
    pub user_agent: String,
    pub accept_language: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl FingerprintConfig {
    /// Fixed desktop fingerprint with the given Accept-Language header.
    pub fn desktop(accept_language: impl Into<String>) -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: accept_language.into(),
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_fingerprint() {
        let config = FingerprintConfig::desktop("de-DE,de;q=0.9");
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.viewport_width, 1920);
        assert_eq!(config.viewport_height, 1080);
        assert!(config.accept_language.starts_with("de-DE"));
    }
}
