use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("chromium error: {0}")]
    ChromiumError(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("snapshot failed: {0}")]
    SnapshotError(String),

    #[error("page already closed")]
    PageClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BrowserError::NavigationError("net::ERR_TIMED_OUT".to_string());
        assert_eq!(err.to_string(), "navigation failed: net::ERR_TIMED_OUT");
    }

    #[test]
    fn test_timeout_error() {
        let err = BrowserError::Timeout("navigation exceeded 60s".to_string());
        assert!(err.to_string().contains("60s"));
    }
}
