//! Headless browser fetch sessions for the jobradar scraper.
//!
//! The boards render their results client-side, so a plain HTTP client gets
//! an empty shell. Each fetch launches an isolated chromium instance,
//! presents a desktop fingerprint, waits for lazy-loaded cards, and hands
//! the settled HTML to the extractor.

pub mod error;
pub mod fingerprint;
pub mod session;

pub use error::{BrowserError, Result};
pub use fingerprint::{FingerprintConfig, DEFAULT_USER_AGENT};
pub use session::{
    ChromiumNavigator, FetchRequest, FetchSettings, Navigator, RenderedPage,
};
