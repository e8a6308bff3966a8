//! Shared types used across the jobradar service.
//!
//! This module defines the common enums and posting records that flow
//! between the fetch, extraction and ingestion stages.

use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The job boards the service knows how to ingest from.
///
/// The set is closed: the ingestion trigger rejects anything outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// linkedin.com job search
    LinkedIn,
    /// xing.com job search
    Xing,
    /// stepstone.de job search
    StepStone,
}

impl Source {
    /// All supported sources, in scrape order.
    pub const ALL: [Source; 3] = [Source::LinkedIn, Source::Xing, Source::StepStone];

    /// Canonical display name, as stored in the database.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::LinkedIn => "LinkedIn",
            Source::Xing => "Xing",
            Source::StepStone => "StepStone",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Source {
    type Err = CoreError;

    /// Parse a source name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linkedin" => Ok(Source::LinkedIn),
            "xing" => Ok(Source::Xing),
            "stepstone" => Ok(Source::StepStone),
            other => Err(CoreError::Validation(format!("unknown source: '{other}'"))),
        }
    }
}

/// German language requirement recorded on a stored job.
///
/// The scraper never infers this; new records start at `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GermanLevel {
    /// No German required
    None,
    /// Intermediate
    B1,
    /// Upper intermediate
    B2,
    /// Advanced
    C1,
    /// Near-native
    C2,
    /// Not yet classified
    Unknown,
}

impl GermanLevel {
    /// Canonical display name, as stored in the database.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            GermanLevel::None => "None",
            GermanLevel::B1 => "B1",
            GermanLevel::B2 => "B2",
            GermanLevel::C1 => "C1",
            GermanLevel::C2 => "C2",
            GermanLevel::Unknown => "Unknown",
        }
    }
}

impl Default for GermanLevel {
    fn default() -> Self {
        GermanLevel::Unknown
    }
}

impl fmt::Display for GermanLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GermanLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(GermanLevel::None),
            "b1" => Ok(GermanLevel::B1),
            "b2" => Ok(GermanLevel::B2),
            "c1" => Ok(GermanLevel::C1),
            "c2" => Ok(GermanLevel::C2),
            "unknown" => Ok(GermanLevel::Unknown),
            other => Err(CoreError::Validation(format!(
                "unknown german level: '{other}'"
            ))),
        }
    }
}

/// A posting as extracted from a rendered results page, before any
/// normalization. The posted date is kept as the raw phrase the site
/// displayed ("vor 3 Tagen", "2 weeks ago", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPosting {
    /// Job title as displayed
    pub title: String,
    /// Hiring company
    pub company: String,
    /// Location text as displayed
    pub location: String,
    /// Absolute URL of the posting
    pub url: String,
    /// Which board the posting came from
    pub source: Source,
    /// Raw posted-date phrase, if the card showed one
    pub posted_text: Option<String>,
}

impl RawPosting {
    /// Whether all fields required for ingestion are present and non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.company.trim().is_empty()
            && !self.location.trim().is_empty()
            && !self.url.trim().is_empty()
    }
}

/// A posting with its posted date resolved to a concrete instant.
///
/// This is the shape the ingestion pipeline consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalPosting {
    /// Job title as displayed
    pub title: String,
    /// Hiring company
    pub company: String,
    /// Location text as displayed
    pub location: String,
    /// Absolute URL of the posting
    pub url: String,
    /// Which board the posting came from
    pub source: Source,
    /// Normalized posted date
    pub posted_at: DateTime<Utc>,
}

impl CanonicalPosting {
    /// Whether all fields required for ingestion are present and non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.company.trim().is_empty()
            && !self.location.trim().is_empty()
            && !self.url.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_parse_case_insensitive() {
        assert_eq!("linkedin".parse::<Source>().expect("parse"), Source::LinkedIn);
        assert_eq!("LinkedIn".parse::<Source>().expect("parse"), Source::LinkedIn);
        assert_eq!("XING".parse::<Source>().expect("parse"), Source::Xing);
        assert_eq!("StepStone".parse::<Source>().expect("parse"), Source::StepStone);
        assert!("indeed".parse::<Source>().is_err());
    }

    #[test]
    fn test_source_display_roundtrip() {
        for source in Source::ALL {
            let parsed: Source = source.to_string().parse().expect("roundtrip");
            assert_eq!(parsed, source);
        }
    }

    #[test]
    fn test_german_level_default_and_parse() {
        assert_eq!(GermanLevel::default(), GermanLevel::Unknown);
        assert_eq!("b2".parse::<GermanLevel>().expect("parse"), GermanLevel::B2);
        assert!("a1".parse::<GermanLevel>().is_err());
    }

    #[test]
    fn test_raw_posting_completeness() {
        let posting = RawPosting {
            title: "Junior Developer".to_string(),
            company: "Acme".to_string(),
            location: "Berlin".to_string(),
            url: "https://example.com/jobs/1".to_string(),
            source: Source::Xing,
            posted_text: None,
        };
        assert!(posting.is_complete());

        let mut missing = posting.clone();
        missing.company = "  ".to_string();
        assert!(!missing.is_complete());
    }
}
