//! Source definition model.
//!
//! A source definition is the complete, declarative description of how one
//! job board is scraped: where to search, which item selectors to try in
//! which order, how to resolve fields inside a result card, which keywords
//! make a posting relevant, and how to read its posted-date phrases.
//!
//! Definitions live in TOML files so that selector or vocabulary drift on a
//! board can be fixed without touching code.

use crate::error::{Result, SourceError};
use jobradar_core::Source;
use serde::{Deserialize, Serialize};

/// Complete scrape definition for one job board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDefinition {
    /// Board identity and search entry point
    pub source: SourceMetadata,
    /// Ordered item-selector strategies; the first one that yields an
    /// accepted posting wins
    pub strategies: Vec<SelectorStrategy>,
    /// Per-field sub-selector alternates applied inside each result card
    pub fields: FieldSelectors,
    /// Relevance keyword vocabulary
    pub relevance: RelevanceVocabulary,
    /// Relative-date phrases in the board's display language
    #[serde(default)]
    pub date_phrases: Vec<DatePhrase>,
}

impl SourceDefinition {
    /// Which board this definition describes.
    #[must_use]
    pub fn id(&self) -> Source {
        self.source.id
    }

    /// The search results URL fetched for this board.
    #[must_use]
    pub fn search_url(&self) -> &str {
        &self.source.search_url
    }

    /// Validate internal consistency of the definition.
    ///
    /// # Errors
    /// Returns `SourceError::Invalid` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.source.search_url.trim().is_empty() {
            return Err(SourceError::Invalid {
                reason: format!("{}: search_url is empty", self.source.id),
            });
        }

        if !self.source.search_url.starts_with("http") {
            return Err(SourceError::Invalid {
                reason: format!(
                    "{}: search_url must be absolute, got '{}'",
                    self.source.id, self.source.search_url
                ),
            });
        }

        if self.strategies.is_empty() {
            return Err(SourceError::Invalid {
                reason: format!("{}: no selector strategies", self.source.id),
            });
        }

        for strategy in &self.strategies {
            if strategy.name.trim().is_empty() || strategy.item.trim().is_empty() {
                return Err(SourceError::Invalid {
                    reason: format!(
                        "{}: strategy with empty name or item selector",
                        self.source.id
                    ),
                });
            }
        }

        for (field, selectors) in [
            ("title", &self.fields.title),
            ("company", &self.fields.company),
            ("location", &self.fields.location),
            ("url", &self.fields.url),
        ] {
            if selectors.is_empty() {
                return Err(SourceError::Invalid {
                    reason: format!("{}: no selectors for field '{field}'", self.source.id),
                });
            }
            if selectors.iter().any(|s| s.trim().is_empty()) {
                return Err(SourceError::Invalid {
                    reason: format!("{}: empty selector for field '{field}'", self.source.id),
                });
            }
        }

        if self.relevance.enabled
            && (self.relevance.seniority.is_empty() || self.relevance.technology.is_empty())
        {
            return Err(SourceError::Invalid {
                reason: format!(
                    "{}: relevance filter enabled but a vocabulary is empty",
                    self.source.id
                ),
            });
        }

        for phrase in &self.date_phrases {
            if phrase.contains.trim().is_empty() {
                return Err(SourceError::Invalid {
                    reason: format!("{}: date phrase with empty match text", self.source.id),
                });
            }
            if phrase.days_ago < 0 {
                return Err(SourceError::Invalid {
                    reason: format!("{}: date phrase with negative days_ago", self.source.id),
                });
            }
        }

        Ok(())
    }
}

/// Board identity and search entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Which board this is
    pub id: Source,
    /// Human-readable name for logs
    pub name: String,
    /// Search results URL, already carrying the query parameters
    pub search_url: String,
    /// Display language of the board
    pub locale: Locale,
}

/// Display language of a board, driving the Accept-Language header and
/// which date phrase table applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English
    En,
    /// German
    De,
}

impl Locale {
    /// Accept-Language header value matching this locale.
    #[must_use]
    pub fn accept_language(&self) -> &'static str {
        match self {
            Locale::En => "en-US,en;q=0.9",
            Locale::De => "de-DE,de;q=0.9,en-US;q=0.8,en;q=0.7",
        }
    }
}

/// A named item-selector strategy.
///
/// Boards A/B-test their result markup; each known variant gets a named
/// strategy so logs can say which one matched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorStrategy {
    /// Name used in logs
    pub name: String,
    /// CSS selector for one result card
    pub item: String,
}

/// Per-field sub-selector alternates, applied within a result card in
/// order; the first alternate that yields text wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSelectors {
    /// Job title
    pub title: Vec<String>,
    /// Hiring company
    pub company: Vec<String>,
    /// Location text
    pub location: Vec<String>,
    /// Posting link (href is taken from the matched element)
    pub url: Vec<String>,
    /// Posted-date phrase, optional on some boards
    #[serde(default)]
    pub posted: Vec<String>,
}

/// Relevance keyword vocabulary.
///
/// A posting is relevant when its title contains at least one seniority
/// keyword and at least one technology keyword (case-insensitive). Boards
/// whose search URL already constrains results set `enabled = false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceVocabulary {
    /// Whether the title filter applies to this board
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Seniority keywords ("junior", "einsteiger", ...)
    #[serde(default)]
    pub seniority: Vec<String>,
    /// Technology keywords ("node", "nodejs", ...)
    #[serde(default)]
    pub technology: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

/// One relative-date phrase mapping.
///
/// Matching is case-insensitive substring containment, in table order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatePhrase {
    /// Substring to look for in the posted-date text
    pub contains: String,
    /// How many days before "now" the posting date is taken to be
    pub days_ago: i64,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn test_definition(id: Source) -> SourceDefinition {
        SourceDefinition {
            source: SourceMetadata {
                id,
                name: id.to_string(),
                search_url: "https://example.com/jobs?q=junior".to_string(),
                locale: Locale::En,
            },
            strategies: vec![SelectorStrategy {
                name: "card".to_string(),
                item: ".job-card".to_string(),
            }],
            fields: FieldSelectors {
                title: vec![".title".to_string()],
                company: vec![".company".to_string()],
                location: vec![".location".to_string()],
                url: vec!["a".to_string()],
                posted: vec![".posted".to_string()],
            },
            relevance: RelevanceVocabulary {
                enabled: true,
                seniority: vec!["junior".to_string()],
                technology: vec!["node".to_string()],
            },
            date_phrases: vec![DatePhrase {
                contains: "today".to_string(),
                days_ago: 0,
            }],
        }
    }

    #[test]
    fn test_valid_definition_passes() {
        let definition = test_definition(Source::Xing);
        assert!(definition.validate().is_ok());
    }

    #[test]
    fn test_empty_search_url_rejected() {
        let mut definition = test_definition(Source::Xing);
        definition.source.search_url = String::new();
        assert!(definition.validate().is_err());
    }

    #[test]
    fn test_relative_search_url_rejected() {
        let mut definition = test_definition(Source::Xing);
        definition.source.search_url = "/jobs?q=junior".to_string();
        assert!(definition.validate().is_err());
    }

    #[test]
    fn test_no_strategies_rejected() {
        let mut definition = test_definition(Source::Xing);
        definition.strategies.clear();
        assert!(definition.validate().is_err());
    }

    #[test]
    fn test_empty_field_selector_rejected() {
        let mut definition = test_definition(Source::Xing);
        definition.fields.company = vec!["  ".to_string()];
        assert!(definition.validate().is_err());
    }

    #[test]
    fn test_enabled_relevance_needs_both_vocabularies() {
        let mut definition = test_definition(Source::Xing);
        definition.relevance.technology.clear();
        assert!(definition.validate().is_err());

        definition.relevance.enabled = false;
        assert!(definition.validate().is_ok());
    }

    #[test]
    fn test_negative_days_ago_rejected() {
        let mut definition = test_definition(Source::Xing);
        definition.date_phrases.push(DatePhrase {
            contains: "tomorrow".to_string(),
            days_ago: -1,
        });
        assert!(definition.validate().is_err());
    }

    #[test]
    fn test_locale_accept_language() {
        assert!(Locale::De.accept_language().starts_with("de-DE"));
        assert!(Locale::En.accept_language().starts_with("en-US"));
    }

    #[test]
    fn test_definition_toml_roundtrip() {
        let definition = test_definition(Source::StepStone);
        let toml_str = toml::to_string_pretty(&definition).expect("serialize definition");
        let parsed: SourceDefinition = toml::from_str(&toml_str).expect("parse definition");
        assert_eq!(parsed.id(), Source::StepStone);
        assert_eq!(parsed.strategies.len(), 1);
    }
}
