//! Posting extraction via an ordered selector-strategy cascade.
//!
//! Strategies are tried in definition order; the first one that yields at
//! least one accepted posting wins and later strategies are never
//! consulted. Within a result card, each field is resolved through its own
//! ordered list of sub-selector alternates.

use crate::error::{ExtractError, Result};
use crate::relevance::RelevanceFilter;
use jobradar_core::RawPosting;
use jobradar_sources::SourceDefinition;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Extracts postings from the settled HTML of one board's results page.
pub struct PostingExtractor<'a> {
    definition: &'a SourceDefinition,
    base_url: Url,
}

impl<'a> PostingExtractor<'a> {
    /// # Errors
    /// Returns error if the definition's search URL can't be parsed; it is
    /// the join base for relative posting links.
    pub fn new(definition: &'a SourceDefinition) -> Result<Self> {
        let base_url = Url::parse(definition.search_url()).map_err(|e| {
            ExtractError::InvalidBaseUrl {
                board: definition.id(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            definition,
            base_url,
        })
    }

    /// Run the strategy cascade over the given HTML.
    ///
    /// An empty result is not an error: it means no known markup variant
    /// matched, or everything that matched was filtered out. A strategy
    /// whose item selector doesn't parse is skipped the same way a
    /// non-matching one is; the rest of the cascade still runs.
    #[must_use]
    pub fn extract(&self, html: &str) -> Vec<RawPosting> {
        let document = Html::parse_document(html);
        let filter = RelevanceFilter::new(&self.definition.relevance);

        for strategy in &self.definition.strategies {
            let item_selector = match Selector::parse(&strategy.item) {
                Ok(selector) => selector,
                Err(e) => {
                    warn!(
                        source = %self.definition.id(),
                        strategy = %strategy.name,
                        selector = %strategy.item,
                        error = %e,
                        "skipping strategy with unparsable item selector"
                    );
                    continue;
                }
            };

            let mut accepted = Vec::new();
            let mut dropped_incomplete = 0usize;
            let mut dropped_irrelevant = 0usize;

            for item in document.select(&item_selector) {
                let Some(posting) = self.parse_item(&item) else {
                    dropped_incomplete += 1;
                    continue;
                };

                let card_text = item.text().collect::<String>();
                if !filter.is_relevant(&posting.title, &card_text) {
                    debug!(
                        source = %self.definition.id(),
                        title = %posting.title,
                        "dropped irrelevant posting"
                    );
                    dropped_irrelevant += 1;
                    continue;
                }

                accepted.push(posting);
            }

            if accepted.is_empty() {
                debug!(
                    source = %self.definition.id(),
                    strategy = %strategy.name,
                    dropped_incomplete,
                    dropped_irrelevant,
                    "strategy yielded no accepted postings"
                );
                continue;
            }

            info!(
                source = %self.definition.id(),
                strategy = %strategy.name,
                count = accepted.len(),
                dropped_incomplete,
                dropped_irrelevant,
                "strategy matched"
            );
            return accepted;
        }

        warn!(
            source = %self.definition.id(),
            strategies = self.definition.strategies.len(),
            "no strategy yielded postings"
        );
        Vec::new()
    }

    /// Resolve one result card. Cards missing any required field are
    /// dropped rather than stored half-empty.
    fn parse_item(&self, element: &ElementRef) -> Option<RawPosting> {
        let fields = &self.definition.fields;

        let title = self.first_text(element, &fields.title)?;
        let company = self.first_text(element, &fields.company)?;
        let location = self.first_text(element, &fields.location)?;
        let url = self.posting_url(element)?;
        let posted_text = self.first_text(element, &fields.posted);

        Some(RawPosting {
            title,
            company,
            location,
            url,
            source: self.definition.id(),
            posted_text,
        })
    }

    /// First sub-selector alternate that yields non-empty text.
    fn first_text(&self, element: &ElementRef, selectors: &[String]) -> Option<String> {
        for sel in selectors {
            let Ok(selector) = Selector::parse(sel) else {
                debug!(selector = %sel, "skipping unparsable field selector");
                continue;
            };

            if let Some(found) = element.select(&selector).next() {
                let text = found.text().collect::<String>();
                let text = WHITESPACE.replace_all(text.trim(), " ").to_string();
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
        None
    }

    /// Resolve the posting link, joining relative hrefs against the search
    /// URL. Some boards make the whole card an anchor, so the card's own
    /// href is the last fallback.
    fn posting_url(&self, element: &ElementRef) -> Option<String> {
        for sel in &self.definition.fields.url {
            let Ok(selector) = Selector::parse(sel) else {
                continue;
            };

            if let Some(href) = element
                .select(&selector)
                .next()
                .and_then(|el| el.value().attr("href"))
            {
                return self.absolutize(href);
            }
        }

        element
            .value()
            .attr("href")
            .and_then(|href| self.absolutize(href))
    }

    fn absolutize(&self, href: &str) -> Option<String> {
        if href.trim().is_empty() {
            return None;
        }
        match self.base_url.join(href) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                debug!(href, error = %e, "dropping unjoinable posting link");
                None
            }
        }
    }
}
