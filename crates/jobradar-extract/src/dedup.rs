//! In-batch deduplication.
//!
//! Within one merged scrape batch, postings are considered duplicates when
//! lowercased title and company match; the first occurrence wins. Note the
//! batch key is deliberately looser than the store's (title, company, url)
//! reconciliation key, matching how the boards repeat the same posting
//! across result variants.

use jobradar_core::CanonicalPosting;
use std::collections::HashSet;
use tracing::debug;

/// Case-insensitive (title, company) fingerprint.
#[must_use]
pub fn fingerprint(posting: &CanonicalPosting) -> String {
    format!(
        "{}\u{1}{}",
        posting.title.to_lowercase(),
        posting.company.to_lowercase()
    )
}

/// Drop in-batch duplicates, keeping the first occurrence of each
/// fingerprint. Pure: ordering of survivors is the input ordering.
#[must_use]
pub fn dedup_postings(postings: Vec<CanonicalPosting>) -> Vec<CanonicalPosting> {
    let before = postings.len();
    let mut seen = HashSet::new();

    let deduped: Vec<CanonicalPosting> = postings
        .into_iter()
        .filter(|posting| seen.insert(fingerprint(posting)))
        .collect();

    if deduped.len() < before {
        debug!(
            before,
            after = deduped.len(),
            "removed in-batch duplicates"
        );
    }

    deduped
}
