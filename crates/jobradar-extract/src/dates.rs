//! Posted-date normalization.
//!
//! Boards show relative phrases ("vor 2 Tagen", "1 week ago") rather than
//! timestamps. Normalization is a total function: a phrase table lookup,
//! then absolute-format fallbacks, then "now". It never fails; a wrong-ish
//! date is better than a dropped posting.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use jobradar_core::{CanonicalPosting, RawPosting};
use jobradar_sources::DatePhrase;
use tracing::debug;

/// Resolve a raw posted-date phrase to an instant.
///
/// Phrase matching is case-insensitive substring containment in table
/// order. Unmatched text falls through to RFC 3339, `%Y-%m-%d` and
/// `%d.%m.%Y`; anything still unrecognized resolves to `now`.
#[must_use]
pub fn normalize_posted(
    text: Option<&str>,
    phrases: &[DatePhrase],
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let Some(text) = text else {
        return now;
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return now;
    }

    let lowered = trimmed.to_lowercase();
    for phrase in phrases {
        if lowered.contains(&phrase.contains.to_lowercase()) {
            return now - Duration::days(phrase.days_ago);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return dt.with_timezone(&Utc);
    }

    for format in ["%Y-%m-%d", "%d.%m.%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return dt.and_utc();
            }
        }
    }

    debug!(text = trimmed, "unrecognized posted-date text, using now");
    now
}

/// Attach a normalized posted date to a raw posting.
#[must_use]
pub fn canonicalize(
    raw: RawPosting,
    phrases: &[DatePhrase],
    now: DateTime<Utc>,
) -> CanonicalPosting {
    let posted_at = normalize_posted(raw.posted_text.as_deref(), phrases, now);

    CanonicalPosting {
        title: raw.title,
        company: raw.company,
        location: raw.location,
        url: raw.url,
        source: raw.source,
        posted_at,
    }
}
