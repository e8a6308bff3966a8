//! Relevance filter.
//!
//! A posting is relevant when its title or the full text of its result card
//! contains at least one seniority keyword and at least one technology
//! keyword, case-insensitively. Boards whose search URL already constrains
//! results disable the filter in their definition.

use jobradar_sources::RelevanceVocabulary;

/// Two-vocabulary substring filter over a posting's title and card text.
pub struct RelevanceFilter<'a> {
    vocabulary: &'a RelevanceVocabulary,
}

impl<'a> RelevanceFilter<'a> {
    #[must_use]
    pub fn new(vocabulary: &'a RelevanceVocabulary) -> Self {
        Self { vocabulary }
    }

    /// Whether the posting passes the filter. Keywords may appear in the
    /// title or anywhere in the card's text; boards often put "Junior" in
    /// the body rather than the title.
    #[must_use]
    pub fn is_relevant(&self, title: &str, card_text: &str) -> bool {
        if !self.vocabulary.enabled {
            return true;
        }

        let haystack = format!("{title}\n{card_text}").to_lowercase();
        let contains_any =
            |words: &[String]| words.iter().any(|w| haystack.contains(&w.to_lowercase()));

        contains_any(&self.vocabulary.seniority) && contains_any(&self.vocabulary.technology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary(enabled: bool) -> RelevanceVocabulary {
        RelevanceVocabulary {
            enabled,
            seniority: vec![
                "junior".to_string(),
                "entry".to_string(),
                "einsteiger".to_string(),
            ],
            technology: vec!["node".to_string(), "nodejs".to_string()],
        }
    }

    #[test]
    fn test_needs_keyword_from_both_vocabularies() {
        let vocab = vocabulary(true);
        let filter = RelevanceFilter::new(&vocab);

        assert!(filter.is_relevant("Junior Node.js Developer", ""));
        assert!(filter.is_relevant("Berufseinsteiger NodeJS Backend", ""));
        // Seniority only
        assert!(!filter.is_relevant("Junior Java Developer", ""));
        // Technology only
        assert!(!filter.is_relevant("Senior Node Engineer", ""));
        assert!(!filter.is_relevant("Staff Platform Engineer", ""));
    }

    #[test]
    fn test_card_text_counts_toward_the_match() {
        let vocab = vocabulary(true);
        let filter = RelevanceFilter::new(&vocab);

        // Neutral title, keywords only in the card body
        assert!(filter.is_relevant(
            "Software Developer (m/w/d)",
            "Wir suchen einen Junior Entwickler mit Node.js Erfahrung"
        ));
        // One vocabulary in the title, the other in the body
        assert!(filter.is_relevant("Junior Developer", "Stack: Node.js, Postgres"));
        // Body alone can't rescue a posting missing a whole vocabulary
        assert!(!filter.is_relevant("Software Developer", "Junior position, Java stack"));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let vocab = vocabulary(true);
        let filter = RelevanceFilter::new(&vocab);

        assert!(filter.is_relevant("JUNIOR NODE DEVELOPER", ""));
        assert!(filter.is_relevant("junior node developer", ""));
    }

    #[test]
    fn test_disabled_filter_accepts_everything() {
        let vocab = vocabulary(false);
        let filter = RelevanceFilter::new(&vocab);

        assert!(filter.is_relevant("Senior Java Architect", ""));
        assert!(filter.is_relevant("", ""));
    }
}
