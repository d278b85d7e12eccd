//! Match explanations
//!
//! Extracts short, human-readable reasons why an item surfaced for a query,
//! drawn verbatim from the item's tags, occasions, seasons, category and
//! subcategory.

use ahash::AHashSet;
use shopkeeper_core::Item;

/// Upper bound on reasons attached to one result
pub const MAX_MATCH_REASONS: usize = 5;

/// Lower-cased whitespace-separated query words.
#[derive(Debug, Clone)]
pub struct QueryTerms {
    words: Vec<String>,
    lookup: AHashSet<String>,
}

impl QueryTerms {
    pub fn new(query: &str) -> Self {
        let lowered = query.to_lowercase();
        let mut words = Vec::new();
        let mut lookup = AHashSet::new();
        for word in lowered.split_whitespace() {
            if lookup.insert(word.to_string()) {
                words.push(word.to_string());
            }
        }
        Self { words, lookup }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Exact word match against an already lower-cased value
    fn contains_word(&self, value: &str) -> bool {
        self.lookup.contains(value)
    }

    /// Exact match, or some query word occurring inside the value
    fn matches_loosely(&self, value: &str) -> bool {
        self.contains_word(value) || self.words.iter().any(|w| value.contains(w.as_str()))
    }
}

/// Ordered, de-duplicated reasons for `item` matching `query`.
pub fn explain(item: &Item, query: &str) -> Vec<String> {
    explain_terms(item, &QueryTerms::new(query))
}

/// Same as [`explain`] with pre-tokenized query terms, so a pipeline can
/// tokenize once per request instead of once per candidate.
pub fn explain_terms(item: &Item, terms: &QueryTerms) -> Vec<String> {
    let mut reasons = Reasons::default();
    if terms.is_empty() {
        return reasons.into_vec();
    }

    for tag in item.tags.iter().chain(&item.occasions) {
        if terms.matches_loosely(&tag.to_lowercase()) {
            reasons.push(tag);
        }
    }

    // Season names are short; substring matching would fire on unrelated words.
    for season in &item.seasons {
        if terms.contains_word(&season.to_lowercase()) {
            reasons.push(season);
        }
    }

    let category = Some(item.category.as_str());
    for label in [category, item.subcategory.as_deref()].into_iter().flatten() {
        if terms.contains_word(&label.to_lowercase()) {
            reasons.push(label);
        }
    }

    reasons.into_vec()
}

/// First-found order, case-sensitive de-duplication, capped.
#[derive(Default)]
struct Reasons {
    ordered: Vec<String>,
    seen: AHashSet<String>,
}

impl Reasons {
    fn push(&mut self, reason: &str) {
        if self.ordered.len() >= MAX_MATCH_REASONS {
            return;
        }
        if self.seen.insert(reason.to_string()) {
            self.ordered.push(reason.to_string());
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}
