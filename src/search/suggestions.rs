use super::history::{SearchHistory, MAX_HISTORY};
use crate::api::models::Suggestion;

pub const MIN_QUERY_LEN: usize = 2;
pub const MAX_REMOTE_SUGGESTIONS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionItem {
    Recent(String),
    Remote(Suggestion),
}

impl SuggestionItem {
    pub fn riot_id(&self) -> &str {
        match self {
            SuggestionItem::Recent(riot_id) => riot_id,
            SuggestionItem::Remote(suggestion) => &suggestion.riot_id,
        }
    }
}

pub fn should_query(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_LEN
}

/// Matching history entries first, then remote suggestions not already listed.
pub fn merge_suggestions(
    history: &SearchHistory,
    query: &str,
    remote: &[Suggestion],
) -> Vec<SuggestionItem> {
    let mut items: Vec<SuggestionItem> = history
        .matching(query)
        .into_iter()
        .take(MAX_HISTORY)
        .map(|entry| SuggestionItem::Recent(entry.to_string()))
        .collect();

    let remote_items: Vec<SuggestionItem> = remote
        .iter()
        .filter(|s| {
            !items
                .iter()
                .any(|item| item.riot_id().eq_ignore_ascii_case(&s.riot_id))
        })
        .take(MAX_REMOTE_SUGGESTIONS)
        .cloned()
        .map(SuggestionItem::Remote)
        .collect();

    items.extend(remote_items);
    items
}

/// Keeps only the response to the most recently issued query.
#[derive(Debug, Default)]
pub struct SuggestionTracker {
    latest: Option<String>,
}

impl SuggestionTracker {
    pub fn begin(&mut self, query: &str) {
        self.latest = Some(query.to_string());
    }

    /// True when `query` is still the latest one; the slot is released on acceptance.
    pub fn accept(&mut self, query: &str) -> bool {
        if self.latest.as_deref() == Some(query) {
            self.latest = None;
            true
        } else {
            tracing::debug!("Discarding stale suggestions for '{}'", query);
            false
        }
    }

    pub fn reset(&mut self) {
        self.latest = None;
    }
}
