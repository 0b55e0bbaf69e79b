use std::time::{Duration, Instant};

use super::debounce::Debouncer;
use super::history::SearchHistory;
use super::suggestions::{merge_suggestions, should_query, SuggestionItem, SuggestionTracker};
use crate::api::models::{RiotId, Suggestion};

#[derive(Debug)]
pub enum SessionEvent {
    /// The search box now reads this text.
    Input(String),
    Suggestions {
        query: String,
        results: Vec<Suggestion>,
    },
    Closed,
}

#[derive(Debug, PartialEq)]
pub enum SessionAction {
    Idle,
    /// Fetch remote suggestions for this query.
    Query(String),
    Show(Vec<SuggestionItem>),
    Submit(RiotId),
    /// Fetch the next page for the open profile.
    LoadMore,
    Invalid(String),
    HistoryCleared,
    Quit,
}

/// State of an interactive search box: debounced text, suggestions and history.
pub struct SearchSession {
    text: Debouncer<String>,
    raw: String,
    tracker: SuggestionTracker,
    history: SearchHistory,
}

impl SearchSession {
    pub fn new(history: SearchHistory, delay: Duration) -> Self {
        SearchSession {
            text: Debouncer::new(String::new(), delay),
            raw: String::new(),
            tracker: SuggestionTracker::default(),
            history,
        }
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    /// When `tick` should next be called.
    pub fn deadline(&self) -> Option<Instant> {
        self.text.deadline()
    }

    pub fn handle(&mut self, event: SessionEvent, now: Instant) -> SessionAction {
        match event {
            SessionEvent::Input(line) => self.on_input(line, now),
            SessionEvent::Suggestions { query, results } => {
                if self.tracker.accept(&query) {
                    SessionAction::Show(merge_suggestions(&self.history, &query, &results))
                } else {
                    SessionAction::Idle
                }
            }
            SessionEvent::Closed => self.close(),
        }
    }

    fn on_input(&mut self, line: String, now: Instant) -> SessionAction {
        match line.trim() {
            ":q" | ":quit" => self.close(),
            ":clear" => {
                self.history.clear();
                SessionAction::HistoryCleared
            }
            ":more" => SessionAction::LoadMore,
            ":go" => match self.raw.parse::<RiotId>() {
                Ok(riot_id) => SessionAction::Submit(riot_id),
                Err(_) => SessionAction::Invalid(self.raw.clone()),
            },
            text => {
                self.raw = text.to_string();
                self.text.input(self.raw.clone(), now);
                SessionAction::Idle
            }
        }
    }

    /// Records a submitted Riot ID once its profile has loaded.
    pub fn record_success(&mut self, riot_id: &RiotId) {
        self.history.record(&riot_id.to_string());
    }

    pub fn tick(&mut self, now: Instant) -> SessionAction {
        let Some(query) = self.text.settle(now).cloned() else {
            return SessionAction::Idle;
        };
        if should_query(&query) {
            self.tracker.begin(&query);
            SessionAction::Query(query)
        } else {
            self.tracker.reset();
            SessionAction::Show(Vec::new())
        }
    }

    fn close(&mut self) -> SessionAction {
        self.text.cancel();
        self.tracker.reset();
        SessionAction::Quit
    }
}
