use std::collections::HashSet;

use crate::api::models::Match;
use crate::error::AppError;

/// One page of match history as received from the backend.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Matches that survived ingestion.
    pub matches: Vec<Match>,
    /// Raw records the backend sent, malformed ones included.
    pub returned: usize,
}

impl From<Vec<Match>> for Page {
    fn from(matches: Vec<Match>) -> Self {
        Page {
            returned: matches.len(),
            matches,
        }
    }
}

/// Fetches one page of a player's match history, newest first.
pub trait MatchSource {
    fn fetch_page(&self, riot_id: &str, start: usize, count: usize) -> Result<Page, AppError>;
}

/// Loaded matches for one player, newest first, never holding the same match twice.
#[derive(Debug, Default)]
pub struct MatchStore {
    matches: Vec<Match>,
    ids: HashSet<String>,
}

impl MatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends unseen matches in order and returns how many were added.
    pub fn append(&mut self, page: Vec<Match>) -> usize {
        let before = self.matches.len();
        for m in page {
            if self.ids.insert(m.id().to_string()) {
                self.matches.push(m);
            } else {
                tracing::debug!("Skipping duplicate match {}", m.id());
            }
        }
        self.matches.len() - before
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn clear(&mut self) {
        self.matches.clear();
        self.ids.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub riot_id: String,
    pub puuid: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub riot_id: String,
    pub start: usize,
    pub count: usize,
}

/// Match store plus the cursor state that drives "load more".
#[derive(Debug)]
pub struct MatchFeed {
    identity: Option<Identity>,
    store: MatchStore,
    page_size: usize,
    /// Records handed out by the backend so far, duplicates included.
    loaded: usize,
    has_more: bool,
    is_fetching_more: bool,
}

impl MatchFeed {
    pub fn new(page_size: usize) -> Self {
        MatchFeed {
            identity: None,
            store: MatchStore::new(),
            page_size: page_size.max(1),
            loaded: 0,
            has_more: false,
            is_fetching_more: false,
        }
    }

    /// Starts over for a newly searched player, seeded with the profile's first page.
    pub fn open(&mut self, identity: Identity, first_page: Page, page_size: Option<usize>) {
        if let Some(size) = page_size.filter(|s| *s > 0) {
            self.page_size = size;
        }
        self.clear();
        self.identity = Some(identity);
        self.loaded = first_page.returned;
        // A profile fetched without matches still has everything left to load.
        self.has_more = first_page.returned == 0 || first_page.returned >= self.page_size;
        self.store.append(first_page.matches);
    }

    pub fn clear(&mut self) {
        self.identity = None;
        self.store.clear();
        self.loaded = 0;
        self.has_more = false;
        self.is_fetching_more = false;
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn matches(&self) -> &[Match] {
        self.store.matches()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    #[cfg(test)]
    pub fn is_fetching_more(&self) -> bool {
        self.is_fetching_more
    }

    /// Claims the next page. `None` when nothing should be fetched right now.
    pub fn begin_load(&mut self) -> Option<PageRequest> {
        let identity = self.identity.as_ref()?;
        if self.is_fetching_more || !self.has_more {
            return None;
        }
        self.is_fetching_more = true;
        Some(PageRequest {
            riot_id: identity.riot_id.clone(),
            start: self.loaded,
            count: self.page_size,
        })
    }

    /// Applies the outcome of a claimed page. Failures stop pagination instead of erroring.
    pub fn finish_load(&mut self, request: &PageRequest, result: Result<Page, AppError>) -> usize {
        // The player changed while the page was in flight; `open` already reset the guard.
        if self.identity.as_ref().map(|i| i.riot_id.as_str()) != Some(request.riot_id.as_str()) {
            return 0;
        }
        self.is_fetching_more = false;

        match result {
            Ok(page) => {
                self.loaded += page.returned;
                self.has_more = page.returned >= request.count;
                self.store.append(page.matches)
            }
            Err(e) => {
                tracing::warn!("Loading matches from {} failed: {}", request.start, e);
                self.has_more = false;
                0
            }
        }
    }

    pub fn load_more<S: MatchSource>(&mut self, source: &S) -> usize {
        let Some(request) = self.begin_load() else {
            return 0;
        };
        let result = source.fetch_page(&request.riot_id, request.start, request.count);
        self.finish_load(&request, result)
    }

    /// Loads pages until `target` matches are present or the backend runs dry.
    pub fn load_until<S, F>(&mut self, target: usize, source: &S, mut on_page: F) -> usize
    where
        S: MatchSource,
        F: FnMut(usize),
    {
        let mut added = 0;
        while self.store.len() < target && self.has_more && !self.is_fetching_more {
            added += self.load_more(source);
            on_page(self.store.len());
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{history, my_game};
    use std::cell::{Cell, RefCell};

    /// Serves pages out of a fixed history and counts calls.
    struct ScriptedSource {
        history: Vec<Match>,
        calls: Cell<usize>,
        requests: RefCell<Vec<(usize, usize)>>,
        fail_at: Option<usize>,
        /// Page start whose second record fails ingestion.
        malformed_at: Option<usize>,
    }

    impl ScriptedSource {
        fn new(total: usize) -> Self {
            ScriptedSource {
                history: history(total),
                calls: Cell::new(0),
                requests: RefCell::new(Vec::new()),
                fail_at: None,
                malformed_at: None,
            }
        }
    }

    impl MatchSource for ScriptedSource {
        fn fetch_page(&self, _riot_id: &str, start: usize, count: usize) -> Result<Page, AppError> {
            self.calls.set(self.calls.get() + 1);
            self.requests.borrow_mut().push((start, count));
            if self.fail_at == Some(start) {
                return Err(AppError::HttpError("connection reset".to_string()));
            }
            let mut page: Page = self
                .history
                .iter()
                .skip(start)
                .take(count)
                .cloned()
                .collect::<Vec<_>>()
                .into();
            if self.malformed_at == Some(start) && page.matches.len() > 1 {
                page.matches.remove(1);
            }
            Ok(page)
        }
    }

    fn identity() -> Identity {
        Identity {
            riot_id: "Foo#1".to_string(),
            puuid: crate::fixtures::ME.to_string(),
        }
    }

    fn opened(source: &ScriptedSource, page_size: usize) -> MatchFeed {
        let mut feed = MatchFeed::new(page_size);
        let first: Vec<Match> = source.history.iter().take(page_size).cloned().collect();
        feed.open(identity(), first.into(), None);
        feed
    }

    #[test]
    fn test_store_dedups_by_match_id() {
        let mut store = MatchStore::new();
        assert_eq!(store.append(history(3)), 3);
        assert_eq!(store.append(vec![my_game("G1", 420, true, (1, 1, 1)), my_game("N", 420, true, (1, 1, 1))]), 1);
        let ids: Vec<_> = store.matches().iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec!["G0", "G1", "G2", "N"]);
    }

    #[test]
    fn test_load_more_appends_and_tracks_has_more() {
        let source = ScriptedSource::new(25);
        let mut feed = opened(&source, 10);
        assert!(feed.has_more());

        assert_eq!(feed.load_more(&source), 10);
        assert!(feed.has_more());
        assert_eq!(feed.load_more(&source), 5);
        assert!(!feed.has_more());
        assert_eq!(feed.len(), 25);

        assert_eq!(feed.load_more(&source), 0);
        assert_eq!(source.calls.get(), 2);
        assert_eq!(*source.requests.borrow(), vec![(10, 10), (20, 10)]);
    }

    #[test]
    fn test_no_fetch_while_one_is_in_flight() {
        let source = ScriptedSource::new(30);
        let mut feed = opened(&source, 10);

        let request = feed.begin_load().unwrap();
        assert!(feed.is_fetching_more());
        assert_eq!(feed.begin_load(), None);
        assert_eq!(feed.load_more(&source), 0);
        assert_eq!(source.calls.get(), 0);

        let page = source.fetch_page(&request.riot_id, request.start, request.count);
        assert_eq!(feed.finish_load(&request, page), 10);
        assert!(!feed.is_fetching_more());
    }

    #[test]
    fn test_no_fetch_without_identity() {
        let source = ScriptedSource::new(30);
        let mut feed = MatchFeed::new(10);
        assert_eq!(feed.load_more(&source), 0);
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn test_failure_fails_closed() {
        let mut source = ScriptedSource::new(50);
        source.fail_at = Some(20);
        let mut feed = opened(&source, 10);

        assert_eq!(feed.load_until(40, &source, |_| {}), 10);
        assert!(!feed.has_more());
        assert!(!feed.is_fetching_more());
        assert_eq!(feed.len(), 20);
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn test_auto_load_to_range() {
        let source = ScriptedSource::new(100);
        let mut feed = opened(&source, 20);
        let mut progress = Vec::new();

        feed.load_until(40, &source, |loaded| progress.push(loaded));
        assert_eq!(feed.len(), 40);
        assert_eq!(progress, vec![40]);
        assert!(feed.has_more());

        // already satisfied
        feed.load_until(40, &source, |_| {});
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn test_auto_load_stops_when_exhausted() {
        let source = ScriptedSource::new(45);
        let mut feed = opened(&source, 20);
        feed.load_until(100, &source, |_| {});
        assert_eq!(feed.len(), 45);
        assert!(!feed.has_more());
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn test_cursor_advances_past_duplicate_pages() {
        let source = ScriptedSource::new(30);
        let mut feed = MatchFeed::new(10);
        // first page repeated twice by a flaky backend
        let mut first: Vec<Match> = source.history.iter().take(10).cloned().collect();
        first.extend(source.history.iter().take(5).cloned());
        feed.open(identity(), first.into(), Some(15));

        assert_eq!(feed.len(), 10);
        feed.load_more(&source);
        assert_eq!(*source.requests.borrow(), vec![(15, 15)]);
        assert_eq!(feed.len(), 25);
    }

    #[test]
    fn test_malformed_record_does_not_end_pagination() {
        let mut source = ScriptedSource::new(30);
        source.malformed_at = Some(10);
        let mut feed = opened(&source, 10);

        assert_eq!(feed.load_more(&source), 9);
        assert!(feed.has_more());
        assert_eq!(feed.len(), 19);

        feed.load_more(&source);
        assert_eq!(*source.requests.borrow(), vec![(10, 10), (20, 10)]);
        assert_eq!(feed.len(), 29);
    }

    #[test]
    fn test_first_page_counts_raw_records() {
        let source = ScriptedSource::new(30);
        let mut first: Vec<Match> = source.history.iter().take(10).cloned().collect();
        first.remove(3);
        let mut feed = MatchFeed::new(10);
        feed.open(
            identity(),
            Page {
                matches: first,
                returned: 10,
            },
            None,
        );

        assert_eq!(feed.len(), 9);
        assert!(feed.has_more());
        feed.load_more(&source);
        assert_eq!(*source.requests.borrow(), vec![(10, 10)]);
    }

    #[test]
    fn test_stale_page_after_identity_change_is_dropped() {
        let source = ScriptedSource::new(30);
        let mut feed = opened(&source, 10);
        let request = feed.begin_load().unwrap();

        feed.open(
            Identity {
                riot_id: "Bar#2".to_string(),
                puuid: "other".to_string(),
            },
            Page::default(),
            None,
        );
        let page = source.fetch_page(&request.riot_id, request.start, request.count);
        assert_eq!(feed.finish_load(&request, page), 0);
        assert_eq!(feed.len(), 0);
        assert!(feed.has_more());
    }

    #[test]
    fn test_clear_discards_everything() {
        let source = ScriptedSource::new(30);
        let mut feed = opened(&source, 10);
        feed.clear();
        assert!(feed.identity().is_none());
        assert_eq!(feed.len(), 0);
        assert!(!feed.has_more());
    }
}
