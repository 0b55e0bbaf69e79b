use crate::analysis::filter::{filter_matches, queue_menu, visible_summary, FilterState, QueueOption, VisibleSummary};
use crate::analysis::summary::{summarize, RangeSelection, Summary};
use crate::api::models::Match;
use crate::store::{Identity, MatchFeed, MatchSource, Page};

/// Everything a profile screen shows, derived from the loaded matches.
#[derive(Debug)]
pub struct DashboardView<'a> {
    pub range: RangeSelection,
    pub filter: FilterState,
    pub summary: Summary,
    pub visible: Vec<&'a Match>,
    pub visible_summary: VisibleSummary,
}

/// One player's profile screen: loaded matches plus the viewer's range and filter choices.
pub struct Dashboard {
    feed: MatchFeed,
    filter: FilterState,
    range: RangeSelection,
}

impl Dashboard {
    pub fn new(page_size: usize) -> Self {
        Dashboard {
            feed: MatchFeed::new(page_size),
            filter: FilterState::default(),
            range: RangeSelection::default(),
        }
    }

    /// Switches to another player. Range and filters go back to their defaults.
    pub fn open(&mut self, identity: Identity, first_page: Page, page_size: Option<usize>) {
        tracing::info!(
            "Opening {} with {} matches",
            identity.riot_id,
            first_page.matches.len()
        );
        self.feed.open(identity, first_page, page_size);
        self.filter = FilterState::default();
        self.range = RangeSelection::default();
    }

    pub fn close(&mut self) {
        self.feed.clear();
        self.filter = FilterState::default();
        self.range = RangeSelection::default();
    }

    pub fn feed(&self) -> &MatchFeed {
        &self.feed
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
    }

    pub fn set_range(&mut self, range: RangeSelection) {
        self.range = range;
    }

    /// Fetches more pages when the range asks for more matches than are loaded.
    pub fn ensure_range<S, F>(&mut self, source: &S, on_page: F) -> usize
    where
        S: MatchSource,
        F: FnMut(usize),
    {
        match self.range.target() {
            Some(target) => self.feed.load_until(target, source, on_page),
            None => 0,
        }
    }

    pub fn load_more<S: MatchSource>(&mut self, source: &S) -> usize {
        self.feed.load_more(source)
    }

    pub fn queue_menu(&self) -> Vec<QueueOption> {
        queue_menu(self.feed.matches())
    }

    pub fn view(&self) -> DashboardView<'_> {
        let puuid = self
            .feed
            .identity()
            .map(|identity| identity.puuid.as_str())
            .unwrap_or_default();
        let matches = self.feed.matches();
        let visible = filter_matches(matches, puuid, &self.filter);
        let visible_summary = visible_summary(&visible, puuid);

        DashboardView {
            range: self.range,
            filter: self.filter,
            summary: summarize(matches, puuid, self.range),
            visible,
            visible_summary,
        }
    }
}
