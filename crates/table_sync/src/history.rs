use shared::domain::HistoryMode;
use tracing::debug;
use url::Url;

use crate::{fetcher::PartialMarker, host::BrowserHistory};

/// Writes the canonical page URL to the address bar after a successful swap.
#[derive(Debug, Clone)]
pub struct HistorySynchronizer {
    marker: PartialMarker,
}

impl HistorySynchronizer {
    pub fn new(marker: PartialMarker) -> Self {
        Self { marker }
    }

    pub fn sync(&self, history: &dyn BrowserHistory, url: &Url, mode: HistoryMode) {
        let canonical = self.marker.strip(url);
        match mode {
            HistoryMode::Push => history.push(&canonical),
            HistoryMode::Replace => history.replace(&canonical),
            HistoryMode::Preserve => return,
        }
        debug!(url = %canonical, ?mode, "history synchronized");
    }
}
