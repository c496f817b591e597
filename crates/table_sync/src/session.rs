//! Typed intents routed to the controllers that own one table view.

use std::sync::Arc;

use shared::{domain::HistoryMode, protocol::UpdateOutcome};
use tokio::task::JoinHandle;

use crate::{
    pagination::{ClickDisposition, LinkClick, PaginationController},
    search::{SearchConfig, SearchController},
    view::TableView,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    NavigateToPage(LinkClick),
    QueryChanged,
    RefreshSearch(HistoryMode),
    HistoryTraversed,
    Dismiss,
}

#[derive(Debug)]
pub enum IntentOutcome {
    /// No controller handles the intent; the browser keeps its default.
    Ignored,
    Update(UpdateOutcome),
    /// A debounced update is pending on the returned task.
    Scheduled(JoinHandle<()>),
    Reloaded,
    Dismissed,
}

pub struct TableSession {
    view: Arc<TableView>,
    pagination: Option<PaginationController>,
    search: Option<SearchController>,
}

impl TableSession {
    pub fn new(view: Arc<TableView>) -> Self {
        Self {
            view,
            pagination: None,
            search: None,
        }
    }

    pub fn with_pagination(mut self) -> Self {
        self.pagination = Some(PaginationController::new(Arc::clone(&self.view)));
        self
    }

    pub fn with_search(mut self, config: SearchConfig) -> Self {
        self.search = Some(SearchController::new(Arc::clone(&self.view), config));
        self
    }

    pub fn view(&self) -> &Arc<TableView> {
        &self.view
    }

    pub fn pagination(&self) -> Option<&PaginationController> {
        self.pagination.as_ref()
    }

    pub fn search(&self) -> Option<&SearchController> {
        self.search.as_ref()
    }

    pub async fn dispatch(&self, intent: Intent) -> IntentOutcome {
        match intent {
            Intent::NavigateToPage(click) => {
                let Some(pagination) = &self.pagination else {
                    return IntentOutcome::Ignored;
                };
                match pagination.handle_click(&click).await {
                    ClickDisposition::Ignored => IntentOutcome::Ignored,
                    ClickDisposition::Intercepted(outcome) => IntentOutcome::Update(outcome),
                }
            }
            Intent::QueryChanged => match &self.search {
                Some(search) => IntentOutcome::Scheduled(search.on_input()),
                None => IntentOutcome::Ignored,
            },
            Intent::RefreshSearch(mode) => match &self.search {
                Some(search) => IntentOutcome::Update(search.refresh(mode).await),
                None => IntentOutcome::Ignored,
            },
            Intent::HistoryTraversed => {
                if self.view.handle_history_traversal() {
                    IntentOutcome::Reloaded
                } else {
                    IntentOutcome::Ignored
                }
            }
            Intent::Dismiss => {
                self.dismiss();
                IntentOutcome::Dismissed
            }
        }
    }

    pub fn dismiss(&self) {
        if let Some(pagination) = &self.pagination {
            pagination.destroy();
        }
        if let Some(search) = &self.search {
            search.destroy();
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
