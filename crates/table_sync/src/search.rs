//! Live table search: local pre-filtering on every keystroke plus a
//! debounced remote refresh of the regions.

use std::{fmt, sync::Arc, time::Duration};

use shared::{
    domain::{ControllerPhase, HistoryMode, StreamKind},
    protocol::{UpdateOutcome, PAGE_PARAM},
};
use tokio::task::JoinHandle;
use tracing::debug;
use url::Url;

use crate::{
    config::SyncSettings, debounce::DebounceScheduler, host::SearchInput, query::QueryParams,
    sequencer::RequestSequencer, view::TableView,
};

pub type LocalFilter = Arc<dyn Fn(&str) + Send + Sync>;
pub type ParamCollector = Arc<dyn Fn(&mut QueryParams) + Send + Sync>;
pub type CompletionHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
pub struct SearchConfig {
    pub input: Arc<dyn SearchInput>,
    pub query_param: String,
    pub debounce: Duration,
    pub min_chars: usize,
    pub local_filter: Option<LocalFilter>,
    pub collect_params: Option<ParamCollector>,
    pub on_updated: Option<CompletionHook>,
}

impl SearchConfig {
    pub fn new(input: Arc<dyn SearchInput>, settings: &SyncSettings) -> Self {
        Self {
            input,
            query_param: settings.query_param.clone(),
            debounce: settings.search_debounce(),
            min_chars: settings.search_min_chars,
            local_filter: None,
            collect_params: None,
            on_updated: None,
        }
    }

    pub fn with_local_filter(mut self, filter: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.local_filter = Some(Arc::new(filter));
        self
    }

    pub fn with_param_collector(
        mut self,
        collect: impl Fn(&mut QueryParams) + Send + Sync + 'static,
    ) -> Self {
        self.collect_params = Some(Arc::new(collect));
        self
    }

    pub fn with_completion(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_updated = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("query_param", &self.query_param)
            .field("debounce", &self.debounce)
            .field("min_chars", &self.min_chars)
            .field("local_filter", &self.local_filter.is_some())
            .field("collect_params", &self.collect_params.is_some())
            .field("on_updated", &self.on_updated.is_some())
            .finish()
    }
}

/// Query state read fresh from the input and the address bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQueryState {
    pub query: String,
    pub params: QueryParams,
}

#[derive(Clone)]
pub struct SearchController {
    inner: Arc<SearchInner>,
}

struct SearchInner {
    view: Arc<TableView>,
    config: SearchConfig,
    sequencer: RequestSequencer,
    debounce: DebounceScheduler,
}

impl SearchController {
    pub fn new(view: Arc<TableView>, config: SearchConfig) -> Self {
        let sequencer = RequestSequencer::new(StreamKind::Search, view.clock().clone());
        let debounce = DebounceScheduler::new(config.debounce);
        Self {
            inner: Arc::new(SearchInner {
                view,
                config,
                sequencer,
                debounce,
            }),
        }
    }

    pub fn phase(&self) -> ControllerPhase {
        self.inner.sequencer.phase()
    }

    /// Keystroke handler.
    pub fn on_input(&self) -> JoinHandle<()> {
        self.apply_local();
        self.schedule_remote_update(HistoryMode::Replace)
    }

    pub fn schedule_remote_update(&self, history_mode: HistoryMode) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        self.inner.debounce.schedule(async move {
            inner.remote_update(history_mode).await;
        })
    }

    /// Immediate update, bypassing the debounce.
    pub async fn refresh(&self, history_mode: HistoryMode) -> UpdateOutcome {
        self.inner.remote_update(history_mode).await
    }

    pub fn apply_local(&self) {
        if let Some(filter) = &self.inner.config.local_filter {
            filter(self.inner.config.input.value().trim());
        }
    }

    pub fn query_state(&self) -> SearchQueryState {
        self.inner.query_state()
    }

    /// Drops the pending timer and the outstanding request; later input is ignored.
    pub fn destroy(&self) {
        self.inner.debounce.cancel();
        self.inner.sequencer.close();
    }
}

impl SearchInner {
    fn query_state(&self) -> SearchQueryState {
        let query = self.config.input.value().trim().to_string();
        let mut params = QueryParams::from_url(&self.view.history().current_url());

        if query.is_empty() {
            params.remove(&self.config.query_param);
        } else {
            params.set(&self.config.query_param, query.clone());
        }
        if let Some(collect) = &self.config.collect_params {
            collect(&mut params);
        }
        params.remove(PAGE_PARAM);

        SearchQueryState { query, params }
    }

    fn target_url(&self, state: &SearchQueryState) -> Url {
        state.params.apply_to(&self.view.history().current_url())
    }

    async fn remote_update(&self, history_mode: HistoryMode) -> UpdateOutcome {
        if self.sequencer.is_closed() {
            return UpdateOutcome::Skipped;
        }

        let state = self.query_state();
        let length = state.query.chars().count();
        if length > 0 && length < self.config.min_chars {
            debug!(length, min_chars = self.config.min_chars, "query too short; not sent");
            return UpdateOutcome::Skipped;
        }

        let target = self.target_url(&state);
        let outcome = self
            .view
            .run_update(&self.sequencer, target, history_mode)
            .await;

        if outcome.is_applied() {
            if let Some(hook) = &self.config.on_updated {
                hook();
            }
        }
        outcome
    }
}

#[cfg(test)]
#[path = "tests/search_tests.rs"]
mod tests;
