//! One table view: the two live regions plus everything that updates them.
//!
//! An update runs in two phases. The fetch is the only suspension point;
//! everything after it (sequence check, swap, history, events, busy state)
//! runs under the apply gate without awaiting, so two updates never
//! interleave their mutations. The busy mark and the stream slot are held by
//! an [`InFlight`] guard, so they are released even when the update future
//! is dropped mid-fetch.

use std::sync::{Arc, Mutex as SyncMutex, MutexGuard};

use shared::{
    domain::{HistoryMode, SequenceNumber, UpdateTarget},
    error::UpdateError,
    protocol::{SyncEvent, UpdateOutcome},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::SyncSettings,
    fetcher::{FragmentFetcher, FragmentTransport, PartialMarker},
    history::HistorySynchronizer,
    host::{BrowserHistory, LiveDocument, Navigator, PageHost},
    sequencer::{RequestContext, RequestSequencer, SequenceClock},
    swapper::RegionSwapper,
};

#[derive(Debug, Default)]
struct ApplyGate {
    last_applied: SequenceNumber,
    navigating: bool,
}

/// One update's share of the busy mark plus its stream slot.
struct InFlight<'a> {
    view: &'a TableView,
    stream: &'a RequestSequencer,
    sequence: SequenceNumber,
    failed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.view.leave_busy();
        self.stream.settle(self.sequence, self.failed);
    }
}

pub struct TableView {
    fetcher: FragmentFetcher,
    swapper: RegionSwapper,
    history_sync: HistorySynchronizer,
    host: PageHost,
    clock: SequenceClock,
    gate: Mutex<ApplyGate>,
    in_flight: SyncMutex<usize>,
    events: broadcast::Sender<SyncEvent>,
}

impl TableView {
    pub fn new(
        settings: &SyncSettings,
        transport: Arc<dyn FragmentTransport>,
        host: PageHost,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        let marker = settings.marker();
        Arc::new(Self {
            fetcher: FragmentFetcher::new(transport, marker.clone())
                .with_retries(settings.fallback_retries),
            swapper: RegionSwapper::new(settings.update_target(), events.clone()),
            history_sync: HistorySynchronizer::new(marker),
            host,
            clock: SequenceClock::new(),
            gate: Mutex::new(ApplyGate::default()),
            in_flight: SyncMutex::new(0),
            events,
        })
    }

    pub fn target(&self) -> &UpdateTarget {
        self.swapper.target()
    }

    pub fn marker(&self) -> &PartialMarker {
        self.fetcher.marker()
    }

    pub fn clock(&self) -> &SequenceClock {
        &self.clock
    }

    pub fn document(&self) -> &dyn LiveDocument {
        self.host.document.as_ref()
    }

    pub fn history(&self) -> &dyn BrowserHistory {
        self.host.history.as_ref()
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.host.navigator.as_ref()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub async fn last_applied(&self) -> SequenceNumber {
        self.gate.lock().await.last_applied
    }

    pub async fn is_navigating(&self) -> bool {
        self.gate.lock().await.navigating
    }

    pub fn has_regions(&self) -> bool {
        self.target()
            .regions()
            .into_iter()
            .all(|id| self.document().has_region(id))
    }

    /// Resolves a link target against the current address.
    pub fn resolve(&self, href: &str) -> Result<Url, url::ParseError> {
        self.history().current_url().join(href)
    }

    /// Back/forward traversal: partial state is never restored from
    /// history, the page reloads instead. `false` when no region is shown.
    pub fn handle_history_traversal(&self) -> bool {
        let shown = self
            .target()
            .regions()
            .into_iter()
            .any(|id| self.document().has_region(id));
        if shown {
            info!("history traversal over a partial view; reloading");
            self.navigator().reload();
        }
        shown
    }

    /// Fetches `target` on `stream` and applies it unless something newer
    /// already reached the page.
    pub async fn run_update(
        &self,
        stream: &RequestSequencer,
        target: Url,
        history_mode: HistoryMode,
    ) -> UpdateOutcome {
        if self.gate.lock().await.navigating {
            return UpdateOutcome::Skipped;
        }
        let canonical = self.marker().strip(&target);
        let Some(context) = stream.begin(canonical, history_mode) else {
            return UpdateOutcome::Skipped;
        };
        debug!(
            stream = %stream.stream(),
            sequence = %context.sequence,
            url = %context.target,
            "update started"
        );

        let mut guard = self.enter_busy(stream, context.sequence);
        let fetched = self.fetcher.fetch(&context.target, &context.cancel).await;

        let outcome = {
            let mut gate = self.gate.lock().await;
            self.settle(&mut gate, &context, fetched)
        };
        guard.failed = matches!(outcome, UpdateOutcome::Failed { .. });
        outcome
    }

    fn in_flight(&self) -> MutexGuard<'_, usize> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn enter_busy<'a>(
        &'a self,
        stream: &'a RequestSequencer,
        sequence: SequenceNumber,
    ) -> InFlight<'a> {
        let mut count = self.in_flight();
        *count += 1;
        if *count == 1 {
            self.set_busy(true);
        }
        InFlight {
            view: self,
            stream,
            sequence,
            failed: false,
        }
    }

    fn leave_busy(&self) {
        let mut count = self.in_flight();
        *count = count.saturating_sub(1);
        // Swapped-in nodes arrive without the busy style; reassert it while
        // other updates are still pending.
        self.set_busy(*count > 0);
    }

    fn set_busy(&self, busy: bool) {
        for id in self.target().regions() {
            self.document().set_busy(id, busy);
        }
    }

    fn settle(
        &self,
        gate: &mut ApplyGate,
        context: &RequestContext,
        fetched: Result<String, UpdateError>,
    ) -> UpdateOutcome {
        let superseded = UpdateOutcome::Superseded {
            sequence: context.sequence,
        };
        if matches!(fetched, Err(UpdateError::Cancelled)) || context.cancel.is_cancelled() {
            debug!(sequence = %context.sequence, "cancelled response discarded");
            return superseded;
        }
        if context.sequence < gate.last_applied {
            debug!(
                sequence = %context.sequence,
                last_applied = %gate.last_applied,
                "stale response discarded"
            );
            return superseded;
        }
        if gate.navigating {
            return superseded;
        }

        let applied = fetched.and_then(|markup| self.swapper.apply(self.document(), &markup));
        match applied {
            Ok(()) => {
                gate.last_applied = context.sequence;
                self.history_sync
                    .sync(self.history(), &context.target, context.history_mode);
                info!(sequence = %context.sequence, url = %context.target, "update applied");
                UpdateOutcome::Applied {
                    sequence: context.sequence,
                }
            }
            Err(err) => self.fall_back(gate, context, err),
        }
    }

    fn fall_back(
        &self,
        gate: &mut ApplyGate,
        context: &RequestContext,
        err: UpdateError,
    ) -> UpdateOutcome {
        let Some(kind) = err.failure_kind() else {
            return UpdateOutcome::Superseded {
                sequence: context.sequence,
            };
        };
        warn!(
            sequence = %context.sequence,
            url = %context.target,
            error = %err,
            "partial update failed; falling back to full navigation"
        );
        gate.navigating = true;
        self.navigator().navigate(&context.target);
        UpdateOutcome::Failed {
            kind,
            url: context.target.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
