//! Per-stream request bookkeeping.
//!
//! Every update draws a number from the [`SequenceClock`] of its table view
//! and becomes the single outstanding request of its stream, cancelling the
//! previous one. Cancellation is best-effort; the applied-sequence check in
//! [`crate::view::TableView`] is what keeps stale responses off the page.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard,
};

use shared::domain::{ControllerPhase, HistoryMode, SequenceNumber, StreamKind};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

/// Monotonic sequence source shared by all streams of one table view.
#[derive(Debug, Default, Clone)]
pub struct SequenceClock {
    last: Arc<AtomicU64>,
}

impl SequenceClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next sequence number, starting at 1.
    pub fn next(&self) -> SequenceNumber {
        SequenceNumber(self.last.fetch_add(1, Ordering::AcqRel).wrapping_add(1))
    }

    pub fn last_issued(&self) -> SequenceNumber {
        SequenceNumber(self.last.load(Ordering::Acquire))
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Canonical URL, without the partial marker.
    pub target: Url,
    pub sequence: SequenceNumber,
    pub cancel: CancellationToken,
    pub history_mode: HistoryMode,
}

#[derive(Debug, Default)]
struct StreamState {
    outstanding: Option<RequestContext>,
    phase: ControllerPhase,
    closed: bool,
}

#[derive(Debug)]
pub struct RequestSequencer {
    stream: StreamKind,
    clock: SequenceClock,
    state: Mutex<StreamState>,
}

impl RequestSequencer {
    pub fn new(stream: StreamKind, clock: SequenceClock) -> Self {
        Self {
            stream,
            clock,
            state: Mutex::new(StreamState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, StreamState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn stream(&self) -> StreamKind {
        self.stream
    }

    pub fn phase(&self) -> ControllerPhase {
        self.state().phase
    }

    pub fn outstanding_sequence(&self) -> Option<SequenceNumber> {
        self.state().outstanding.as_ref().map(|ctx| ctx.sequence)
    }

    /// Registers a new request, superseding the outstanding one. `None` once
    /// the stream is closed or has fallen back to navigation.
    pub fn begin(&self, target: Url, history_mode: HistoryMode) -> Option<RequestContext> {
        let mut state = self.state();
        if state.closed || state.phase == ControllerPhase::Navigating {
            return None;
        }

        let sequence = self.clock.next();
        if let Some(previous) = state.outstanding.take() {
            previous.cancel.cancel();
            debug!(
                stream = %self.stream,
                superseded = %previous.sequence,
                by = %sequence,
                "request superseded"
            );
        }

        let context = RequestContext {
            target,
            sequence,
            cancel: CancellationToken::new(),
            history_mode,
        };
        state.outstanding = Some(context.clone());
        state.phase = ControllerPhase::Loading;
        Some(context)
    }

    /// Records that the request `sequence` finished. A superseded request
    /// leaves the stream in `Loading` for its successor.
    pub fn settle(&self, sequence: SequenceNumber, navigating: bool) {
        let mut state = self.state();
        if navigating {
            state.phase = ControllerPhase::Navigating;
        }
        let is_current = state
            .outstanding
            .as_ref()
            .is_some_and(|ctx| ctx.sequence == sequence);
        if is_current {
            state.outstanding = None;
            if state.phase == ControllerPhase::Loading {
                state.phase = ControllerPhase::Idle;
            }
        }
    }

    /// Cancels the outstanding request and refuses new ones.
    pub fn close(&self) {
        let mut state = self.state();
        state.closed = true;
        if let Some(context) = state.outstanding.take() {
            context.cancel.cancel();
        }
        if state.phase == ControllerPhase::Loading {
            state.phase = ControllerPhase::Idle;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
}

#[cfg(test)]
#[path = "tests/sequencer_tests.rs"]
mod tests;
