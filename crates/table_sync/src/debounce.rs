use std::{
    future::Future,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Trailing-edge debounce: only the last of a burst of calls runs, `delay`
/// after that call.
#[derive(Debug)]
pub struct DebounceScheduler {
    delay: Duration,
    pending: Mutex<Option<CancellationToken>>,
}

impl DebounceScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    fn pending(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Restarts the wait. A task whose timer already fired is not affected;
    /// it is past the only point where it can be dropped.
    pub fn schedule<F>(&self, task: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        if let Some(previous) = self.pending().replace(token.clone()) {
            previous.cancel();
        }

        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            task.await;
        })
    }

    pub fn cancel(&self) {
        if let Some(pending) = self.pending().take() {
            pending.cancel();
        }
    }
}
