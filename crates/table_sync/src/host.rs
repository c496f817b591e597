//! Seams between the update machinery and the page it runs in.
//!
//! A browser build backs these with the DOM, `history` and `location`; the
//! in-memory implementations in [`crate::memory`] back tests and the CLI.
//! All methods are synchronous: mutation only happens in the synchronous
//! phase that follows a completed fetch.

use std::sync::Arc;

use shared::domain::RegionId;
use url::Url;

/// A detached region subtree, serialized as its outer markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionNode {
    pub id: RegionId,
    pub markup: String,
}

pub trait LiveDocument: Send + Sync {
    fn has_region(&self, id: &RegionId) -> bool;
    fn region_markup(&self, id: &RegionId) -> Option<String>;
    /// Replaces the whole live node carrying `node.id`. Callers check
    /// [`LiveDocument::has_region`] first; a missing region is a no-op.
    fn replace_region(&self, node: RegionNode);
    fn set_busy(&self, id: &RegionId, busy: bool);
}

pub trait BrowserHistory: Send + Sync {
    fn current_url(&self) -> Url;
    fn push(&self, url: &Url);
    fn replace(&self, url: &Url);
}

pub trait Navigator: Send + Sync {
    /// Full page load of `url`.
    fn navigate(&self, url: &Url);
    fn reload(&self);
}

pub trait SearchInput: Send + Sync {
    fn value(&self) -> String;
}

/// The page-level collaborators one table view needs.
#[derive(Clone)]
pub struct PageHost {
    pub document: Arc<dyn LiveDocument>,
    pub history: Arc<dyn BrowserHistory>,
    pub navigator: Arc<dyn Navigator>,
}

impl PageHost {
    pub fn new(
        document: Arc<dyn LiveDocument>,
        history: Arc<dyn BrowserHistory>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            document,
            history,
            navigator,
        }
    }
}
