//! Partial-page synchronization for paginated, searchable tables.
//!
//! A [`TableView`] owns the two live regions of a table page (results and
//! pagination controls). [`PaginationController`] and [`SearchController`]
//! turn clicks and keystrokes into fragment requests; responses replace both
//! regions at once, in sequence order, or fall back to a full navigation.

pub mod config;
pub mod debounce;
pub mod fetcher;
pub mod history;
pub mod host;
pub mod memory;
pub mod pagination;
pub mod query;
pub mod search;
pub mod sequencer;
pub mod session;
pub mod swapper;
pub mod view;

pub use config::{load_settings, SyncSettings};
pub use fetcher::{FragmentFetcher, FragmentTransport, HttpTransport, PartialMarker};
pub use host::{BrowserHistory, LiveDocument, Navigator, PageHost, RegionNode, SearchInput};
pub use pagination::{ClickDisposition, LinkClick, Modifiers, PaginationController};
pub use query::QueryParams;
pub use search::{SearchConfig, SearchController, SearchQueryState};
pub use session::{Intent, IntentOutcome, TableSession};
pub use view::TableView;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
