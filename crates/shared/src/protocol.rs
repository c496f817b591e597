use serde::{Deserialize, Serialize};

use crate::{domain::SequenceNumber, error::FailureKind};

pub const DEFAULT_RESULTS_REGION: &str = "table-content";
pub const DEFAULT_CONTROLS_REGION: &str = "pagination-content";
pub const DEFAULT_PARTIAL_PARAM: &str = "partial";
pub const DEFAULT_PARTIAL_VALUE: &str = "1";
pub const DEFAULT_QUERY_PARAM: &str = "q";
/// Dropped from the search target so a new query restarts at the first page.
pub const PAGE_PARAM: &str = "page";
pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";
pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

/// Process-wide notifications emitted after both regions were replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncEvent {
    #[serde(rename = "table:updated")]
    TableUpdated,
    #[serde(rename = "pagination:updated")]
    PaginationUpdated,
}

impl SyncEvent {
    pub fn name(self) -> &'static str {
        match self {
            Self::TableUpdated => "table:updated",
            Self::PaginationUpdated => "pagination:updated",
        }
    }
}

/// Result of one remote update attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UpdateOutcome {
    Applied { sequence: SequenceNumber },
    /// Cancelled, or older than what is already on screen.
    Superseded { sequence: SequenceNumber },
    /// Never sent: query below the minimum length, or the controller is gone.
    Skipped,
    /// A full navigation to `url` was issued instead.
    Failed { kind: FailureKind, url: String },
}

impl UpdateOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}
