use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::RegionId;

/// The three failure classes that end in a full navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Remote,
    Transport,
    MalformedFragment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentSide {
    /// The fetched markup.
    Response,
    /// The page currently displayed.
    Live,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("region '{region}' missing from {side:?} document")]
pub struct MalformedFragment {
    pub region: RegionId,
    pub side: FragmentSide,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    #[error("request superseded")]
    Cancelled,
    #[error("server answered with status {status}")]
    Remote { status: u16 },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed fragment: {0}")]
    MalformedFragment(#[from] MalformedFragment),
}

impl UpdateError {
    /// `None` for cancellation, which is never surfaced.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Cancelled => None,
            Self::Remote { .. } => Some(FailureKind::Remote),
            Self::Transport(_) => Some(FailureKind::Transport),
            Self::MalformedFragment(_) => Some(FailureKind::MalformedFragment),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Remote { .. } | Self::Transport(_))
    }
}
