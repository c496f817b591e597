use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(SequenceNumber);

/// Identifier of one swappable zone, matched against the element `id` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(pub String);

impl RegionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two regions that make up one table view. Exactly one exists per page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpdateTarget {
    pub results: RegionId,
    pub controls: RegionId,
}

impl UpdateTarget {
    pub fn new(results: impl Into<String>, controls: impl Into<String>) -> Self {
        Self {
            results: RegionId::new(results),
            controls: RegionId::new(controls),
        }
    }

    /// Regions in replacement order.
    pub fn regions(&self) -> [&RegionId; 2] {
        [&self.results, &self.controls]
    }
}

impl Default for UpdateTarget {
    fn default() -> Self {
        Self::new(
            crate::protocol::DEFAULT_RESULTS_REGION,
            crate::protocol::DEFAULT_CONTROLS_REGION,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMode {
    /// New navigable entry; discrete navigation such as a page link.
    Push,
    /// Rewrite the current entry; incremental refinement such as typing.
    #[default]
    Replace,
    /// Leave the address bar untouched.
    Preserve,
}

/// Which interaction surface a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    Pagination,
    Search,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pagination => f.write_str("pagination"),
            Self::Search => f.write_str("search"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerPhase {
    #[default]
    Idle,
    Loading,
    /// Fallback navigation was issued; the page is about to unload.
    Navigating,
}
