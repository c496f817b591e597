use scraper::{ElementRef, Html};
use shared::{
    domain::{RegionId, UpdateTarget},
    error::{FragmentSide, MalformedFragment, UpdateError},
    protocol::SyncEvent,
};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::host::{LiveDocument, RegionNode};

/// Locates both regions of `target` in `markup`, results first.
pub fn parse_regions(markup: &str, target: &UpdateTarget) -> Result<[RegionNode; 2], MalformedFragment> {
    let html = Html::parse_document(markup);
    let results = find_region(&html, &target.results)?;
    let controls = find_region(&html, &target.controls)?;
    Ok([results, controls])
}

fn find_region(html: &Html, id: &RegionId) -> Result<RegionNode, MalformedFragment> {
    let mut matches = html
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().id() == Some(id.as_str()));

    let Some(element) = matches.next() else {
        return Err(MalformedFragment {
            region: id.clone(),
            side: FragmentSide::Response,
        });
    };
    if matches.next().is_some() {
        warn!(region = %id, "fragment repeats a region id; using the first match");
    }

    Ok(RegionNode {
        id: id.clone(),
        markup: element.html(),
    })
}

/// Replaces both live regions with the ones parsed from a fragment.
pub struct RegionSwapper {
    target: UpdateTarget,
    events: broadcast::Sender<SyncEvent>,
}

impl RegionSwapper {
    pub fn new(target: UpdateTarget, events: broadcast::Sender<SyncEvent>) -> Self {
        Self { target, events }
    }

    pub fn target(&self) -> &UpdateTarget {
        &self.target
    }

    /// All-or-nothing: every region is checked on both sides before the
    /// first replacement, so a failure leaves the live document untouched.
    pub fn apply(&self, document: &dyn LiveDocument, markup: &str) -> Result<(), UpdateError> {
        let nodes = parse_regions(markup, &self.target)?;

        if let Some(missing) = nodes.iter().find(|node| !document.has_region(&node.id)) {
            return Err(MalformedFragment {
                region: missing.id.clone(),
                side: FragmentSide::Live,
            }
            .into());
        }

        for node in nodes {
            document.replace_region(node);
        }
        debug!(
            results = %self.target.results,
            controls = %self.target.controls,
            "regions swapped"
        );

        let _ = self.events.send(SyncEvent::TableUpdated);
        let _ = self.events.send(SyncEvent::PaginationUpdated);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/swapper_tests.rs"]
mod tests;
