use std::sync::Arc;

use shared::{
    domain::{ControllerPhase, HistoryMode, StreamKind},
    protocol::UpdateOutcome,
};
use tracing::debug;
use url::Url;

use crate::{sequencer::RequestSequencer, view::TableView};

pub const PRIMARY_BUTTON: u16 = 0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub meta: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn any(self) -> bool {
        self.meta || self.ctrl || self.shift || self.alt
    }
}

/// A click as seen by the document-level listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkClick {
    pub href: String,
    pub button: u16,
    pub modifiers: Modifiers,
    pub default_prevented: bool,
    /// Whether the closest anchor is a pagination link.
    pub pagination_link: bool,
}

impl LinkClick {
    /// Plain left click on a pagination link.
    pub fn pagination(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            button: PRIMARY_BUTTON,
            modifiers: Modifiers::default(),
            default_prevented: false,
            pagination_link: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickDisposition {
    /// Left to the browser's default handling.
    Ignored,
    Intercepted(UpdateOutcome),
}

pub struct PaginationController {
    view: Arc<TableView>,
    sequencer: RequestSequencer,
}

impl PaginationController {
    pub fn new(view: Arc<TableView>) -> Self {
        let sequencer = RequestSequencer::new(StreamKind::Pagination, view.clock().clone());
        Self { view, sequencer }
    }

    pub fn phase(&self) -> ControllerPhase {
        self.sequencer.phase()
    }

    /// Whether the listener should prevent the default action for `click`.
    pub fn intercepts(&self, click: &LinkClick) -> bool {
        !self.sequencer.is_closed()
            && click.pagination_link
            && !click.default_prevented
            && click.button == PRIMARY_BUTTON
            && !click.modifiers.any()
            && self.view.has_regions()
    }

    pub async fn handle_click(&self, click: &LinkClick) -> ClickDisposition {
        if !self.intercepts(click) {
            return ClickDisposition::Ignored;
        }
        let url = match self.view.resolve(&click.href) {
            Ok(url) => url,
            Err(err) => {
                debug!(href = %click.href, error = %err, "unresolvable pagination link");
                return ClickDisposition::Ignored;
            }
        };
        ClickDisposition::Intercepted(self.go_to(url).await)
    }

    /// Loads the page at `url` as a discrete navigation.
    pub async fn go_to(&self, url: Url) -> UpdateOutcome {
        self.view
            .run_update(&self.sequencer, url, HistoryMode::Push)
            .await
    }

    pub fn destroy(&self) {
        self.sequencer.close();
    }
}

#[cfg(test)]
#[path = "tests/pagination_tests.rs"]
mod tests;
