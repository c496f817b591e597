use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use shared::error::UpdateError;
use tokio::sync::oneshot;
use url::Url;

use crate::{
    config::SyncSettings,
    fetcher::FragmentTransport,
    host::PageHost,
    memory::{MemoryDocument, RecordingNavigator, SessionHistory},
    view::TableView,
};

pub const START_URL: &str = "http://shop.test/jobs";
pub const INITIAL_RESULTS: &str = r#"<div id="table-content"><p>initial rows</p></div>"#;
pub const INITIAL_CONTROLS: &str = r#"<nav id="pagination-content"><a>1</a></nav>"#;

pub fn url(raw: &str) -> Url {
    Url::parse(raw).expect("url")
}

/// Well-formed fragment whose both regions carry `label`.
pub fn fragment(label: &str) -> String {
    format!(
        r#"<div id="table-content"><table><tbody><tr><td>{label}</td></tr></tbody></table></div>
<nav id="pagination-content"><a class="pagination-btn" href="/jobs?page=2">{label}</a></nav>"#
    )
}

pub fn fragment_without_controls(label: &str) -> String {
    format!(r#"<div id="table-content"><p>{label}</p></div>"#)
}

pub enum Reply {
    Body(String),
    Status(u16),
    Transport(String),
    Gated(oneshot::Receiver<Result<String, UpdateError>>),
}

/// Creates a reply that resolves when the returned sender fires.
pub fn gate() -> (oneshot::Sender<Result<String, UpdateError>>, Reply) {
    let (tx, rx) = oneshot::channel();
    (tx, Reply::Gated(rx))
}

/// In-process transport answering from per-URL scripts, in order.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<Url>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// `request_url` is the URL as sent, partial marker included.
    pub fn script(&self, request_url: &str, reply: Reply) {
        self.replies
            .lock()
            .expect("replies")
            .entry(url(request_url).to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn requests(&self) -> Vec<Url> {
        self.requests.lock().expect("requests").clone()
    }

    pub async fn wait_for_requests(&self, count: usize) {
        while self.requests.lock().expect("requests").len() < count {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl FragmentTransport for ScriptedTransport {
    async fn get(&self, url: &Url) -> Result<String, UpdateError> {
        self.requests.lock().expect("requests").push(url.clone());
        let reply = self
            .replies
            .lock()
            .expect("replies")
            .get_mut(url.as_str())
            .and_then(VecDeque::pop_front);

        match reply {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Status(status)) => Err(UpdateError::Remote { status }),
            Some(Reply::Transport(reason)) => Err(UpdateError::Transport(reason)),
            Some(Reply::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(UpdateError::Transport("gate dropped".into()))),
            None => Err(UpdateError::Remote { status: 404 }),
        }
    }
}

pub struct Harness {
    pub view: Arc<TableView>,
    pub document: Arc<MemoryDocument>,
    pub history: Arc<SessionHistory>,
    pub navigator: Arc<RecordingNavigator>,
    pub transport: Arc<ScriptedTransport>,
    pub settings: SyncSettings,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(SyncSettings::default(), START_URL)
    }

    pub fn with_settings(settings: SyncSettings, start_url: &str) -> Self {
        let document = Arc::new(
            MemoryDocument::new()
                .with_region(settings.results_region.clone(), INITIAL_RESULTS)
                .with_region(settings.controls_region.clone(), INITIAL_CONTROLS),
        );
        let history = Arc::new(SessionHistory::new(url(start_url)));
        let navigator = Arc::new(RecordingNavigator::new());
        let transport = ScriptedTransport::new();
        let view = TableView::new(
            &settings,
            transport.clone(),
            PageHost::new(document.clone(), history.clone(), navigator.clone()),
        );
        Self {
            view,
            document,
            history,
            navigator,
            transport,
            settings,
        }
    }

    pub fn results_markup(&self) -> String {
        self.region_markup(&self.settings.results_region)
    }

    pub fn controls_markup(&self) -> String {
        self.region_markup(&self.settings.controls_region)
    }

    fn region_markup(&self, id: &str) -> String {
        use crate::host::LiveDocument;
        self.document
            .region_markup(&shared::domain::RegionId::new(id))
            .expect("region present")
    }

    pub fn is_busy(&self) -> bool {
        self.view
            .target()
            .regions()
            .into_iter()
            .any(|id| self.document.is_busy(id))
    }
}
