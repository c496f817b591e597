use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use shared::protocol::UpdateOutcome;
use table_sync::{
    config::{load_settings_from, SETTINGS_FILE},
    memory::{InputField, MemoryDocument, NavigationRecord, RecordingNavigator, SessionHistory},
    FragmentTransport, HttpTransport, Intent, IntentOutcome, LinkClick, LiveDocument, PageHost,
    SearchConfig, TableSession, TableView,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Drives one table page headlessly: loads it, performs a pagination click
/// or a typed search through the partial-update path, and prints the result.
#[derive(Parser, Debug)]
struct Args {
    /// Full page to start from, e.g. http://localhost:5000/jobs
    #[arg(long)]
    page_url: String,
    #[arg(long, default_value = SETTINGS_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Follow a pagination link, relative to the page URL.
    Page { href: String },
    /// Type each query into the search box in turn.
    Search {
        #[arg(required = true)]
        queries: Vec<String>,
        /// Pause between keystroke batches.
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,
    },
}

#[derive(Serialize)]
struct Report {
    outcome: Option<UpdateOutcome>,
    last_applied: u64,
    history: Vec<String>,
    navigations: Vec<String>,
    results_region: Option<String>,
    controls_region: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let settings = load_settings_from(&args.config)?;
    let page_url = Url::parse(&args.page_url)
        .with_context(|| format!("invalid page url: {}", args.page_url))?;
    let target = settings.update_target();

    let transport = Arc::new(HttpTransport::new().context("failed to build http client")?);
    let full_page = transport
        .get(&page_url)
        .await
        .map_err(|err| anyhow!("failed to load {page_url}: {err}"))?;
    let document = Arc::new(
        MemoryDocument::from_html(&full_page, &target)
            .with_context(|| format!("{page_url} does not carry the table regions"))?,
    );
    let history = Arc::new(SessionHistory::new(page_url.clone()));
    let navigator = Arc::new(RecordingNavigator::new());
    info!(url = %page_url, "page loaded");

    let view = TableView::new(
        &settings,
        transport,
        PageHost::new(document.clone(), history.clone(), navigator.clone()),
    );
    let mut events = view.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(event = event.name(), "notification");
        }
    });

    let input = Arc::new(InputField::default());
    let session = TableSession::new(Arc::clone(&view))
        .with_pagination()
        .with_search(SearchConfig::new(input.clone(), &settings));

    let outcome = match args.command {
        Command::Page { href } => {
            match session
                .dispatch(Intent::NavigateToPage(LinkClick::pagination(href)))
                .await
            {
                IntentOutcome::Update(outcome) => Some(outcome),
                _ => None,
            }
        }
        Command::Search {
            queries,
            interval_ms,
        } => {
            let mut pending = Vec::new();
            for (index, query) in queries.into_iter().enumerate() {
                if index > 0 {
                    tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                }
                input.set(query);
                if let IntentOutcome::Scheduled(handle) = session.dispatch(Intent::QueryChanged).await {
                    pending.push(handle);
                }
            }
            for handle in pending {
                handle.await?;
            }
            None
        }
    };
    session.dismiss();

    let report = Report {
        outcome,
        last_applied: view.last_applied().await.0,
        history: history.entries().iter().map(Url::to_string).collect(),
        navigations: navigator
            .records()
            .into_iter()
            .map(|record| match record {
                NavigationRecord::Navigate(url) => url.to_string(),
                NavigationRecord::Reload => "reload".to_string(),
            })
            .collect(),
        results_region: document.region_markup(&target.results),
        controls_region: document.region_markup(&target.controls),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
