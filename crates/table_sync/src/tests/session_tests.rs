use super::*;
use crate::host::BrowserHistory;
use crate::{
    memory::{InputField, NavigationRecord},
    test_support::{fragment, url, Harness, Reply},
};

fn session(harness: &Harness, input: &Arc<InputField>) -> TableSession {
    TableSession::new(Arc::clone(&harness.view))
        .with_pagination()
        .with_search(SearchConfig::new(input.clone(), &harness.settings))
}

#[tokio::test]
async fn page_intent_reaches_pagination_controller() {
    let harness = Harness::new();
    harness.transport.script(
        "http://shop.test/jobs?page=2&partial=1",
        Reply::Body(fragment("page 2")),
    );
    let input = Arc::new(InputField::default());
    let session = session(&harness, &input);

    let outcome = session
        .dispatch(Intent::NavigateToPage(LinkClick::pagination("?page=2")))
        .await;

    assert!(matches!(
        outcome,
        IntentOutcome::Update(UpdateOutcome::Applied { .. })
    ));
    assert_eq!(
        harness.history.current_url(),
        url("http://shop.test/jobs?page=2")
    );
}

#[tokio::test(start_paused = true)]
async fn query_intent_schedules_debounced_update() {
    let harness = Harness::new();
    harness.transport.script(
        "http://shop.test/jobs?q=trek&partial=1",
        Reply::Body(fragment("trek")),
    );
    let input = Arc::new(InputField::new("trek"));
    let session = session(&harness, &input);

    let IntentOutcome::Scheduled(pending) = session.dispatch(Intent::QueryChanged).await else {
        panic!("expected scheduled update");
    };
    pending.await.expect("join");

    assert!(harness.results_markup().contains("trek"));
}

#[tokio::test]
async fn history_traversal_intent_reloads() {
    let harness = Harness::new();
    let input = Arc::new(InputField::default());
    let session = session(&harness, &input);

    assert!(matches!(
        session.dispatch(Intent::HistoryTraversed).await,
        IntentOutcome::Reloaded
    ));
    assert_eq!(harness.navigator.records(), vec![NavigationRecord::Reload]);
}

#[tokio::test]
async fn intents_without_controller_are_ignored() {
    let harness = Harness::new();
    let session = TableSession::new(Arc::clone(&harness.view));

    assert!(matches!(
        session.dispatch(Intent::QueryChanged).await,
        IntentOutcome::Ignored
    ));
    assert!(matches!(
        session
            .dispatch(Intent::NavigateToPage(LinkClick::pagination("?page=2")))
            .await,
        IntentOutcome::Ignored
    ));
}

#[tokio::test]
async fn dismiss_tears_down_both_controllers() {
    let harness = Harness::new();
    let input = Arc::new(InputField::new("trek"));
    let session = session(&harness, &input);

    assert!(matches!(
        session.dispatch(Intent::Dismiss).await,
        IntentOutcome::Dismissed
    ));
    assert!(matches!(
        session
            .dispatch(Intent::RefreshSearch(HistoryMode::Replace))
            .await,
        IntentOutcome::Update(UpdateOutcome::Skipped)
    ));
    assert!(matches!(
        session
            .dispatch(Intent::NavigateToPage(LinkClick::pagination("?page=2")))
            .await,
        IntentOutcome::Ignored
    ));
    assert!(harness.transport.requests().is_empty());
}
