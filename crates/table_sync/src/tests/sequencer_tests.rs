use super::*;
use crate::test_support::url;

#[test]
fn clock_is_shared_and_monotonic() {
    let clock = SequenceClock::new();
    let pagination = RequestSequencer::new(StreamKind::Pagination, clock.clone());
    let search = RequestSequencer::new(StreamKind::Search, clock.clone());

    let a = pagination
        .begin(url("http://shop.test/jobs?page=2"), HistoryMode::Push)
        .expect("a");
    let b = search
        .begin(url("http://shop.test/jobs?q=ana"), HistoryMode::Replace)
        .expect("b");
    let c = pagination
        .begin(url("http://shop.test/jobs?page=3"), HistoryMode::Push)
        .expect("c");

    assert_eq!(a.sequence, SequenceNumber(1));
    assert_eq!(b.sequence, SequenceNumber(2));
    assert_eq!(c.sequence, SequenceNumber(3));
    assert_eq!(clock.last_issued(), SequenceNumber(3));
}

#[test]
fn begin_cancels_previous_request_of_same_stream() {
    let sequencer = RequestSequencer::new(StreamKind::Search, SequenceClock::new());

    let first = sequencer
        .begin(url("http://shop.test/jobs?q=an"), HistoryMode::Replace)
        .expect("first");
    let second = sequencer
        .begin(url("http://shop.test/jobs?q=ana"), HistoryMode::Replace)
        .expect("second");

    assert!(first.cancel.is_cancelled());
    assert!(!second.cancel.is_cancelled());
    assert_eq!(sequencer.outstanding_sequence(), Some(second.sequence));
}

#[test]
fn other_stream_is_not_cancelled() {
    let clock = SequenceClock::new();
    let pagination = RequestSequencer::new(StreamKind::Pagination, clock.clone());
    let search = RequestSequencer::new(StreamKind::Search, clock);

    let click = pagination
        .begin(url("http://shop.test/jobs?page=2"), HistoryMode::Push)
        .expect("click");
    search
        .begin(url("http://shop.test/jobs?q=ana"), HistoryMode::Replace)
        .expect("search");

    assert!(!click.cancel.is_cancelled());
}

#[test]
fn settling_superseded_request_keeps_loading() {
    let sequencer = RequestSequencer::new(StreamKind::Pagination, SequenceClock::new());
    let first = sequencer
        .begin(url("http://shop.test/jobs?page=2"), HistoryMode::Push)
        .expect("first");
    let second = sequencer
        .begin(url("http://shop.test/jobs?page=3"), HistoryMode::Push)
        .expect("second");

    sequencer.settle(first.sequence, false);
    assert_eq!(sequencer.phase(), ControllerPhase::Loading);

    sequencer.settle(second.sequence, false);
    assert_eq!(sequencer.phase(), ControllerPhase::Idle);
    assert_eq!(sequencer.outstanding_sequence(), None);
}

#[test]
fn navigating_is_terminal() {
    let sequencer = RequestSequencer::new(StreamKind::Pagination, SequenceClock::new());
    let request = sequencer
        .begin(url("http://shop.test/jobs?page=2"), HistoryMode::Push)
        .expect("request");

    sequencer.settle(request.sequence, true);

    assert_eq!(sequencer.phase(), ControllerPhase::Navigating);
    assert!(sequencer
        .begin(url("http://shop.test/jobs?page=3"), HistoryMode::Push)
        .is_none());
}

#[test]
fn close_cancels_and_refuses() {
    let sequencer = RequestSequencer::new(StreamKind::Search, SequenceClock::new());
    let request = sequencer
        .begin(url("http://shop.test/jobs?q=ana"), HistoryMode::Replace)
        .expect("request");

    sequencer.close();

    assert!(request.cancel.is_cancelled());
    assert!(sequencer.is_closed());
    assert_eq!(sequencer.phase(), ControllerPhase::Idle);
    assert!(sequencer
        .begin(url("http://shop.test/jobs?q=anab"), HistoryMode::Replace)
        .is_none());
}
