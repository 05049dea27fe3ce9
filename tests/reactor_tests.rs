use std::sync::Arc;
use std::time::Duration;

use attune::kernel::dispatcher::{Acknowledgement, Outcome};
use attune::kernel::event::InboundEvent;
use attune::kernel::intent::types::Intent;
use attune::kernel::lexicon::Lexicon;
use attune::kernel::time::FixedClock;
use attune::storage::{record, InMemoryStorage, Storage, Table};
use attune::transport::{ChannelTransport, OutboundEvent};
use attune::{Interpreter, Reactor};
use tokio::sync::mpsc;

// Monday; the week starts Sunday 2026-10-18
const TODAY: (i32, u32, u32) = (2026, 10, 19);

fn interpreter(storage: Arc<InMemoryStorage>) -> (Arc<Interpreter>, mpsc::Receiver<OutboundEvent>) {
    let (transport, outbound) = ChannelTransport::pair(256);
    let interpreter = Interpreter::new(
        Arc::new(Lexicon::default()),
        storage as Arc<dyn Storage>,
        Arc::new(transport),
        Arc::new(FixedClock::on(TODAY.0, TODAY.1, TODAY.2).unwrap()),
    );
    (Arc::new(interpreter), outbound)
}

fn drain(rx: &mut mpsc::Receiver<OutboundEvent>) -> Vec<OutboundEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[test]
fn test_inbound_line_protocol() {
    assert_eq!(InboundEvent::from_line(""), None);
    assert_eq!(InboundEvent::from_line("   "), None);
    assert_eq!(InboundEvent::from_line("/calendar"), Some(InboundEvent::GetCalendarEvents));
    assert_eq!(InboundEvent::from_line(" /moods "), Some(InboundEvent::GetWeekMoods));
    assert_eq!(
        InboundEvent::from_line("Mark July 5 as dentist"),
        Some(InboundEvent::VoiceCommand("Mark July 5 as dentist".into()))
    );
}

#[tokio::test]
async fn test_week_moods_window_and_order() {
    let storage = Arc::new(InMemoryStorage::new());
    for (mood, date) in [
        ("last week", "2026-10-17"),
        ("sunday", "2026-10-18"),
        ("monday", "2026-10-19"),
        ("tomorrow", "2026-10-20"),
    ] {
        storage
            .insert(Table::MoodLog, record([("mood", mood.to_string()), ("date", date.to_string())]))
            .await
            .unwrap();
    }
    let (interp, mut outbound) = interpreter(Arc::clone(&storage));

    interp.week_moods().await;

    match drain(&mut outbound).as_slice() {
        [OutboundEvent::WeekMoods(rows)] => {
            let moods: Vec<&str> = rows.iter().map(|r| r.mood.as_str()).collect();
            assert_eq!(moods, vec!["monday", "sunday"], "sunday through today, newest first");
            assert_eq!(rows[0].id, 3);
        }
        other => panic!("expected a single week-moods event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_week_moods_same_day_newest_first() {
    let storage = Arc::new(InMemoryStorage::new());
    let (interp, mut outbound) = interpreter(Arc::clone(&storage));

    interp.dispatch("i feel tired").await;
    interp.dispatch("i feel happy").await;
    drain(&mut outbound);

    interp.week_moods().await;

    match drain(&mut outbound).as_slice() {
        [OutboundEvent::WeekMoods(rows)] => {
            let got: Vec<(i64, &str)> = rows.iter().map(|r| (r.id, r.mood.as_str())).collect();
            assert_eq!(got, vec![(2, "happy"), (1, "tired")], "later entry on the same day comes first");
        }
        other => panic!("expected a single week-moods event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_query_sends_empty_snapshot() {
    let storage = Arc::new(InMemoryStorage::new());
    storage.set_failing(Table::CalendarEvent, true).await;
    let (interp, mut outbound) = interpreter(Arc::clone(&storage));

    interp.calendar_events().await;

    assert_eq!(drain(&mut outbound), vec![OutboundEvent::CalendarEvents(vec![])]);
    let stats = interp.telemetry().query_stats;
    assert_eq!(stats.served, 1);
    assert_eq!(stats.failed, 1);
}

#[tokio::test]
async fn test_reactor_acknowledges_every_command() {
    let storage = Arc::new(InMemoryStorage::new());
    let (interp, mut outbound) = interpreter(Arc::clone(&storage));

    let (inbound_tx, inbound_rx) = mpsc::channel(64);
    let (ack_tx, mut ack_rx) = mpsc::channel::<Acknowledgement>(64);
    let reactor = tokio::spawn(Reactor::new(inbound_rx, Arc::clone(&interp)).with_acks(ack_tx).run());

    let phrases = [
        "mark july 1 as a",
        "mark july 2 as b",
        "mark july 3 as c",
        "i feel calm",
        "go back",
        "gibberish",
        "clear nothing",
    ];
    for phrase in phrases {
        inbound_tx
            .send(InboundEvent::VoiceCommand(phrase.to_string()))
            .await
            .unwrap();
    }
    drop(inbound_tx);

    tokio::time::timeout(Duration::from_secs(5), reactor)
        .await
        .expect("reactor drains and stops")
        .unwrap();

    let mut acks = Vec::new();
    while let Ok(ack) = ack_rx.try_recv() {
        acks.push(ack);
    }
    assert_eq!(acks.len(), phrases.len(), "exactly one acknowledgement per command");
    assert_eq!(acks.iter().filter(|a| a.outcome == Outcome::Completed).count(), 5);
    assert_eq!(acks.iter().filter(|a| a.outcome == Outcome::Unknown).count(), 1);
    assert_eq!(acks.iter().filter(|a| a.outcome == Outcome::ParseFailure).count(), 1);

    assert_eq!(storage.len(Table::CalendarEvent).await, 3);
    assert_eq!(storage.len(Table::MoodLog).await, 1);

    // Each command emits at most one feedback; the three adds each confirm once
    let events = drain(&mut outbound);
    let feedback = events.iter().filter(|e| e.is_feedback()).count();
    assert_eq!(feedback, 3 + 1 + 1 + 1);
}

#[tokio::test]
async fn test_reactor_serves_queries() {
    let storage = Arc::new(InMemoryStorage::new());
    storage
        .insert(
            Table::CalendarEvent,
            record([("title", "dentist".to_string()), ("date", "2026-07-05".to_string())]),
        )
        .await
        .unwrap();
    let (interp, mut outbound) = interpreter(Arc::clone(&storage));

    let (inbound_tx, inbound_rx) = mpsc::channel(8);
    let reactor = tokio::spawn(Reactor::new(inbound_rx, interp).run());
    inbound_tx.send(InboundEvent::GetCalendarEvents).await.unwrap();
    drop(inbound_tx);
    reactor.await.unwrap();

    match drain(&mut outbound).as_slice() {
        [OutboundEvent::CalendarEvents(rows)] => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].title, "dentist");
        }
        other => panic!("expected calendar-events, got {:?}", other),
    }
}

#[tokio::test]
async fn test_telemetry_counts_without_user_text() {
    let storage = Arc::new(InMemoryStorage::new());
    let (interp, _outbound) = interpreter(Arc::clone(&storage));

    interp.dispatch("i feel anxious").await;
    interp.dispatch("mark smarch 1 as secret plans").await;
    storage.set_failing(Table::CalendarEvent, true).await;
    interp.dispatch("mark july 5 as dentist").await;
    interp.dispatch("go back").await;

    let snap = interp.telemetry();
    let stats = &snap.command_stats;
    assert_eq!(stats.classified, 4);
    assert_eq!(stats.parse_failures, 1);
    assert_eq!(stats.storage_failures, 1);
    assert_eq!(stats.silent, 1, "go back sends no feedback");
    assert_eq!(stats.skipped_actions, 3);
    assert_eq!(stats.by_intent.get(&Intent::AddEvent), Some(&2));
    assert_eq!(stats.by_outcome.get(&Outcome::Completed), Some(&2));

    let debug = format!("{:?}", snap);
    assert!(!debug.contains("secret"), "telemetry must not carry user text");
    assert!(!debug.contains("anxious"));
}
