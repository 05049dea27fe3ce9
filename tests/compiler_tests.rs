use std::sync::Arc;

use attune::kernel::action::{Action, Snapshot, Write};
use attune::kernel::command::Command;
use attune::kernel::compiler::ActionCompiler;
use attune::kernel::intent::IntentMatcher;
use attune::kernel::lexicon::Lexicon;
use attune::kernel::time::{Clock, FixedClock, Instant};
use attune::storage::{record, OrderBy, Predicate, Table};
use attune::transport::{OutboundEvent, UiAction};

fn now() -> Instant {
    FixedClock::on(2026, 10, 19).unwrap().now()
}

fn compile(raw: &str) -> Vec<Action> {
    let lexicon = Arc::new(Lexicon::default());
    let matcher = IntentMatcher::new(Arc::clone(&lexicon));
    let compiler = ActionCompiler::new(lexicon);

    let now = now();
    let command = Command::new(raw);
    let classification = matcher.classify(&command.normalized, now.year());
    compiler.compile(&command, &classification, now)
}

fn ui(action: UiAction) -> Action {
    Action::Emit(OutboundEvent::ExecuteAction(action))
}

fn feedback_count(actions: &[Action]) -> usize {
    actions
        .iter()
        .filter(|a| matches!(a, Action::Emit(e) if e.is_feedback()))
        .count()
}

#[test]
fn test_add_event_sequence() {
    let actions = compile("mark july 5 as dentist");
    assert_eq!(
        actions,
        vec![
            Action::insert(
                Table::CalendarEvent,
                record([("title", "dentist".to_string()), ("date", "2026-07-05".to_string())]),
                "❌ Failed to save event: \"mark july 5 as dentist\"",
            ),
            ui(UiAction::AddEvent {
                title: "dentist".into(),
                date: "2026-07-05".into(),
            }),
            Action::feedback("📅 Added \"dentist\" on 2026-07-05"),
            Action::Requery {
                table: Table::CalendarEvent,
                filter: None,
                order: None,
                then: Snapshot::CalendarEvents,
                on_failure: "❌ Could not refresh calendar.".into(),
            },
        ]
    );
}

#[test]
fn test_log_flagged_mood_also_marks_calendar() {
    let actions = compile("i feel anxious");
    assert_eq!(actions.len(), 4);
    assert_eq!(
        actions[0],
        Action::insert(
            Table::MoodLog,
            record([("mood", "anxious".to_string()), ("date", "2026-10-19".to_string())]),
            "❌ Error logging mood.",
        )
    );
    assert_eq!(
        actions[1],
        Action::feedback("🧠 Logged your mood: \"anxious\" at 2026-10-19 12:00")
    );
    assert!(matches!(
        &actions[2],
        Action::Persist { table: Table::CalendarEvent, write: Write::Insert(r), .. }
            if r.get("title").map(String::as_str) == Some("Felt anxious")
    ));
    assert_eq!(
        actions[3],
        ui(UiAction::AddEvent {
            title: "Felt anxious".into(),
            date: "2026-10-19".into(),
        })
    );
}

#[test]
fn test_log_plain_mood() {
    let actions = compile("I feel great");
    assert_eq!(actions.len(), 2, "unflagged moods do not touch the calendar");
    assert!(matches!(&actions[0], Action::Persist { table: Table::MoodLog, .. }));
    assert_eq!(feedback_count(&actions), 1);
}

#[test]
fn test_clear_events_sequence() {
    let actions = compile("clear july 5");
    assert_eq!(
        actions,
        vec![
            Action::delete(
                Table::CalendarEvent,
                Predicate::equals("date", "2026-07-05"),
                "❌ Failed to clear events on 2026-07-05",
            ),
            ui(UiAction::ClearEvents { date: "2026-07-05".into() }),
        ]
    );
}

#[test]
fn test_play_song() {
    assert_eq!(
        compile("play lover"),
        vec![ui(UiAction::PlaySong {
            file: "games/assets/audio/Lover.mp3".into()
        })]
    );
    assert_eq!(
        compile("play unknown-song"),
        vec![Action::feedback("❌ Song \"unknown-song\" not found.")]
    );
    // Prefix match keeps the tail of the word
    assert_eq!(
        compile("player settings"),
        vec![Action::feedback("❌ Song \"er settings\" not found.")]
    );
}

#[test]
fn test_medicine_sequence() {
    let actions = compile("add medicine paracetamol 500mg at 9pm on july 5");
    assert_eq!(actions.len(), 3);
    assert_eq!(
        actions[0],
        ui(UiAction::MedicineCommand {
            name: "paracetamol".into(),
            dosage: "500mg".into(),
            time: "9pm".into(),
            date: "2026-07-05".into(),
        })
    );
    assert!(matches!(&actions[1], Action::Persist { table: Table::Medicine, .. }));
    assert!(matches!(
        &actions[2],
        Action::Requery {
            table: Table::Medicine,
            then: Snapshot::MedicineData,
            order: Some(OrderBy { column: "date", descending: false }),
            ..
        }
    ));
    assert_eq!(feedback_count(&actions), 0);
}

#[test]
fn test_ui_only_intents() {
    assert_eq!(
        compile("enable dark mode"),
        vec![ui(UiAction::ToggleSetting {
            setting: "darkmode".into(),
            state: true
        })]
    );
    assert_eq!(
        compile("open settings"),
        vec![ui(UiAction::Redirect { url: "settings.html".into() })]
    );
    assert_eq!(
        compile("open medicine tracker"),
        vec![ui(UiAction::Redirect { url: "medicine.html".into() })]
    );
    assert_eq!(compile("go back"), vec![ui(UiAction::GoBack)]);
    assert_eq!(compile("show exercises"), vec![ui(UiAction::ShowExercises)]);
}

#[test]
fn test_wellness_sequences() {
    assert_eq!(
        compile("start breathing exercise"),
        vec![
            Action::feedback("🌬️ Starting a 2-minute breathing exercise."),
            ui(UiAction::StartBreathingExercise { duration: 2 }),
        ]
    );

    let actions = compile("my knee hurts");
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[1], ui(UiAction::SuggestKneeExercises));

    let actions = compile("back pain again");
    assert_eq!(actions[1], ui(UiAction::SuggestBackExercises));

    assert_eq!(
        compile("back exercise for 3 minutes"),
        vec![
            Action::feedback("🧘 Starting back relief exercise for 3 minutes."),
            ui(UiAction::StartReliefExercise {
                exercise: "back".into(),
                duration: 3
            }),
        ]
    );
}

#[test]
fn test_unknown_echoes_raw_text() {
    assert_eq!(
        compile("Gibberish"),
        vec![Action::feedback("❓ Unknown command: \"Gibberish\"")]
    );
}

#[test]
fn test_parse_failures_are_single_feedback() {
    let cases = [
        ("mark smarch 5 as dentist", "❌ Could not parse event: \"mark smarch 5 as dentist\""),
        ("clear everything", "❌ Could not understand date to clear: \"clear everything\""),
    ];
    for (phrase, message) in cases {
        assert_eq!(compile(phrase), vec![Action::feedback(message)], "{}", phrase);
    }

    let actions = compile("add medicine paracetamol");
    assert_eq!(actions.len(), 1);
    match &actions[0] {
        Action::Emit(OutboundEvent::Feedback { message }) => {
            assert!(message.starts_with("❌ Could not parse medicine command"));
            assert!(message.contains("Try: \"add medicine paracetamol 500mg at 9pm on july 5\""));
        }
        other => panic!("expected feedback, got {:?}", other),
    }
}

#[test]
fn test_every_plan_has_at_most_one_feedback() {
    let phrases = [
        "i feel sad",
        "mark july 5 as dentist",
        "clear july 5",
        "play lover",
        "add medicine ibuprofen 200mg at 8am on june 2",
        "enable notifications",
        "go back",
        "breathe for 4 minutes",
        "knee pain",
        "relief exercise",
        "mark nowhere",
        "???",
    ];
    for phrase in phrases {
        assert!(feedback_count(&compile(phrase)) <= 1, "{} planned two feedbacks", phrase);
    }
}

#[test]
fn test_compile_is_deterministic() {
    for phrase in ["i feel anxious", "mark july 5 as dentist", "add medicine x at 9 on may 2"] {
        assert_eq!(compile(phrase), compile(phrase), "{}", phrase);
    }
}
