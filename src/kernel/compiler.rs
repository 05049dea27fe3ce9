use std::sync::Arc;

use super::action::{Action, Snapshot};
use super::command::Command;
use super::intent::types::{field, Classification, ExtractedFields, Intent, ParseFailure};
use super::lexicon::Lexicon;
use super::time::Instant;
use crate::storage::{record, OrderBy, Predicate, Table};
use crate::transport::{OutboundEvent, UiAction};

/// Moods that also drop a marker on the calendar.
const FLAGGED_MOODS: [&str; 2] = ["sad", "anxious"];

const MEDICINE_USAGE: &str = "add medicine paracetamol 500mg at 9pm on july 5";

/// Pure projection: (Command, Classification, Instant) -> ordered Actions.
/// Never fails; anything it cannot plan becomes a single feedback message.
#[derive(Debug, Clone)]
pub struct ActionCompiler {
    lexicon: Arc<Lexicon>,
}

impl ActionCompiler {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    pub fn compile(&self, command: &Command, classification: &Classification, now: Instant) -> Vec<Action> {
        let fields = match &classification.fields {
            Ok(fields) => fields,
            Err(reason) => return vec![parse_failure(classification.intent, command, reason)],
        };

        self.plan(classification.intent, fields, command, now)
            .unwrap_or_else(|| vec![Action::feedback(format!("❌ Could not understand: \"{}\"", command.raw_text))])
    }

    fn plan(&self, intent: Intent, fields: &ExtractedFields, command: &Command, now: Instant) -> Option<Vec<Action>> {
        let actions = match intent {
            Intent::LogMood => {
                let mood = fields.text(field::MOOD)?.to_string();
                let today = now.iso_date();
                let mut actions = vec![
                    Action::insert(
                        Table::MoodLog,
                        record([("mood", mood.clone()), ("date", today.clone())]),
                        "❌ Error logging mood.",
                    ),
                    Action::feedback(format!(
                        "🧠 Logged your mood: \"{}\" at {}",
                        mood,
                        now.at.format("%Y-%m-%d %H:%M")
                    )),
                ];
                if FLAGGED_MOODS.contains(&mood.trim()) {
                    let title = format!("Felt {}", mood.trim());
                    actions.push(Action::insert(
                        Table::CalendarEvent,
                        record([("title", title.clone()), ("date", today.clone())]),
                        "❌ Error saving calendar event.",
                    ));
                    actions.push(Action::Emit(OutboundEvent::ExecuteAction(UiAction::AddEvent {
                        title,
                        date: today,
                    })));
                }
                actions
            }

            Intent::AddEvent => {
                let title = fields.text(field::TITLE)?.to_string();
                let date = iso(fields.date(field::DATE)?);
                vec![
                    Action::insert(
                        Table::CalendarEvent,
                        record([("title", title.clone()), ("date", date.clone())]),
                        format!("❌ Failed to save event: \"{}\"", command.raw_text),
                    ),
                    Action::Emit(OutboundEvent::ExecuteAction(UiAction::AddEvent {
                        title: title.clone(),
                        date: date.clone(),
                    })),
                    Action::feedback(format!("📅 Added \"{}\" on {}", title, date)),
                    Action::Requery {
                        table: Table::CalendarEvent,
                        filter: None,
                        order: None,
                        then: Snapshot::CalendarEvents,
                        on_failure: "❌ Could not refresh calendar.".to_string(),
                    },
                ]
            }

            Intent::ClearEvents => {
                let date = iso(fields.date(field::DATE)?);
                vec![
                    Action::delete(
                        Table::CalendarEvent,
                        Predicate::equals("date", date.clone()),
                        format!("❌ Failed to clear events on {}", date),
                    ),
                    Action::Emit(OutboundEvent::ExecuteAction(UiAction::ClearEvents { date })),
                ]
            }

            Intent::PlaySong => {
                let song = fields.text(field::SONG)?;
                match self.lexicon.songs.lookup(song) {
                    Some(file) => vec![Action::Emit(OutboundEvent::ExecuteAction(UiAction::PlaySong {
                        file: file.to_string(),
                    }))],
                    None => vec![Action::feedback(format!("❌ Song \"{}\" not found.", song))],
                }
            }

            Intent::MedicineAdd => {
                let name = fields.text(field::NAME)?.to_string();
                let dosage = fields.text(field::DOSAGE).unwrap_or_default().to_string();
                let time = fields.text(field::TIME)?.to_string();
                let date = iso(fields.date(field::DATE)?);
                vec![
                    Action::Emit(OutboundEvent::ExecuteAction(UiAction::MedicineCommand {
                        name: name.clone(),
                        dosage: dosage.clone(),
                        time: time.clone(),
                        date: date.clone(),
                    })),
                    Action::insert(
                        Table::Medicine,
                        record([
                            ("name", name.clone()),
                            ("dosage", dosage),
                            ("time", time),
                            ("date", date),
                        ]),
                        format!("❌ Failed to save medicine \"{}\".", name),
                    ),
                    Action::Requery {
                        table: Table::Medicine,
                        filter: None,
                        order: Some(OrderBy::asc("date")),
                        then: Snapshot::MedicineData,
                        on_failure: "❌ Could not refresh medicines.".to_string(),
                    },
                ]
            }

            Intent::Redirect | Intent::MedicineTrackerOpen => {
                let url = fields.text(field::URL)?.to_string();
                vec![Action::Emit(OutboundEvent::ExecuteAction(UiAction::Redirect { url }))]
            }

            Intent::GoBack => vec![Action::Emit(OutboundEvent::ExecuteAction(UiAction::GoBack))],

            Intent::ToggleSetting => {
                let setting = fields.text(field::SETTING)?.to_string();
                let state = fields.flag(field::STATE)?;
                vec![Action::Emit(OutboundEvent::ExecuteAction(UiAction::ToggleSetting {
                    setting,
                    state,
                }))]
            }

            Intent::WellnessOpen => {
                vec![Action::Emit(OutboundEvent::ExecuteAction(UiAction::ShowExercises))]
            }

            Intent::BreathingStart => {
                let duration = fields.minutes(field::DURATION)?;
                vec![
                    Action::feedback(format!("🌬️ Starting a {}-minute breathing exercise.", duration)),
                    Action::Emit(OutboundEvent::ExecuteAction(UiAction::StartBreathingExercise {
                        duration,
                    })),
                ]
            }

            Intent::HealthCheckin => {
                let area = fields.text(field::AREA)?;
                let suggestion = match area {
                    "knee" => UiAction::SuggestKneeExercises,
                    _ => UiAction::SuggestBackExercises,
                };
                vec![
                    Action::feedback(format!(
                        "💪 Sorry about your {}. Here are some exercises that may help.",
                        area
                    )),
                    Action::Emit(OutboundEvent::ExecuteAction(suggestion)),
                ]
            }

            Intent::ReliefExerciseStart => {
                let exercise = fields.text(field::EXERCISE)?.to_string();
                let duration = fields.minutes(field::DURATION)?;
                vec![
                    Action::feedback(format!(
                        "🧘 Starting {} relief exercise for {} minutes.",
                        exercise, duration
                    )),
                    Action::Emit(OutboundEvent::ExecuteAction(UiAction::StartReliefExercise {
                        exercise,
                        duration,
                    })),
                ]
            }

            Intent::Unknown => {
                vec![Action::feedback(format!("❓ Unknown command: \"{}\"", command.raw_text))]
            }
        };
        Some(actions)
    }
}

fn iso(date: chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_failure(intent: Intent, command: &Command, reason: &ParseFailure) -> Action {
    let raw = &command.raw_text;
    let message = match intent {
        Intent::AddEvent => format!("❌ Could not parse event: \"{}\"", raw),
        Intent::ClearEvents => format!("❌ Could not understand date to clear: \"{}\"", raw),
        Intent::MedicineAdd => format!(
            "❌ Could not parse medicine command: \"{}\" ({}). Try: \"{}\"",
            raw, reason, MEDICINE_USAGE
        ),
        _ => format!("❌ Could not understand: \"{}\" ({})", raw, reason),
    };
    Action::feedback(message)
}
