//! Transport collaborator: the outbound side of the socket.
//!
//! Names and payload shapes are a wire contract with the browser UI and must not drift.

pub mod channel;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use channel::ChannelTransport;

/// UI action carried by an `execute-action` event as `{type, payload}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UiAction {
    AddEvent { title: String, date: String },
    ClearEvents { date: String },
    PlaySong { file: String },
    ToggleSetting { setting: String, state: bool },
    Redirect { url: String },
    GoBack,
    StartBreathingExercise { duration: u32 },
    ShowExercises,
    SuggestBackExercises,
    SuggestKneeExercises,
    StartReliefExercise { exercise: String, duration: u32 },
    MedicineCommand {
        name: String,
        dosage: String,
        time: String,
        date: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub title: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicineEntry {
    pub id: i64,
    pub name: String,
    pub dosage: String,
    pub time: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: i64,
    pub mood: String,
    pub date: String,
}

/// Everything the interpreter can push to the caller.
/// Serializes as `{"event": <name>, "payload": <payload>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum OutboundEvent {
    Feedback { message: String },
    ExecuteAction(UiAction),
    CalendarEvents(Vec<CalendarEntry>),
    MedicineData(Vec<MedicineEntry>),
    WeekMoods(Vec<MoodEntry>),
}

impl OutboundEvent {
    pub fn feedback(message: impl Into<String>) -> Self {
        OutboundEvent::Feedback { message: message.into() }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::Feedback { .. } => "feedback",
            OutboundEvent::ExecuteAction(_) => "execute-action",
            OutboundEvent::CalendarEvents(_) => "calendar-events",
            OutboundEvent::MedicineData(_) => "medicine-data",
            OutboundEvent::WeekMoods(_) => "week-moods",
        }
    }

    pub fn payload(&self) -> Value {
        let value = match self {
            OutboundEvent::Feedback { message } => Ok(serde_json::json!({ "message": message })),
            OutboundEvent::ExecuteAction(action) => serde_json::to_value(action),
            OutboundEvent::CalendarEvents(rows) => serde_json::to_value(rows),
            OutboundEvent::MedicineData(rows) => serde_json::to_value(rows),
            OutboundEvent::WeekMoods(rows) => serde_json::to_value(rows),
        };
        value.unwrap_or_default()
    }

    pub fn is_feedback(&self) -> bool {
        matches!(self, OutboundEvent::Feedback { .. })
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// At-most-once, fire-and-forget. Delivery failures are logged, never returned.
    async fn emit(&self, event: OutboundEvent);
}
