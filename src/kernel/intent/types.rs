use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed set of command classifications. Exactly one per command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Intent {
    LogMood,
    AddEvent,
    ClearEvents,
    PlaySong,
    ToggleSetting,
    Redirect,
    GoBack,
    MedicineAdd,
    MedicineTrackerOpen,
    WellnessOpen,
    BreathingStart,
    HealthCheckin,
    ReliefExerciseStart,
    Unknown,
}

/// Typed value captured from a phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    Integer(i64),
    Minutes(u32),
    Flag(bool),
}

/// Field names. Kept as constants so matcher and compiler cannot drift.
pub mod field {
    pub const MOOD: &str = "mood";
    pub const TITLE: &str = "title";
    pub const DATE: &str = "date";
    pub const SONG: &str = "song";
    pub const SETTING: &str = "setting";
    pub const STATE: &str = "state";
    pub const URL: &str = "url";
    pub const NAME: &str = "name";
    pub const DOSAGE: &str = "dosage";
    pub const TIME: &str = "time";
    pub const DURATION: &str = "duration";
    pub const AREA: &str = "area";
    pub const EXERCISE: &str = "exercise";
}

/// Intent-dependent captures. Unused fields are absent, never null-filled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    values: BTreeMap<String, FieldValue>,
}

impl ExtractedFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: FieldValue) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        match self.values.get(name) {
            Some(FieldValue::Date(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn minutes(&self, name: &str) -> Option<u32> {
        match self.values.get(name) {
            Some(FieldValue::Minutes(m)) => Some(*m),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(FieldValue::Flag(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A rule fired but a required sub-field did not parse.
/// Recovered locally; only ever surfaces as a feedback message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("unrecognized month `{0}`")]
    UnknownMonth(String),
    #[error("no such day: {month} {day}")]
    InvalidDay { month: String, day: String },
    #[error("expected `{0}`")]
    Shape(&'static str),
    #[error("missing {0}")]
    Empty(&'static str),
}

/// Matcher output: the winning intent plus its fields, or the reason they failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub intent: Intent,
    pub fields: Result<ExtractedFields, ParseFailure>,
}

impl Classification {
    pub fn parsed(intent: Intent, fields: ExtractedFields) -> Self {
        Self { intent, fields: Ok(fields) }
    }

    pub fn failed(intent: Intent, reason: ParseFailure) -> Self {
        Self { intent, fields: Err(reason) }
    }

    pub fn unknown() -> Self {
        Self::parsed(Intent::Unknown, ExtractedFields::new())
    }

    pub fn is_parse_failure(&self) -> bool {
        self.fields.is_err()
    }
}
