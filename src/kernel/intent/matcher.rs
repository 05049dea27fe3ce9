use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{field, Classification, ExtractedFields, FieldValue, Intent, ParseFailure};
use crate::kernel::extract;
use crate::kernel::lexicon::Lexicon;

static MARK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^mark\s+([a-z]+)\s+(\d{1,2})\s+as\s+(.+)$").expect("static pattern")
});

static MEDICINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^add medicine\s+(.+?)\s+at\s+(.+?)\s+on\s+([a-z]+)\s+(\d{1,2})\b")
        .expect("static pattern")
});

static DOSAGE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\d+\s*mg\b").expect("static pattern"));

/// How a rule decides it applies.
#[derive(Debug, Clone, Copy)]
enum Trigger {
    /// Phrase starts with the keyword, followed by a space and something else.
    Phrase(&'static str),
    /// Phrase starts with these characters. "marketing" starts with "mark".
    Prefix(&'static str),
    /// Any of the substrings appears anywhere. Siblings are checked in listed order.
    Contains(&'static [&'static str]),
}

impl Trigger {
    fn fires(&self, text: &str) -> bool {
        match self {
            Trigger::Phrase(kw) => text
                .strip_prefix(kw)
                .and_then(|rest| rest.strip_prefix(' '))
                .is_some_and(|rest| !rest.trim().is_empty()),
            Trigger::Prefix(kw) => text.starts_with(kw),
            Trigger::Contains(words) => words.iter().any(|w| text.contains(w)),
        }
    }
}

/// What a fired rule pulls out of the phrase.
#[derive(Debug, Clone, Copy)]
enum Capture {
    Mood,
    Event,
    Clear,
    Song,
    Medicine,
    Toggle { setting: &'static str, state: bool },
    Url(&'static str),
    Bare,
    Duration,
    Area(&'static str),
    Relief,
}

#[derive(Debug, Clone, Copy)]
struct Rule {
    trigger: Trigger,
    intent: Intent,
    capture: Capture,
}

const fn rule(trigger: Trigger, intent: Intent, capture: Capture) -> Rule {
    Rule { trigger, intent, capture }
}

/// Precedence, highest first. The first rule whose trigger fires wins, so a later
/// rule with an overlapping keyword is shadowed ("music at home" -> songs.html,
/// "player settings" -> PlaySong).
const RULES: &[Rule] = &[
    rule(Trigger::Phrase("i feel"), Intent::LogMood, Capture::Mood),
    rule(Trigger::Prefix("mark"), Intent::AddEvent, Capture::Event),
    rule(Trigger::Prefix("clear"), Intent::ClearEvents, Capture::Clear),
    rule(Trigger::Prefix("play"), Intent::PlaySong, Capture::Song),
    rule(Trigger::Prefix("add medicine"), Intent::MedicineAdd, Capture::Medicine),
    // Settings toggles
    rule(
        Trigger::Contains(&["enable dark"]),
        Intent::ToggleSetting,
        Capture::Toggle { setting: "darkmode", state: true },
    ),
    rule(
        Trigger::Contains(&["disable dark", "light mode"]),
        Intent::ToggleSetting,
        Capture::Toggle { setting: "darkmode", state: false },
    ),
    rule(
        Trigger::Contains(&["enable notification"]),
        Intent::ToggleSetting,
        Capture::Toggle { setting: "notifications", state: true },
    ),
    rule(
        Trigger::Contains(&["disable notification"]),
        Intent::ToggleSetting,
        Capture::Toggle { setting: "notifications", state: false },
    ),
    // Page redirects
    rule(Trigger::Contains(&["mood history"]), Intent::Redirect, Capture::Url("history.html")),
    rule(Trigger::Contains(&["settings"]), Intent::Redirect, Capture::Url("settings.html")),
    rule(Trigger::Contains(&["calendar"]), Intent::Redirect, Capture::Url("calendar.html")),
    rule(Trigger::Contains(&["songs", "music"]), Intent::Redirect, Capture::Url("songs.html")),
    rule(Trigger::Contains(&["game", "dino"]), Intent::Redirect, Capture::Url("games/dino.html")),
    rule(Trigger::Contains(&["home"]), Intent::Redirect, Capture::Url("home.html")),
    rule(
        Trigger::Contains(&["appointment bookings"]),
        Intent::Redirect,
        Capture::Url("appointments.html"),
    ),
    rule(Trigger::Contains(&["go back", "previous page"]), Intent::GoBack, Capture::Bare),
    // Health & wellness
    rule(
        Trigger::Contains(&["medicine tracker", "my medicines"]),
        Intent::MedicineTrackerOpen,
        Capture::Url("medicine.html"),
    ),
    rule(Trigger::Contains(&["wellness", "show exercises"]), Intent::WellnessOpen, Capture::Bare),
    rule(Trigger::Contains(&["breathing", "breathe"]), Intent::BreathingStart, Capture::Duration),
    rule(
        Trigger::Contains(&["back pain", "back hurts"]),
        Intent::HealthCheckin,
        Capture::Area("back"),
    ),
    rule(
        Trigger::Contains(&["knee pain", "knee hurts"]),
        Intent::HealthCheckin,
        Capture::Area("knee"),
    ),
    rule(
        Trigger::Contains(&["relief exercise", "back exercise", "knee exercise"]),
        Intent::ReliefExerciseStart,
        Capture::Relief,
    ),
];

/// Ordered first-match classifier.
#[derive(Debug, Clone)]
pub struct IntentMatcher {
    lexicon: Arc<Lexicon>,
}

impl IntentMatcher {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Classify already-normalized text. `year` fills dates that name no year.
    pub fn classify(&self, text: &str, year: i32) -> Classification {
        for rule in RULES {
            if rule.trigger.fires(text) {
                return match self.capture(rule.capture, text, year) {
                    Ok(fields) => Classification::parsed(rule.intent, fields),
                    Err(reason) => Classification::failed(rule.intent, reason),
                };
            }
        }
        Classification::unknown()
    }

    fn capture(&self, capture: Capture, text: &str, year: i32) -> Result<ExtractedFields, ParseFailure> {
        let months = &self.lexicon.months;

        match capture {
            Capture::Mood => {
                let rest = text.strip_prefix("i feel").unwrap_or_default();
                let mood = extract::free_text(rest, "mood")?;
                Ok(ExtractedFields::new().with(field::MOOD, FieldValue::Text(mood)))
            }
            Capture::Event => {
                let caps = MARK
                    .captures(text)
                    .ok_or(ParseFailure::Shape("mark <month> <day> as <title>"))?;
                let date = extract::date_from_month_day(months, &caps[1], &caps[2], year)?;
                let title = extract::free_text(&caps[3], "title")?;
                Ok(ExtractedFields::new()
                    .with(field::TITLE, FieldValue::Text(title))
                    .with(field::DATE, FieldValue::Date(date)))
            }
            Capture::Clear => {
                // "clear july 5", "clear events on july 5"
                let rest = text.strip_prefix("clear").unwrap_or_default();
                let date = extract::find_month_day(months, rest, year)?;
                Ok(ExtractedFields::new().with(field::DATE, FieldValue::Date(date)))
            }
            Capture::Song => {
                // Empty song name is kept; the compiler reports it as not found.
                let song = text.strip_prefix("play").unwrap_or_default().trim().to_string();
                Ok(ExtractedFields::new().with(field::SONG, FieldValue::Text(song)))
            }
            Capture::Medicine => {
                let caps = MEDICINE.captures(text).ok_or(ParseFailure::Shape(
                    "add medicine <name> [<n>mg] at <time> on <month> <day>",
                ))?;
                let dosage = extract::dosage(&caps[1]);
                let name = extract::free_text(&DOSAGE_TOKEN.replace_all(&caps[1], ""), "medicine name")?;
                let time = extract::free_text(&caps[2], "time")?;
                let date = extract::date_from_month_day(months, &caps[3], &caps[4], year)?;
                Ok(ExtractedFields::new()
                    .with(field::NAME, FieldValue::Text(name))
                    .with(field::DOSAGE, FieldValue::Text(dosage))
                    .with(field::TIME, FieldValue::Text(time))
                    .with(field::DATE, FieldValue::Date(date)))
            }
            Capture::Toggle { setting, state } => Ok(ExtractedFields::new()
                .with(field::SETTING, FieldValue::Text(setting.to_string()))
                .with(field::STATE, FieldValue::Flag(state))),
            Capture::Url(url) => {
                Ok(ExtractedFields::new().with(field::URL, FieldValue::Text(url.to_string())))
            }
            Capture::Bare => Ok(ExtractedFields::new()),
            Capture::Duration => Ok(ExtractedFields::new().with(
                field::DURATION,
                FieldValue::Minutes(extract::duration_or_default(text)),
            )),
            Capture::Area(area) => {
                Ok(ExtractedFields::new().with(field::AREA, FieldValue::Text(area.to_string())))
            }
            Capture::Relief => {
                let exercise = if text.contains("back") {
                    "back"
                } else if text.contains("knee") {
                    "knee"
                } else {
                    "general"
                };
                Ok(ExtractedFields::new()
                    .with(field::EXERCISE, FieldValue::Text(exercise.to_string()))
                    .with(field::DURATION, FieldValue::Minutes(extract::duration_or_default(text))))
            }
        }
    }
}
