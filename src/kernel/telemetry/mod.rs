//! Dispatch telemetry.
//!
//! # PRIVACY INVARIANT
//! Telemetry events carry intent tags, outcomes and counts only.
//! They must **NEVER** contain the phrase, a mood, a title or a medicine name.
//!
//! Telemetry is write-only from the pipeline's point of view: nothing in matching,
//! compiling or dispatching reads it back.

pub mod event;
pub mod metrics;
pub mod recorder;
