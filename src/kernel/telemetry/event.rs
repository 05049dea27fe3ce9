use serde::{Deserialize, Serialize};

use crate::kernel::action::Snapshot;
use crate::kernel::dispatcher::Outcome;
use crate::kernel::intent::types::Intent;

// Allowed: intent tags, outcomes, counts, flags
// Forbidden: any user text

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    Classified {
        intent: Intent,
        parsed: bool,
    },

    Acknowledged {
        intent: Intent,
        outcome: Outcome,
        actions_run: usize,
        actions_skipped: usize,
        feedback_sent: bool,
    },

    QueryServed {
        snapshot: SnapshotKind,
        rows: usize,
        failed: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapshotKind {
    CalendarEvents,
    MedicineData,
    WeekMoods,
}

impl From<Snapshot> for SnapshotKind {
    fn from(snapshot: Snapshot) -> Self {
        match snapshot {
            Snapshot::CalendarEvents => SnapshotKind::CalendarEvents,
            Snapshot::MedicineData => SnapshotKind::MedicineData,
            Snapshot::WeekMoods => SnapshotKind::WeekMoods,
        }
    }
}
