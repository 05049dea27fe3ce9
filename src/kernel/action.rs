use crate::storage::{OrderBy, Predicate, Record, Table};
use crate::transport::OutboundEvent;

/// Storage mutation carried by a `Persist` action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    Insert(Record),
    Delete(Predicate),
}

/// Which snapshot event a `Requery` turns its rows into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Snapshot {
    /// `calendar-events [{title, date}]`
    CalendarEvents,
    /// `medicine-data [{id, name, dosage, time, date}]`, dates as YYYY-MM-DD
    MedicineData,
    /// `week-moods [{id, mood, date}]`
    WeekMoods,
}

/// Compiler output. Pure data; nothing here touches storage or transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Persist {
        table: Table,
        write: Write,
        /// Feedback sent instead when the write fails.
        on_failure: String,
    },
    Emit(OutboundEvent),
    Requery {
        table: Table,
        filter: Option<Predicate>,
        order: Option<OrderBy>,
        then: Snapshot,
        on_failure: String,
    },
}

impl Action {
    pub fn insert(table: Table, record: Record, on_failure: impl Into<String>) -> Self {
        Action::Persist {
            table,
            write: Write::Insert(record),
            on_failure: on_failure.into(),
        }
    }

    pub fn delete(table: Table, predicate: Predicate, on_failure: impl Into<String>) -> Self {
        Action::Persist {
            table,
            write: Write::Delete(predicate),
            on_failure: on_failure.into(),
        }
    }

    pub fn feedback(message: impl Into<String>) -> Self {
        Action::Emit(OutboundEvent::feedback(message))
    }
}
