use std::sync::Arc;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::action::{Action, Snapshot, Write};
use super::command::CommandId;
use super::intent::types::Intent;
use crate::storage::{OrderBy, Predicate, Row, Storage, StorageError, Table};
use crate::transport::{CalendarEntry, MedicineEntry, MoodEntry, OutboundEvent, Transport};

/// Terminal state of one dispatched command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Completed,
    ParseFailure,
    StorageFailure,
    Unknown,
}

/// Exactly one per command, returned to whoever submitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub command_id: CommandId,
    pub intent: Intent,
    pub outcome: Outcome,
    pub actions_run: usize,
    pub actions_skipped: usize,
    pub feedback_sent: bool,
}

/// Effect layer. Runs compiled actions against storage and transport, in order.
///
/// **ACK LAW**: at most one `feedback` event leaves here per command. A storage failure
/// ends the command: the rest of its actions depend on that write, so they are skipped
/// and the failing action's own message goes out instead (unless feedback already did).
#[derive(Clone)]
pub struct Dispatcher {
    storage: Arc<dyn Storage>,
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    pub fn new(storage: Arc<dyn Storage>, transport: Arc<dyn Transport>) -> Self {
        Self { storage, transport }
    }

    /// `initial` is the outcome the command ends with if nothing fails
    /// (`ParseFailure` and `Unknown` are decided before dispatch).
    pub async fn dispatch(
        &self,
        command_id: CommandId,
        intent: Intent,
        initial: Outcome,
        actions: Vec<Action>,
    ) -> Acknowledgement {
        let total = actions.len();
        let mut ack = Acknowledgement {
            command_id,
            intent,
            outcome: initial,
            actions_run: 0,
            actions_skipped: 0,
            feedback_sent: false,
        };

        for action in actions {
            match self.execute(action, &mut ack.feedback_sent).await {
                Ok(()) => ack.actions_run += 1,
                Err(failure) => {
                    warn!(command = %command_id, ?intent, error = %failure.error, "Storage step failed");
                    ack.actions_run += 1;
                    ack.actions_skipped = total - ack.actions_run;
                    ack.outcome = Outcome::StorageFailure;
                    if !ack.feedback_sent {
                        self.transport.emit(OutboundEvent::feedback(failure.message)).await;
                        ack.feedback_sent = true;
                    }
                    break;
                }
            }
        }

        ack
    }

    /// Read-only snapshot push. On failure the caller still receives an empty list.
    pub async fn query(
        &self,
        table: Table,
        filter: Option<Predicate>,
        order: Option<OrderBy>,
        then: Snapshot,
    ) -> Result<usize, StorageError> {
        match self.storage.select_all(table, filter, order).await {
            Ok(rows) => {
                let count = rows.len();
                self.transport.emit(snapshot(then, rows)).await;
                Ok(count)
            }
            Err(error) => {
                self.transport.emit(snapshot(then, Vec::new())).await;
                Err(error)
            }
        }
    }

    async fn execute(&self, action: Action, feedback_sent: &mut bool) -> Result<(), StepFailure> {
        match action {
            Action::Emit(event) => {
                if event.is_feedback() {
                    if *feedback_sent {
                        debug!("Second feedback suppressed");
                        return Ok(());
                    }
                    *feedback_sent = true;
                }
                debug!(event = event.name(), "emit");
                self.transport.emit(event).await;
                Ok(())
            }

            Action::Persist { table, write, on_failure } => {
                let result = match write {
                    Write::Insert(fields) => self.storage.insert(table, fields).await.map(|id| {
                        debug!(%table, id, "persisted");
                    }),
                    Write::Delete(predicate) => self.storage.delete(table, predicate).await.map(|n| {
                        debug!(%table, removed = n, "deleted");
                    }),
                };
                result.map_err(|error| StepFailure { error, message: on_failure })
            }

            Action::Requery { table, filter, order, then, on_failure } => {
                let rows = self
                    .storage
                    .select_all(table, filter, order)
                    .await
                    .map_err(|error| StepFailure { error, message: on_failure })?;
                debug!(%table, rows = rows.len(), "requeried");
                self.transport.emit(snapshot(then, rows)).await;
                Ok(())
            }
        }
    }
}

struct StepFailure {
    error: StorageError,
    message: String,
}

/// Turns raw rows into the snapshot event the UI expects.
pub fn snapshot(kind: Snapshot, rows: Vec<Row>) -> OutboundEvent {
    match kind {
        Snapshot::CalendarEvents => OutboundEvent::CalendarEvents(
            rows.iter()
                .map(|row| CalendarEntry {
                    title: row.get("title").to_string(),
                    date: row.get("date").to_string(),
                })
                .collect(),
        ),
        Snapshot::MedicineData => OutboundEvent::MedicineData(
            rows.iter()
                .map(|row| MedicineEntry {
                    id: row.id,
                    name: row.get("name").to_string(),
                    dosage: row.get("dosage").to_string(),
                    time: row.get("time").to_string(),
                    date: reformat_date(row.get("date")),
                })
                .collect(),
        ),
        Snapshot::WeekMoods => OutboundEvent::WeekMoods(
            rows.iter()
                .map(|row| MoodEntry {
                    id: row.id,
                    mood: row.get("mood").to_string(),
                    date: row.get("date").to_string(),
                })
                .collect(),
        ),
    }
}

/// Stored dates may carry a time part (`2026-07-05T00:00:00Z`); the UI wants `2026-07-05`.
/// Anything unparseable passes through untouched.
pub fn reformat_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return at.date_naive().format("%Y-%m-%d").to_string();
    }
    if let Some(prefix) = raw.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    raw.to_string()
}
