use std::sync::{Arc, Mutex};

use tracing::{info, info_span, warn, Instrument};

use super::action::{Action, Snapshot};
use super::command::Command;
use super::compiler::ActionCompiler;
use super::dispatcher::{Acknowledgement, Dispatcher, Outcome};
use super::intent::types::{Classification, Intent};
use super::intent::IntentMatcher;
use super::lexicon::Lexicon;
use super::telemetry::event::TelemetryEvent;
use super::telemetry::metrics::TelemetrySnapshot;
use super::telemetry::recorder::TelemetryRecorder;
use super::time::Clock;
use crate::storage::{OrderBy, Predicate, Storage, Table};
use crate::transport::Transport;

/// Everything the pure stages produced for one phrase, before any effect runs.
#[derive(Debug, Clone)]
pub struct Plan {
    pub command: Command,
    pub classification: Classification,
    pub actions: Vec<Action>,
}

/// Normalize -> classify -> compile -> dispatch.
///
/// Holds no per-command state; any number of commands may be in flight at once.
pub struct Interpreter {
    matcher: IntentMatcher,
    compiler: ActionCompiler,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
    telemetry: Mutex<TelemetryRecorder>,
}

impl Interpreter {
    pub fn new(
        lexicon: Arc<Lexicon>,
        storage: Arc<dyn Storage>,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            matcher: IntentMatcher::new(Arc::clone(&lexicon)),
            compiler: ActionCompiler::new(lexicon),
            dispatcher: Dispatcher::new(storage, transport),
            clock,
            telemetry: Mutex::new(TelemetryRecorder::new()),
        }
    }

    /// Synchronous half of the pipeline. No I/O.
    pub fn plan(&self, raw_text: &str) -> Plan {
        let now = self.clock.now();
        let command = Command::new(raw_text);
        let classification = self.matcher.classify(&command.normalized, now.year());
        let actions = self.compiler.compile(&command, &classification, now);
        Plan {
            command,
            classification,
            actions,
        }
    }

    /// Full pipeline for one phrase. Always returns exactly one acknowledgement.
    pub async fn dispatch(&self, raw_text: &str) -> Acknowledgement {
        let Plan {
            command,
            classification,
            actions,
        } = self.plan(raw_text);

        let intent = classification.intent;
        let parsed = !classification.is_parse_failure();
        self.record(TelemetryEvent::Classified { intent, parsed });

        let initial = if !parsed {
            Outcome::ParseFailure
        } else if intent == Intent::Unknown {
            Outcome::Unknown
        } else {
            Outcome::Completed
        };

        let span = info_span!("command", id = %command.id, ?intent);
        let ack = async {
            info!(actions = actions.len(), parsed, "Command classified");
            let ack = self
                .dispatcher
                .dispatch(command.id, intent, initial, actions)
                .await;
            info!(outcome = ?ack.outcome, feedback = ack.feedback_sent, "Command acknowledged");
            ack
        }
        .instrument(span)
        .await;

        if let Ok(mut recorder) = self.telemetry.lock() {
            recorder.acknowledged(&ack);
        }
        ack
    }

    /// `get-calendar-events`: every calendar row.
    pub async fn calendar_events(&self) {
        self.query(Table::CalendarEvent, None, None, Snapshot::CalendarEvents)
            .await;
    }

    /// `get-week-moods`: moods from Sunday of this week through today, newest first.
    pub async fn week_moods(&self) {
        let now = self.clock.now();
        let filter = Predicate::between(
            "date",
            now.week_start().format("%Y-%m-%d").to_string(),
            now.iso_date(),
        );
        self.query(
            Table::MoodLog,
            Some(filter),
            Some(OrderBy::desc("date")),
            Snapshot::WeekMoods,
        )
        .await;
    }

    async fn query(
        &self,
        table: Table,
        filter: Option<Predicate>,
        order: Option<OrderBy>,
        then: Snapshot,
    ) {
        let (rows, failed) = match self.dispatcher.query(table, filter, order, then).await {
            Ok(rows) => (rows, false),
            Err(e) => {
                warn!(%table, error = %e, "Snapshot query failed");
                (0, true)
            }
        };
        self.record(TelemetryEvent::QueryServed {
            snapshot: then.into(),
            rows,
            failed,
        });
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        match self.telemetry.lock() {
            Ok(recorder) => recorder.snapshot(),
            Err(_) => TelemetrySnapshot::default(),
        }
    }

    fn record(&self, event: TelemetryEvent) {
        if let Ok(mut recorder) = self.telemetry.lock() {
            recorder.record(event);
        }
    }
}
