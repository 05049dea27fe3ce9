use std::collections::{BTreeMap, HashMap, VecDeque};

use super::event::TelemetryEvent;
use crate::kernel::dispatcher::Outcome;
use crate::kernel::intent::types::Intent;

#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    pub command_stats: CommandStats,
    pub query_stats: QueryStats,
}

#[derive(Debug, Clone, Default)]
pub struct CommandStats {
    pub classified: u64,
    pub by_intent: BTreeMap<Intent, u64>,
    pub by_outcome: HashMap<Outcome, u64>,
    pub parse_failures: u64,
    pub storage_failures: u64,
    /// Commands that finished without any feedback message (pure UI actions).
    pub silent: u64,
    pub skipped_actions: u64,
    pub avg_actions_run: f64,
}

#[derive(Debug, Clone, Default)]
pub struct QueryStats {
    pub served: u64,
    pub failed: u64,
    pub rows: u64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    let mut acked = 0u64;
    let mut total_run = 0u64;

    for event in events {
        match event {
            TelemetryEvent::Classified { intent, parsed } => {
                snap.command_stats.classified += 1;
                *snap.command_stats.by_intent.entry(*intent).or_insert(0) += 1;
                if !parsed {
                    snap.command_stats.parse_failures += 1;
                }
            }
            TelemetryEvent::Acknowledged {
                outcome,
                actions_run,
                actions_skipped,
                feedback_sent,
                ..
            } => {
                acked += 1;
                total_run += *actions_run as u64;
                *snap.command_stats.by_outcome.entry(*outcome).or_insert(0) += 1;
                if *outcome == Outcome::StorageFailure {
                    snap.command_stats.storage_failures += 1;
                }
                if !feedback_sent {
                    snap.command_stats.silent += 1;
                }
                snap.command_stats.skipped_actions += *actions_skipped as u64;
            }
            TelemetryEvent::QueryServed { rows, failed, .. } => {
                snap.query_stats.served += 1;
                snap.query_stats.rows += *rows as u64;
                if *failed {
                    snap.query_stats.failed += 1;
                }
            }
        }
    }

    if acked > 0 {
        snap.command_stats.avg_actions_run = total_run as f64 / acked as f64;
    }

    snap
}
