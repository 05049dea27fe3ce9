use std::collections::VecDeque;

use super::event::TelemetryEvent;
use super::metrics::{compute_snapshot, TelemetrySnapshot};
use crate::kernel::dispatcher::Acknowledgement;

pub const DEFAULT_LIMIT: usize = 10_000;

/// Ring buffer of dispatch telemetry. Oldest events fall off once `limit` is reached.
#[derive(Debug)]
pub struct TelemetryRecorder {
    events: VecDeque<TelemetryEvent>,
    limit: usize,
    dropped: u64,
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_LIMIT)
    }

    /// A limit of 0 is treated as 1.
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            events: VecDeque::with_capacity(limit.min(DEFAULT_LIMIT)),
            limit,
            dropped: 0,
        }
    }

    pub fn record(&mut self, event: TelemetryEvent) {
        if self.events.len() >= self.limit {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    /// Counts only; the acknowledgement carries no user text.
    pub fn acknowledged(&mut self, ack: &Acknowledgement) {
        self.record(TelemetryEvent::Acknowledged {
            intent: ack.intent,
            outcome: ack.outcome,
            actions_run: ack.actions_run,
            actions_skipped: ack.actions_skipped,
            feedback_sent: ack.feedback_sent,
        });
    }

    /// Aggregates over what is still buffered.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        compute_snapshot(&self.events)
    }

    pub fn events(&self) -> impl Iterator<Item = &TelemetryEvent> {
        self.events.iter()
    }

    /// Events evicted since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}
