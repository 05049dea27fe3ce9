use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{info, warn};

use super::dispatcher::Acknowledgement;
use super::event::InboundEvent;
use super::interpreter::Interpreter;

/// Async driver. One task per inbound event, no ordering between them.
///
/// Two phrases touching the same date (e.g. `clear july 5` while `mark july 5 as x` is
/// still writing) may interleave at the storage layer. Nothing here serializes them.
pub struct Reactor {
    receiver: mpsc::Receiver<InboundEvent>,
    interpreter: Arc<Interpreter>,
    acks: Option<mpsc::Sender<Acknowledgement>>,
}

impl Reactor {
    pub fn new(receiver: mpsc::Receiver<InboundEvent>, interpreter: Arc<Interpreter>) -> Self {
        Self {
            receiver,
            interpreter,
            acks: None,
        }
    }

    /// Forward every command acknowledgement to `acks` as well.
    pub fn with_acks(mut self, acks: mpsc::Sender<Acknowledgement>) -> Self {
        self.acks = Some(acks);
        self
    }

    /// Runs until the inbound channel closes, then drains in-flight tasks.
    pub async fn run(mut self) {
        info!("Reactor started");
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                event = self.receiver.recv() => match event {
                    Some(event) => {
                        let interpreter = Arc::clone(&self.interpreter);
                        let acks = self.acks.clone();
                        tasks.spawn(handle(interpreter, event, acks));
                    }
                    None => break,
                },
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        warn!("Command task failed: {}", e);
                    }
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!("Command task failed: {}", e);
            }
        }
        info!("Reactor stopped");
    }
}

async fn handle(
    interpreter: Arc<Interpreter>,
    event: InboundEvent,
    acks: Option<mpsc::Sender<Acknowledgement>>,
) {
    match event {
        InboundEvent::VoiceCommand(text) => {
            let ack = interpreter.dispatch(&text).await;
            if let Some(acks) = acks {
                // Receiver may have gone away; the command itself already finished.
                let _ = acks.send(ack).await;
            }
        }
        InboundEvent::GetCalendarEvents => interpreter.calendar_events().await,
        InboundEvent::GetWeekMoods => interpreter.week_moods().await,
    }
}
