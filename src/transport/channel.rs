use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::warn;

use super::{OutboundEvent, Transport};

/// Pushes events into an mpsc channel drained by whoever owns the socket (or stdout).
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::Sender<OutboundEvent>,
}

impl ChannelTransport {
    pub fn new(tx: mpsc::Sender<OutboundEvent>) -> Self {
        Self { tx }
    }

    /// Transport plus the receiving end.
    pub fn pair(capacity: usize) -> (Self, mpsc::Receiver<OutboundEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn emit(&self, event: OutboundEvent) {
        let name = event.name();
        if self.tx.send(event).await.is_err() {
            warn!(event = name, "Transport closed, event dropped");
        }
    }
}
