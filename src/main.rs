use std::sync::Arc;

use anyhow::{Context, Result};
use attune::config::Config;
use attune::kernel::event::InboundEvent;
use attune::kernel::time::SystemClock;
use attune::storage::SqliteStorage;
use attune::transport::ChannelTransport;
use attune::{Interpreter, Reactor};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the event stream
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("Attune booting...");

    let config = Config::from_env().context("loading configuration")?;
    let lexicon = Arc::new(config.lexicon().context("building lexicon")?);
    let storage = SqliteStorage::open(&config.db_path)
        .with_context(|| format!("opening database {}", config.db_path.display()))?;
    tracing::info!("Storage ready at {}", config.db_path.display());

    let (transport, mut outbound) = ChannelTransport::pair(config.channel_capacity);
    let interpreter = Arc::new(Interpreter::new(
        lexicon,
        Arc::new(storage),
        Arc::new(transport),
        Arc::new(SystemClock),
    ));

    let (inbound_tx, inbound_rx) = mpsc::channel(config.channel_capacity);
    let reactor = tokio::spawn(Reactor::new(inbound_rx, Arc::clone(&interpreter)).run());

    // Socket stand-in: one JSON line per outbound event
    let printer = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!(event = event.name(), "Unserializable event: {}", e),
            }
        }
    });

    tracing::info!("Attune listening on stdin. Ctrl+D to stop.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if let Some(event) = InboundEvent::from_line(&line) {
            if inbound_tx.send(event).await.is_err() {
                break;
            }
        }
    }

    // Closing inbound lets the reactor drain in-flight commands and return
    drop(inbound_tx);
    reactor.await.context("reactor task")?;

    let snapshot = interpreter.telemetry();
    tracing::info!(
        commands = snapshot.command_stats.classified,
        parse_failures = snapshot.command_stats.parse_failures,
        storage_failures = snapshot.command_stats.storage_failures,
        queries = snapshot.query_stats.served,
        "Session summary"
    );

    // Last transport handle lives in the interpreter
    drop(interpreter);
    printer.await.context("printer task")?;
    Ok(())
}
