mod connection;
mod decoder;
mod framer;
mod smoothing;

pub use connection::{ConnectionManager, ConnectionStats, PollOutcome};
pub use decoder::{DecodeError, decode};
pub use framer::LineFramer;
pub use smoothing::Smoother;

use anyhow::{Result, bail};
use flume::{Receiver, Sender};
use hyprviz_messages::{Command, EngineConfig, Event, SnapshotStore};
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

/// The ingestion engine.
/// Owns the producer connection and processes commands from the UI.
pub struct Engine {
    cmd_rx: Receiver<Command>,
    connection: ConnectionManager,
    poll_interval: Duration,
    should_exit: bool,
}

impl Engine {
    /// Create a new Engine instance.
    ///
    /// `store` must have been built for the same band layout as `config`.
    pub fn new(
        config: EngineConfig,
        store: Arc<SnapshotStore>,
        cmd_rx: Receiver<Command>,
        event_tx: Sender<Event>,
    ) -> Result<Self> {
        config.validate()?;
        if store.layout() != &config.layout {
            bail!(
                "snapshot store has {} bands but the engine is configured for {}",
                store.layout().len(),
                config.layout.len()
            );
        }

        debug!("Constructing a new engine for {}", config.socket_path.display());
        let poll_interval = config.poll_interval;
        Ok(Self {
            cmd_rx,
            connection: ConnectionManager::new(config, store).with_events(event_tx),
            poll_interval,
            should_exit: false,
        })
    }

    /// Run the engine (blocking).
    ///
    /// Polls the connection, then waits up to the poll interval for a
    /// command. Returns after [`Command::Stop`] or once every command
    /// sender has been dropped.
    pub fn run(mut self) -> Result<()> {
        info!("Engine started");
        while !self.should_exit {
            self.connection.poll();
            self.process_commands();
        }

        self.connection.close();
        let stats = self.connection.stats();
        info!(
            "Engine stopped after {} connections, {} records ({} rejected), {} snapshots",
            stats.connects, stats.records, stats.rejected, stats.published
        );
        Ok(())
    }

    fn process_commands(&mut self) {
        let msg = self.cmd_rx.recv_timeout(self.poll_interval);
        match msg {
            Ok(Command::Stop) | Err(flume::RecvTimeoutError::Disconnected) => {
                debug!("Engine received stop: {:?}", msg);
                self.should_exit = true;
            }
            Ok(Command::Reconnect) => {
                debug!("Engine received reconnect");
                self.connection.reconnect_now();
            }
            Err(flume::RecvTimeoutError::Timeout) => {}
        }
    }
}
