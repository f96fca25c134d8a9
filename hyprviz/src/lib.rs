mod config;

pub use config::{ConfigArgs, load_config};

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use flume::{Receiver, Sender};
use hyprviz_engine::Engine;
use hyprviz_messages::{Command, EngineConfig, Event, SnapshotStore};
use log::info;

/// Capacity of the engine → UI event channel. Events beyond this are dropped
/// by the engine rather than stalling it.
const EVENT_CAPACITY: usize = 64;

/// A running engine thread and the channels to talk to it.
pub struct EngineHandle {
    cmd_tx: Sender<Command>,
    event_rx: Receiver<Event>,
    store: Arc<SnapshotStore>,
    thread: JoinHandle<Result<()>>,
}

/// Spawn the engine thread. Its first poll attempts a connection right away.
pub fn start(config: EngineConfig) -> Result<EngineHandle> {
    let store = Arc::new(SnapshotStore::new(config.layout.clone()));
    let (cmd_tx, cmd_rx) = flume::unbounded();
    let (event_tx, event_rx) = flume::bounded(EVENT_CAPACITY);

    info!(
        "Starting engine: {} bands from {}",
        config.layout.len(),
        config.socket_path.display()
    );
    let engine = Engine::new(config, Arc::clone(&store), cmd_rx, event_tx)
        .context("Invalid engine configuration")?;
    let thread = thread::Builder::new()
        .name("hyprviz-engine".to_owned())
        .spawn(move || engine.run())
        .context("Failed to spawn engine thread")?;

    Ok(EngineHandle {
        cmd_tx,
        event_rx,
        store,
        thread,
    })
}

impl EngineHandle {
    pub fn store(&self) -> Arc<SnapshotStore> {
        Arc::clone(&self.store)
    }

    pub fn events(&self) -> Receiver<Event> {
        self.event_rx.clone()
    }

    pub fn commands(&self) -> Sender<Command> {
        self.cmd_tx.clone()
    }

    /// Ask the engine to stop and wait for its thread to finish.
    pub fn stop(self) -> Result<()> {
        // The engine also stops once every sender is gone, so a failed send is fine.
        let _ = self.cmd_tx.send(Command::Stop);
        self.thread
            .join()
            .map_err(|_| anyhow::anyhow!("Engine thread panicked"))?
    }
}
