use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use arc_swap::ArcSwap;
use thiserror::Error;

use crate::{AudioSnapshot, BandLayout, ConnectionState};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("snapshot has {found} bands, layout expects {expected}")]
    WrongArity { expected: usize, found: usize },
}

/// Hand-off point between the engine thread and the render thread.
///
/// The engine publishes whole snapshots; the render thread loads the most
/// recent one. Publishing is a single pointer swap and loading never
/// blocks, so a reader can only ever see a snapshot that was complete
/// before it was published. Intermediate snapshots may be skipped by a
/// slow reader.
///
/// The connection state lives here too. Events can be dropped when the
/// UI falls behind, the state a reader loads from the store cannot.
pub struct SnapshotStore {
    layout: BandLayout,
    current: ArcSwap<AudioSnapshot>,
    next_sequence: AtomicU64,
    connection: AtomicU8,
}

impl SnapshotStore {
    pub fn new(layout: BandLayout) -> Self {
        let initial = AudioSnapshot::zeroed(layout.len());
        Self {
            layout,
            current: ArcSwap::from_pointee(initial),
            next_sequence: AtomicU64::new(1),
            connection: AtomicU8::new(encode_state(ConnectionState::Disconnected)),
        }
    }

    pub fn layout(&self) -> &BandLayout {
        &self.layout
    }

    /// Replace the current snapshot. Returns the sequence number assigned.
    pub fn publish(&self, snapshot: AudioSnapshot) -> Result<u64, StoreError> {
        if snapshot.len() != self.layout.len() {
            return Err(StoreError::WrongArity {
                expected: self.layout.len(),
                found: snapshot.len(),
            });
        }
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        self.current.store(Arc::new(snapshot.with_sequence(sequence)));
        Ok(sequence)
    }

    /// The most recently published snapshot.
    pub fn current(&self) -> Arc<AudioSnapshot> {
        self.current.load_full()
    }

    /// How many snapshots have been published since construction.
    pub fn published_count(&self) -> u64 {
        self.next_sequence.load(Ordering::Relaxed) - 1
    }

    pub fn set_connection(&self, state: ConnectionState) {
        self.connection.store(encode_state(state), Ordering::Release);
    }

    /// The connection state last set by the engine.
    pub fn connection(&self) -> ConnectionState {
        decode_state(self.connection.load(Ordering::Acquire))
    }
}

fn encode_state(state: ConnectionState) -> u8 {
    match state {
        ConnectionState::Disconnected => 0,
        ConnectionState::Connecting => 1,
        ConnectionState::Connected => 2,
        ConnectionState::Failed => 3,
    }
}

fn decode_state(raw: u8) -> ConnectionState {
    match raw {
        1 => ConnectionState::Connecting,
        2 => ConnectionState::Connected,
        3 => ConnectionState::Failed,
        _ => ConnectionState::Disconnected,
    }
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("layout", &self.layout)
            .field("current", &**self.current.load())
            .field("connection", &self.connection())
            .finish()
    }
}
