use crate::ConnectionState;

/// Events sent from the engine to the UI.
///
/// Band values never travel through here; they go through the
/// [`SnapshotStore`](crate::SnapshotStore).
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The connection manager entered a new state.
    ConnectionChanged(ConnectionState),
    /// Records framed during one poll failed to decode. `reason` is the
    /// error of the last one.
    RecordsRejected { count: usize, reason: String },
}
