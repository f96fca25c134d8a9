/// Commands sent from the UI to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Stop the engine, close the socket and end the worker loop.
    Stop,
    /// Drop the current connection (if any) and reconnect without waiting for the backoff.
    Reconnect,
}
