mod command;
mod event;
mod snapshot;
mod state;
mod store;
mod units;

pub use command::Command;
pub use event::Event;
pub use snapshot::{AudioSnapshot, BandLayout};
pub use state::{ConfigError, ConnectionState, EngineConfig, DEFAULT_SOCKET_PATH};
pub use store::{SnapshotStore, StoreError};
pub use units::Decibels;
