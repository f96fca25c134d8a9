use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::BandLayout;

/// Where the audio monitor listens by default.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/audio_monitor.sock";

/// Lifecycle of the producer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No socket. Waiting for the backoff interval before the next attempt.
    Disconnected,
    /// A connect attempt is in progress.
    Connecting,
    /// Socket open and non-blocking; records are being read.
    Connected,
    /// An attempt or an open connection just failed. Always followed by `Disconnected`.
    Failed,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("band layout must name at least one band")]
    EmptyLayout,

    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },

    #[error("smoothing factor {0} is outside 0.0..1.0")]
    InvalidSmoothing(f32),
}

/// Configuration for the ingestion engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Unix socket the producer listens on
    pub socket_path: PathBuf,
    /// Band names; its length is the number of fields per record
    pub layout: BandLayout,
    /// Maximum bytes of an unterminated record before it is discarded
    pub frame_cap: usize,
    /// Size of the buffer each socket read goes into
    pub read_buffer_size: usize,
    /// Worker sleep between polls
    pub poll_interval: Duration,
    /// Wait between reconnect attempts
    pub backoff: Duration,
    /// Exponential smoothing weight of the previous value, 0.0 publishes raw values
    pub smoothing: f32,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layout.is_empty() {
            return Err(ConfigError::EmptyLayout);
        }
        if self.frame_cap == 0 {
            return Err(ConfigError::Zero { name: "frame_cap" });
        }
        if self.read_buffer_size == 0 {
            return Err(ConfigError::Zero {
                name: "read_buffer_size",
            });
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(ConfigError::InvalidSmoothing(self.smoothing));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            layout: BandLayout::default(),
            frame_cap: 1024,
            read_buffer_size: 4096,
            poll_interval: Duration::from_millis(10),
            backoff: Duration::from_secs(1),
            smoothing: 0.0,
        }
    }
}
