use std::path::PathBuf;

use anyhow::{Context, Result};
use hyprviz_messages::{BandLayout, EngineConfig};
use hyprviz_ui::ShaderSource;

/// Number of comma-separated fields per record (1, 6 or 13 in practice).
pub const BANDS_VAR: &str = "HYPRVIZ_BANDS";
/// Exponential smoothing weight of the previous value, `0.0..1.0`.
pub const SMOOTHING_VAR: &str = "HYPRVIZ_SMOOTHING";

/// Raw user input, before parsing.
#[derive(Debug, Default, Clone)]
pub struct ConfigArgs {
    pub socket_path: Option<PathBuf>,
    pub shader_path: Option<PathBuf>,
    pub bands: Option<String>,
    pub smoothing: Option<String>,
}

impl ConfigArgs {
    /// Read `[SOCKET_PATH] [SHADER_PATH]` from the command line and the
    /// `HYPRVIZ_*` environment variables.
    pub fn from_env() -> Self {
        let mut args = std::env::args().skip(1);
        Self {
            socket_path: args.next().map(PathBuf::from),
            shader_path: args.next().map(PathBuf::from),
            bands: std::env::var(BANDS_VAR).ok(),
            smoothing: std::env::var(SMOOTHING_VAR).ok(),
        }
    }

    pub fn shader_source(&self) -> ShaderSource {
        self.shader_path
            .clone()
            .map(ShaderSource::File)
            .unwrap_or_default()
    }
}

/// Build and validate the engine configuration, starting from the defaults.
pub fn load_config(args: &ConfigArgs) -> Result<EngineConfig> {
    let mut config = EngineConfig::default();

    if let Some(path) = &args.socket_path {
        config.socket_path = path.clone();
    }
    if let Some(bands) = &args.bands {
        let count: usize = bands
            .trim()
            .parse()
            .with_context(|| format!("{BANDS_VAR} must be a number, got {bands:?}"))?;
        config.layout =
            BandLayout::from_count(count).with_context(|| format!("{BANDS_VAR}={count}"))?;
    }
    if let Some(smoothing) = &args.smoothing {
        config.smoothing = smoothing
            .trim()
            .parse()
            .with_context(|| format!("{SMOOTHING_VAR} must be a number, got {smoothing:?}"))?;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}
