use crate::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_CADENCE, DEFAULT_CANVAS_SIZE, DEFAULT_TIMEOUT_MS,
};
use crate::error::ConfigError;
use crate::projector::CoordinateProjector;
use crate::render::RenderState;
use clap::Parser;
use log::LevelFilter;
use std::time::Duration;

pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Serial port the sensor is attached to.
    #[arg(env = "LIDAR_PORT", default_value = DEFAULT_PORT)]
    pub port: String,

    /// Serial baud rate.
    #[arg(long, env = "LIDAR_BAUD_RATE", default_value_t = DEFAULT_BAUD_RATE)]
    pub baud_rate: u32,

    /// Time without any data from the sensor before the scan is aborted, in
    /// milliseconds.
    #[arg(long, env = "LIDAR_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Canvas width in pixels
    #[arg(long, env = "LIDAR_WIDTH", default_value_t = DEFAULT_CANVAS_SIZE)]
    pub width: u32,

    /// Canvas height in pixels
    #[arg(long, env = "LIDAR_HEIGHT", default_value_t = DEFAULT_CANVAS_SIZE)]
    pub height: u32,

    /// Initial zoom factor, 1 to 5.
    #[arg(long, env = "LIDAR_ZOOM", default_value_t = 1)]
    pub zoom: i64,

    /// Initial refresh rate in frames per second, 1 to 60.
    #[arg(long, env = "LIDAR_CADENCE", default_value_t = DEFAULT_CADENCE as i64)]
    pub cadence: i64,

    /// Start with the range rings and spokes hidden.
    #[arg(long, env = "LIDAR_NO_GRID")]
    pub no_grid: bool,

    /// Application log level. RUST_LOG directives take precedence.
    #[arg(long, env = "LIDAR_LOG_LEVEL", default_value = "info")]
    pub log_level: LevelFilter,
}

/// Validated settings of one viewer run.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub port: String,
    pub baud_rate: u32,
    pub timeout: Duration,
    pub projector: CoordinateProjector,
    pub render: RenderState,
    pub log_level: LevelFilter,
}

impl TryFrom<Args> for ViewerConfig {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let zoom = crate::render::validate_zoom(args.zoom)?;
        let cadence = crate::render::validate_cadence(args.cadence)?;
        Ok(ViewerConfig {
            port: args.port,
            baud_rate: args.baud_rate,
            timeout: Duration::from_millis(args.timeout_ms),
            projector: CoordinateProjector::new(args.width, args.height)?,
            render: RenderState::new(zoom, cadence, !args.no_grid)?,
            log_level: args.log_level,
        })
    }
}
