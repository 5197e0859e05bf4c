//! Acquisition and rolling display of a rotating range sensor.
//!
//! A [`ScanWorker`] reads complete rotations from a [`ScanSource`] on its own
//! thread, buckets them into [`ScanFrame`]s and keeps the latest ones in a
//! [`HistoryBuffer`]. A [`RenderLoop`] redraws that history at a fixed cadence
//! onto any [`DrawingSurface`]. The [`Controller`] ties both together.

mod assembler;
mod config;
mod constants;
mod control;
mod error;
mod export;
mod history;
mod numeric;
mod packet;
mod projector;
mod raster;
mod render;
mod render_loop;
mod rplidar;
mod serial;
mod source;
mod time;
mod worker;

#[cfg(test)]
mod testing;

pub use crate::assembler::assemble_frame;
pub use crate::config::{Args, ViewerConfig, DEFAULT_PORT};
pub use crate::constants::{
    CADENCE_RANGE, DEFAULT_BAUD_RATE, DEFAULT_CADENCE, DEFAULT_CANVAS_SIZE, DEFAULT_TIMEOUT_MS,
    MAX_CANVAS_SIZE, ZOOM_RANGE,
};
pub use crate::control::{Command, Controller, HELP};
pub use crate::error::{ConfigError, ControlError, ExportError, SensorError};
pub use crate::export::{export, ExportFormat};
pub use crate::history::{HistoryBuffer, Snapshot};
pub use crate::numeric::degree_to_radian;
pub use crate::projector::{CoordinateProjector, Point};
pub use crate::raster::{Framebuffer, LatestFrame, RasterSurface};
pub use crate::render::{
    validate_cadence, validate_zoom, Color, DrawingSurface, RenderPipeline, RenderState,
    BACKGROUND_COLOR, CIRCLE_COLOR, GRID_COLOR, POINT_COLOR, POINT_RADIUS, RING_SPACING,
    SPOKE_SPACING,
};
pub use crate::render_loop::{RenderCommand, RenderHandle, RenderLoop};
pub use crate::rplidar::{RplidarHandle, RplidarSource};
pub use crate::source::{ScanSource, SensorHandle};
pub use crate::worker::{ScanWorker, WorkerEvent};
pub use lidar_data::{
    DeviceHealth, DeviceInfo, RawPoint, ScanFrame, WorkerStatus, HISTORY_CAPACITY, MAX_RANGE,
    SLOT_COUNT,
};
