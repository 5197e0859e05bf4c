use crate::constants::{CADENCE_RANGE, DEFAULT_CADENCE, ZOOM_RANGE};
use crate::error::ConfigError;
use crate::history::Snapshot;
use crate::projector::{CoordinateProjector, Point};
use lidar_data::{ScanFrame, MAX_RANGE};
use std::time::Duration;

/// Spacing of the range rings, in distance units.
pub const RING_SPACING: u16 = 500;
/// Spacing of the radial spokes, in degree.
pub const SPOKE_SPACING: u16 = 45;
pub const POINT_RADIUS: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }
}

pub const BACKGROUND_COLOR: Color = Color::rgb(20, 20, 30);
pub const POINT_COLOR: Color = Color::rgb(255, 215, 0);
pub const GRID_COLOR: Color = Color::rgb(50, 50, 70);
pub const CIRCLE_COLOR: Color = Color::rgb(100, 100, 150);

/// Something the pipeline can paint on.
pub trait DrawingSurface {
    fn clear(&mut self, color: Color);
    /// Outline of a circle.
    fn draw_circle(&mut self, center: Point, radius: u32, color: Color);
    fn fill_circle(&mut self, center: Point, radius: u32, color: Color) {
        self.draw_circle(center, radius, color);
    }
    fn draw_line(&mut self, from: Point, to: Point, color: Color);
    /// Makes everything drawn since the last `clear` visible.
    fn present(&mut self);
}

/// Rendering parameters, owned by whoever runs the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderState {
    zoom: u8,
    cadence: u32,
    grid_visible: bool,
}

impl RenderState {
    pub fn new(zoom: u8, cadence: u32, grid_visible: bool) -> Result<RenderState, ConfigError> {
        let mut state = RenderState::default();
        state.set_zoom(zoom)?;
        state.set_cadence(cadence)?;
        state.grid_visible = grid_visible;
        Ok(state)
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn cadence(&self) -> u32 {
        self.cadence
    }

    pub fn grid_visible(&self) -> bool {
        self.grid_visible
    }

    /// Time between two ticks.
    pub fn period(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.cadence as u64)
    }

    pub fn set_zoom(&mut self, zoom: u8) -> Result<(), ConfigError> {
        self.zoom = validate_zoom(zoom as i64)?;
        Ok(())
    }

    pub fn set_cadence(&mut self, cadence: u32) -> Result<(), ConfigError> {
        self.cadence = validate_cadence(cadence as i64)?;
        Ok(())
    }

    pub fn set_grid_visible(&mut self, visible: bool) {
        self.grid_visible = visible;
    }

    pub fn toggle_grid(&mut self) {
        self.grid_visible = !self.grid_visible;
    }
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            zoom: *ZOOM_RANGE.start(),
            cadence: DEFAULT_CADENCE,
            grid_visible: true,
        }
    }
}

pub fn validate_zoom(value: i64) -> Result<u8, ConfigError> {
    let (min, max) = (*ZOOM_RANGE.start(), *ZOOM_RANGE.end());
    if value < min as i64 || value > max as i64 {
        return Err(ConfigError::ZoomOutOfRange { value, min, max });
    }
    Ok(value as u8)
}

pub fn validate_cadence(value: i64) -> Result<u32, ConfigError> {
    let (min, max) = (*CADENCE_RANGE.start(), *CADENCE_RANGE.end());
    if value < min as i64 || value > max as i64 {
        return Err(ConfigError::CadenceOutOfRange { value, min, max });
    }
    Ok(value as u32)
}

/// Draws the reference grid and the frame history.
#[derive(Clone, Copy, Debug)]
pub struct RenderPipeline {
    projector: CoordinateProjector,
}

impl RenderPipeline {
    pub fn new(projector: CoordinateProjector) -> RenderPipeline {
        RenderPipeline { projector }
    }

    pub fn projector(&self) -> &CoordinateProjector {
        &self.projector
    }

    /// Paints one complete picture and presents it.
    ///
    /// Frames are drawn oldest first so that the newest one ends up on top.
    pub fn draw<S: DrawingSurface + ?Sized>(
        &self,
        state: &RenderState,
        surface: &mut S,
        snapshot: &Snapshot,
    ) {
        surface.clear(BACKGROUND_COLOR);
        if state.grid_visible() {
            self.draw_grid(state, surface);
        }
        for frame in snapshot {
            self.draw_frame(state, surface, frame);
        }
        surface.present();
    }

    fn draw_grid<S: DrawingSurface + ?Sized>(&self, state: &RenderState, surface: &mut S) {
        let center = self.projector.center();
        let (scale_x, _) = self.projector.scale();
        for range in (RING_SPACING..=MAX_RANGE).step_by(RING_SPACING as usize) {
            let radius = (range as f64 * scale_x * state.zoom() as f64).round() as u32;
            surface.draw_circle(center, radius, CIRCLE_COLOR);
        }
        for degree in (0..360).step_by(SPOKE_SPACING as usize) {
            let end = self.projector.project(degree as f64, MAX_RANGE as f64, 1);
            surface.draw_line(center, end, GRID_COLOR);
        }
    }

    fn draw_frame<S: DrawingSurface + ?Sized>(
        &self,
        state: &RenderState,
        surface: &mut S,
        frame: &ScanFrame,
    ) {
        for (degree, distance) in frame.readings() {
            let point = self
                .projector
                .project(degree as f64, distance as f64, state.zoom());
            surface.fill_circle(point, POINT_RADIUS, POINT_COLOR);
        }
    }
}
