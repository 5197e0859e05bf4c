use crate::constants::MAX_CANVAS_SIZE;
use crate::error::ConfigError;
use crate::numeric::degree_to_radian;
use lidar_data::MAX_RANGE;

/// Screen position in pixels. `y` grows downwards.
pub type Point = (i32, i32);

/// Maps polar readings onto a canvas centred on the sensor.
///
/// At zoom 1 a reading at [`MAX_RANGE`] touches the edge of the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateProjector {
    width: u32,
    height: u32,
}

impl CoordinateProjector {
    pub fn new(width: u32, height: u32) -> Result<CoordinateProjector, ConfigError> {
        let valid = 1..=MAX_CANVAS_SIZE;
        if !valid.contains(&width) || !valid.contains(&height) {
            return Err(ConfigError::InvalidCanvas(width, height));
        }
        Ok(CoordinateProjector { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn center(&self) -> Point {
        ((self.width / 2) as i32, (self.height / 2) as i32)
    }

    /// Pixels per distance unit along x and y at zoom 1.
    pub fn scale(&self) -> (f64, f64) {
        (
            (self.width as f64 / 2.) / MAX_RANGE as f64,
            (self.height as f64 / 2.) / MAX_RANGE as f64,
        )
    }

    pub fn project(&self, degree: f64, distance: f64, zoom: u8) -> Point {
        let distance = distance.min(MAX_RANGE as f64);
        let angle = degree_to_radian(degree);
        let (scale_x, scale_y) = self.scale();
        let (center_x, center_y) = self.center();
        let zoom = zoom as f64;
        let x = center_x + (distance * angle.cos() * scale_x * zoom).round() as i32;
        let y = center_y + (distance * angle.sin() * scale_y * zoom).round() as i32;
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projector() -> CoordinateProjector {
        CoordinateProjector::new(800, 800).unwrap()
    }

    #[test]
    fn test_max_range_reaches_the_right_edge() {
        assert_eq!(projector().project(0., 4000., 1), (800, 400));
    }

    #[test]
    fn test_zoom_scales_linearly() {
        let p = projector();
        let (cx, cy) = p.center();
        let (x1, y1) = p.project(0., 4000., 1);
        let (x5, y5) = p.project(0., 4000., 5);
        assert_eq!(x5 - cx, 5 * (x1 - cx));
        assert_eq!((y1, y5), (cy, cy));
    }

    #[test]
    fn test_distance_is_clamped() {
        let p = projector();
        assert_eq!(p.project(0., 9000., 1), p.project(0., 4000., 1));
    }

    #[test]
    fn test_axes() {
        let p = projector();
        assert_eq!(p.project(90., 2000., 1), (400, 600));
        assert_eq!(p.project(180., 2000., 1), (200, 400));
        assert_eq!(p.project(270., 2000., 1), (400, 200));
        assert_eq!(p.project(45., 0., 3), (400, 400));
    }

    #[test]
    fn test_non_square_canvas() {
        let p = CoordinateProjector::new(640, 480).unwrap();
        assert_eq!(p.center(), (320, 240));
        assert_eq!(p.project(0., 4000., 1), (640, 240));
        assert_eq!(p.project(90., 4000., 1), (320, 480));
    }

    #[test]
    fn test_rejects_empty_canvas() {
        assert_eq!(
            CoordinateProjector::new(0, 800),
            Err(ConfigError::InvalidCanvas(0, 800))
        );
    }

    #[test]
    fn test_rejects_oversized_canvas() {
        assert_eq!(
            CoordinateProjector::new(100_000, 100_000),
            Err(ConfigError::InvalidCanvas(100_000, 100_000))
        );
        assert!(CoordinateProjector::new(800, MAX_CANVAS_SIZE + 1).is_err());
        assert!(CoordinateProjector::new(MAX_CANVAS_SIZE, MAX_CANVAS_SIZE).is_ok());
    }
}
