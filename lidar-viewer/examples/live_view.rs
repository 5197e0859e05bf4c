//! Live scan display in a window.
//!
//! Keys: S start/stop, Up/Down zoom, Left/Right cadence, G grid, C clear,
//! E export to `scan_history.json`, Esc quit.

use clap::Parser;
use lidar_viewer::{
    export, Args, Color, DrawingSurface, ExportFormat, HistoryBuffer, Point, RenderPipeline,
    RplidarSource, ScanWorker, ViewerConfig, WorkerStatus,
};
use piston_window::{
    clear, ellipse, line, Button, Context, Ellipse, EventLoop, G2d, Key, PistonWindow,
    PressEvent, WindowSettings,
};

struct PistonSurface<'a, 'b> {
    context: Context,
    graphics: &'a mut G2d<'b>,
}

fn to_rgba(color: Color) -> [f32; 4] {
    [
        color.r as f32 / 255.,
        color.g as f32 / 255.,
        color.b as f32 / 255.,
        1.,
    ]
}

fn bounding_box((x, y): Point, radius: u32) -> [f64; 4] {
    let r = radius as f64;
    [x as f64 - r, y as f64 - r, 2. * r, 2. * r]
}

impl DrawingSurface for PistonSurface<'_, '_> {
    fn clear(&mut self, color: Color) {
        clear(to_rgba(color), self.graphics);
    }

    fn draw_circle(&mut self, center: Point, radius: u32, color: Color) {
        Ellipse::new_border(to_rgba(color), 1.).draw(
            bounding_box(center, radius),
            &self.context.draw_state,
            self.context.transform,
            self.graphics,
        );
    }

    fn fill_circle(&mut self, center: Point, radius: u32, color: Color) {
        ellipse(
            to_rgba(color),
            bounding_box(center, radius),
            self.context.transform,
            self.graphics,
        );
    }

    fn draw_line(&mut self, (x0, y0): Point, (x1, y1): Point, color: Color) {
        line(
            to_rgba(color),
            0.5,
            [x0 as f64, y0 as f64, x1 as f64, y1 as f64],
            self.context.transform,
            self.graphics,
        );
    }

    fn present(&mut self) {}
}

fn main() {
    env_logger::init();
    let config = match ViewerConfig::try_from(Args::parse()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let history = HistoryBuffer::new();
    let source = RplidarSource::new(config.baud_rate, config.timeout);
    let mut worker = ScanWorker::new(source, &config.port, history.clone(), None);
    let pipeline = RenderPipeline::new(config.projector);
    let mut state = config.render;

    let mut window: PistonWindow = WindowSettings::new(
        "LiDAR scan",
        [config.projector.width(), config.projector.height()],
    )
    .exit_on_esc(true)
    .build()
    .unwrap();
    window.set_max_fps(state.cadence() as u64);

    while let Some(event) = window.next() {
        if let Some(Button::Keyboard(key)) = event.press_args() {
            let result = match key {
                Key::S if worker.status() == WorkerStatus::Idle => {
                    worker.start().map_err(|e| e.to_string())
                }
                Key::S => {
                    worker.stop();
                    Ok(())
                }
                Key::Up => state.set_zoom(state.zoom() + 1).map_err(|e| e.to_string()),
                Key::Down => state
                    .set_zoom(state.zoom().saturating_sub(1))
                    .map_err(|e| e.to_string()),
                Key::Right => state
                    .set_cadence(state.cadence() + 5)
                    .map_err(|e| e.to_string()),
                Key::Left => state
                    .set_cadence(state.cadence().saturating_sub(5))
                    .map_err(|e| e.to_string()),
                Key::G => {
                    state.toggle_grid();
                    Ok(())
                }
                Key::C => {
                    history.clear();
                    Ok(())
                }
                Key::E => export(
                    &history.snapshot(),
                    "scan_history.json",
                    ExportFormat::Json,
                )
                .map_err(|e| e.to_string()),
                _ => Ok(()),
            };
            if let Err(e) = result {
                eprintln!("{}", e);
            }
            window.set_max_fps(state.cadence() as u64);
            println!("{} | zoom {} | {} fps", worker.status(), state.zoom(), state.cadence());
        }

        window.draw_2d(&event, |context, graphics, _device| {
            let mut surface = PistonSurface { context, graphics };
            pipeline.draw(&state, &mut surface, &history.snapshot());
        });
    }
}
