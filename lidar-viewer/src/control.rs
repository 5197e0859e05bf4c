//! User facing operations on a running viewer.

use crate::error::{ConfigError, ControlError};
use crate::export::{export, ExportFormat};
use crate::history::HistoryBuffer;
use crate::raster::{Framebuffer, LatestFrame};
use crate::render::{validate_cadence, validate_zoom};
use crate::render_loop::{RenderCommand, RenderHandle};
use crate::source::ScanSource;
use crate::worker::{ScanWorker, WorkerEvent};
use crossbeam_channel::Receiver;
use lidar_data::WorkerStatus;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// One line of the console.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Start,
    Stop,
    Zoom(i64),
    Cadence(i64),
    Grid,
    Clear,
    /// Without a format, it is inferred from the file extension.
    Export(PathBuf, Option<ExportFormat>),
    Status,
    Snapshot(PathBuf),
    Help,
    Quit,
}

pub const HELP: &str = "\
start                    start scanning
stop                     stop scanning
zoom N                   set the zoom factor (1 to 5)
cadence N                set the refresh rate (1 to 60 fps)
grid                     show or hide the grid
clear                    drop the scan history
export PATH [json|csv]   save the scan history
snapshot PATH            save the last picture as a PPM image
status                   print the viewer status
quit                     leave";

fn parse_integer(name: &str, value: Option<&str>) -> Result<i64, ConfigError> {
    let value = value.ok_or_else(|| ConfigError::InvalidCommand(format!("{} needs a value", name)))?;
    value
        .parse::<i64>()
        .map_err(|_| ConfigError::InvalidCommand(format!("{} is not an integer: {}", name, value)))
}

fn check_arity(args: &[&str], max: usize) -> Result<(), ConfigError> {
    match args.get(max) {
        Some(extra) => Err(ConfigError::InvalidCommand(format!(
            "unexpected argument: {}",
            extra
        ))),
        None => Ok(()),
    }
}

fn path_argument(name: &str, args: &[&str]) -> Result<PathBuf, ConfigError> {
    args.first()
        .map(PathBuf::from)
        .ok_or_else(|| ConfigError::InvalidCommand(format!("{} needs a file path", name)))
}

impl FromStr for Command {
    type Err = ConfigError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words = line.split_whitespace().collect::<Vec<_>>();
        let Some((name, args)) = words.split_first() else {
            return Err(ConfigError::InvalidCommand("empty command".to_string()));
        };

        let (command, arity) = match name.to_lowercase().as_str() {
            "start" => (Command::Start, 0),
            "stop" => (Command::Stop, 0),
            "zoom" => (Command::Zoom(parse_integer("zoom", args.first().copied())?), 1),
            "cadence" => (
                Command::Cadence(parse_integer("cadence", args.first().copied())?),
                1,
            ),
            "grid" => (Command::Grid, 0),
            "clear" => (Command::Clear, 0),
            "export" => {
                let path = path_argument("export", args)?;
                let format = match args.get(1) {
                    None => None,
                    Some(format) => Some(ExportFormat::from_extension(format).ok_or_else(|| {
                        ConfigError::InvalidCommand(format!("unknown export format: {}", format))
                    })?),
                };
                (Command::Export(path, format), 2)
            }
            "status" => (Command::Status, 0),
            "snapshot" => (Command::Snapshot(path_argument("snapshot", args)?), 1),
            "help" | "?" => (Command::Help, 0),
            "quit" | "exit" => (Command::Quit, 0),
            _ => return Err(ConfigError::InvalidCommand(line.trim().to_string())),
        };
        check_arity(args, arity)?;
        Ok(command)
    }
}

/// Front door of the viewer.
///
/// Sensor commands go to the scan worker, render commands are validated here
/// and then sent to the render loop, which applies them on its next tick.
pub struct Controller<S: ScanSource> {
    worker: ScanWorker<S>,
    history: HistoryBuffer,
    render: RenderHandle,
    latest: Option<LatestFrame>,
}

impl<S: ScanSource> Controller<S> {
    pub fn new(
        worker: ScanWorker<S>,
        history: HistoryBuffer,
        render: RenderHandle,
        latest: Option<LatestFrame>,
    ) -> Controller<S> {
        Controller {
            worker,
            history,
            render,
            latest,
        }
    }

    pub fn start(&mut self) -> Result<(), ControlError> {
        self.worker.start()?;
        Ok(())
    }

    pub fn stop(&mut self) {
        self.worker.stop();
    }

    pub fn set_zoom(&self, zoom: i64) -> Result<(), ControlError> {
        let zoom = validate_zoom(zoom)?;
        self.send(RenderCommand::SetZoom(zoom))
    }

    pub fn set_cadence(&self, cadence: i64) -> Result<(), ControlError> {
        let cadence = validate_cadence(cadence)?;
        self.send(RenderCommand::SetCadence(cadence))
    }

    pub fn toggle_grid(&self) -> Result<(), ControlError> {
        self.send(RenderCommand::ToggleGrid)
    }

    pub fn clear_history(&self) {
        self.history.clear();
        log::info!("Scan history cleared");
    }

    pub fn export(&self, path: &Path, format: ExportFormat) -> Result<(), ControlError> {
        export(&self.history.snapshot(), path, format)?;
        Ok(())
    }

    pub fn status(&self) -> WorkerStatus {
        self.worker.status()
    }

    /// One-line summary of the sensor and the display.
    ///
    /// Ends with the reason of the last sensor failure until the next start.
    pub fn status_text(&self) -> String {
        let state = self.render.state();
        let mut text = format!(
            "{} on {} | frames {} | history {}/{} | zoom {} | {} fps | grid {}",
            self.worker.status(),
            self.worker.port(),
            self.worker.frames_published(),
            self.history.len(),
            self.history.capacity(),
            state.zoom(),
            state.cadence(),
            if state.grid_visible() { "on" } else { "off" }
        );
        if let Some(failure) = self.worker.last_failure() {
            text.push_str(&format!(" | failed: {}", failure));
        }
        text
    }

    /// The last picture presented by the render loop, if it draws to memory.
    pub fn latest_frame(&self) -> Option<Arc<Framebuffer>> {
        self.latest.as_ref()?.get()
    }

    pub fn snapshot(&self, path: &Path) -> Result<(), ControlError> {
        let frame = self.latest_frame().ok_or(ControlError::NothingRendered)?;
        frame.save_ppm(path)?;
        log::info!("Saved picture to {}", path.display());
        Ok(())
    }

    pub fn events(&self) -> Receiver<WorkerEvent> {
        self.worker.events()
    }

    /// Runs a console command and returns the message to show.
    ///
    /// `Quit` is left to the caller.
    pub fn execute(&mut self, command: &Command) -> Result<String, ControlError> {
        let reply = match command {
            Command::Start => {
                self.start()?;
                self.worker.status().to_string()
            }
            Command::Stop => {
                self.stop();
                self.worker.status().to_string()
            }
            Command::Zoom(zoom) => {
                self.set_zoom(*zoom)?;
                format!("Zoom set to {}", zoom)
            }
            Command::Cadence(cadence) => {
                self.set_cadence(*cadence)?;
                format!("Cadence set to {} fps", cadence)
            }
            Command::Grid => {
                self.toggle_grid()?;
                "Grid toggled".to_string()
            }
            Command::Clear => {
                self.clear_history();
                "History cleared".to_string()
            }
            Command::Export(path, format) => {
                let format = match format {
                    Some(format) => *format,
                    None => ExportFormat::from_path(path)?,
                };
                self.export(path, format)?;
                format!("Exported to {}", path.display())
            }
            Command::Status => self.status_text(),
            Command::Snapshot(path) => {
                self.snapshot(path)?;
                format!("Saved {}", path.display())
            }
            Command::Help => HELP.to_string(),
            Command::Quit => "Bye".to_string(),
        };
        Ok(reply)
    }

    fn send(&self, command: RenderCommand) -> Result<(), ControlError> {
        if self.render.send(command) {
            Ok(())
        } else {
            Err(ControlError::RenderLoopClosed)
        }
    }
}
