//! Test doubles for the sensor and the drawing surface.

use crate::error::SensorError;
use crate::projector::Point;
use crate::render::{Color, DrawingSurface};
use crate::source::{ScanSource, SensorHandle};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use lidar_data::RawPoint;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Primitive {
    Clear(Color),
    Circle(Point, u32, Color),
    FilledCircle(Point, u32, Color),
    Line(Point, Point, Color),
}

#[derive(Default)]
pub(crate) struct RecordingSurface {
    pub(crate) primitives: Vec<Primitive>,
    pub(crate) presented: usize,
}

impl RecordingSurface {
    /// Centres of the filled circles, in drawing order.
    pub(crate) fn points(&self) -> Vec<Point> {
        self.primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::FilledCircle(center, _, _) => Some(*center),
                _ => None,
            })
            .collect()
    }
}

impl DrawingSurface for RecordingSurface {
    fn clear(&mut self, color: Color) {
        self.primitives.clear();
        self.primitives.push(Primitive::Clear(color));
    }

    fn draw_circle(&mut self, center: Point, radius: u32, color: Color) {
        self.primitives.push(Primitive::Circle(center, radius, color));
    }

    fn fill_circle(&mut self, center: Point, radius: u32, color: Color) {
        self.primitives
            .push(Primitive::FilledCircle(center, radius, color));
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color) {
        self.primitives.push(Primitive::Line(from, to, color));
    }

    fn present(&mut self) {
        self.presented += 1;
    }
}

pub(crate) enum ScriptStep {
    Rotation(Vec<RawPoint>),
    Fail,
    Panic,
}

/// Ordered record of the calls made on a scripted sensor.
#[derive(Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    fn push(&self, call: &'static str) {
        self.0.lock().push(call);
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.0.lock().clone()
    }
}

/// Sensor whose rotations are fed by the test through a channel.
pub(crate) struct ScriptedSource {
    steps: Receiver<ScriptStep>,
    pub(crate) log: CallLog,
    pub(crate) fail_open: bool,
}

impl ScriptedSource {
    pub(crate) fn new() -> (ScriptedSource, Sender<ScriptStep>) {
        let (tx, rx) = unbounded();
        let source = ScriptedSource {
            steps: rx,
            log: CallLog::default(),
            fail_open: false,
        };
        (source, tx)
    }
}

impl ScanSource for ScriptedSource {
    type Handle = ScriptedHandle;

    fn open(&self, _port: &str) -> Result<ScriptedHandle, SensorError> {
        self.log.push("open");
        if self.fail_open {
            return Err(SensorError::Disconnected);
        }
        Ok(ScriptedHandle {
            steps: self.steps.clone(),
            log: self.log.clone(),
        })
    }
}

pub(crate) struct ScriptedHandle {
    steps: Receiver<ScriptStep>,
    log: CallLog,
}

impl SensorHandle for ScriptedHandle {
    fn next_rotation(&mut self) -> Result<Option<Vec<RawPoint>>, SensorError> {
        match self.steps.recv_timeout(Duration::from_millis(5)) {
            Ok(ScriptStep::Rotation(points)) => Ok(Some(points)),
            Ok(ScriptStep::Fail) => Err(SensorError::Timeout),
            Ok(ScriptStep::Panic) => panic!("scripted sensor panic"),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(Duration::from_millis(5));
                Ok(None)
            }
        }
    }

    fn stop(&mut self) -> Result<(), SensorError> {
        self.log.push("stop");
        Ok(())
    }

    fn stop_motor(&mut self) -> Result<(), SensorError> {
        self.log.push("stop_motor");
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), SensorError> {
        self.log.push("disconnect");
        Ok(())
    }
}

/// Polls `condition` until it holds or a second has passed.
pub(crate) fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(1);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}
