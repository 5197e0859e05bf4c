use crate::constants::{DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT_MS, MIN_ROTATION_POINTS, NODE_SIZE};
use crate::error::SensorError;
use crate::packet::decode_node;
use crate::serial::{
    check_device_health, get_device_info, read_available, start_motor, start_scan, stop_motor,
    stop_scan, stop_scan_and_flush,
};
use crate::source::{ScanSource, SensorHandle};
use crate::time::sleep_ms;
use lidar_data::{DeviceHealth, RawPoint};
use serialport::SerialPort;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Slamtec RPLidar (A1/A2/A3) reached over a serial port.
#[derive(Clone, Debug)]
pub struct RplidarSource {
    baud_rate: u32,
    timeout: Duration,
}

impl RplidarSource {
    /// # Arguments
    ///
    /// * `baud_rate` - 115200 for A1 and A2, 256000 for A3.
    /// * `timeout` - Longest silence tolerated from a scanning sensor.
    pub fn new(baud_rate: u32, timeout: Duration) -> RplidarSource {
        RplidarSource { baud_rate, timeout }
    }
}

impl Default for RplidarSource {
    fn default() -> Self {
        RplidarSource::new(DEFAULT_BAUD_RATE, Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }
}

impl ScanSource for RplidarSource {
    type Handle = RplidarHandle;

    fn open(&self, port_name: &str) -> Result<RplidarHandle, SensorError> {
        let port = serialport::new(port_name, self.baud_rate)
            .timeout(Duration::from_millis(10))
            .open()?;
        log::info!("Opened \"{}\" at {} baud", port_name, self.baud_rate);

        let mut handle = RplidarHandle::new(port, self.timeout);
        if let Err(e) = handle.initialize() {
            log::error!("Failed to start scanning on \"{}\": {}", port_name, e);
            handle.release();
            return Err(e);
        }
        Ok(handle)
    }
}

/// Open connection to a scanning RPLidar.
pub struct RplidarHandle {
    port: Option<Box<dyn SerialPort>>,
    buffer: VecDeque<u8>,
    rotation: Vec<RawPoint>,
    timeout: Duration,
    last_data: Instant,
    scanning: bool,
    motor_running: bool,
    exhausted: bool,
}

impl RplidarHandle {
    fn new(port: Box<dyn SerialPort>, timeout: Duration) -> RplidarHandle {
        RplidarHandle {
            port: Some(port),
            buffer: VecDeque::new(),
            rotation: Vec::new(),
            timeout,
            last_data: Instant::now(),
            scanning: false,
            motor_running: false,
            exhausted: false,
        }
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>, SensorError> {
        self.port.as_mut().ok_or(SensorError::Disconnected)
    }

    fn initialize(&mut self) -> Result<(), SensorError> {
        if !cfg!(test) {
            // In testing, disable flushing to receive dummy signals
            stop_scan_and_flush(self.port()?)?;
        }

        start_motor(self.port()?)?;
        self.motor_running = true;

        match check_device_health(self.port()?)? {
            DeviceHealth::Good => {}
            DeviceHealth::Warning(code) => {
                log::warn!("RPLidar reports a warning. Error code = {:#06X}", code)
            }
            DeviceHealth::Error(code) => return Err(SensorError::DeviceHealthError(code)),
        }

        let info = get_device_info(self.port()?)?;
        log::info!(
            "RPLidar model {:#04X}, firmware {}.{:02}, hardware {}, serial {}",
            info.model_number,
            info.firmware_major_version,
            info.firmware_minor_version,
            info.hardware_version,
            info.serial_number_hex()
        );

        start_scan(self.port()?)?;
        self.scanning = true;
        self.last_data = Instant::now();
        Ok(())
    }

    /// Consumes buffered nodes until a rotation is complete.
    fn take_rotation(&mut self) -> Result<Option<Vec<RawPoint>>, SensorError> {
        while self.buffer.len() >= NODE_SIZE {
            let node = self.buffer.drain(..NODE_SIZE).collect::<Vec<_>>();
            let (new_scan, point) = decode_node(&node)?;
            // Every start flag opens a new rotation. Fragments too short to
            // count as one are dropped.
            let completed = if new_scan {
                let rotation = std::mem::take(&mut self.rotation);
                let complete = rotation.len() > MIN_ROTATION_POINTS;
                if !complete && !rotation.is_empty() {
                    log::trace!("Dropping a fragment of {} points", rotation.len());
                }
                complete.then_some(rotation)
            } else {
                None
            };
            if point.distance > 0. {
                self.rotation.push(point);
            }
            if completed.is_some() {
                return Ok(completed);
            }
        }
        Ok(None)
    }

    fn poll(&mut self) -> Result<Option<Vec<RawPoint>>, SensorError> {
        if let Some(rotation) = self.take_rotation()? {
            return Ok(Some(rotation));
        }

        let data = read_available(self.port()?)?;
        if data.is_empty() {
            if self.last_data.elapsed() > self.timeout {
                return Err(SensorError::Timeout);
            }
            sleep_ms(10);
            return Ok(None);
        }

        self.last_data = Instant::now();
        self.buffer.extend(data);
        self.take_rotation()
    }

    fn release(&mut self) {
        for (step, result) in [
            ("stop scan", self.stop()),
            ("stop motor", self.stop_motor()),
            ("disconnect", self.disconnect()),
        ] {
            if let Err(e) = result {
                log::warn!("Failed to {}: {}", step, e);
            }
        }
    }
}

impl SensorHandle for RplidarHandle {
    fn next_rotation(&mut self) -> Result<Option<Vec<RawPoint>>, SensorError> {
        if self.exhausted {
            return Err(SensorError::Disconnected);
        }
        let result = self.poll();
        if result.is_err() {
            self.exhausted = true;
        }
        result
    }

    fn stop(&mut self) -> Result<(), SensorError> {
        if !self.scanning {
            return Ok(());
        }
        self.scanning = false;
        match self.port.as_mut() {
            Some(port) => stop_scan(port),
            None => Ok(()),
        }
    }

    fn stop_motor(&mut self) -> Result<(), SensorError> {
        if !self.motor_running {
            return Ok(());
        }
        self.motor_running = false;
        match self.port.as_mut() {
            Some(port) => stop_motor(port),
            None => Ok(()),
        }
    }

    fn disconnect(&mut self) -> Result<(), SensorError> {
        if self.port.take().is_some() {
            log::info!("RPLidar disconnected");
        }
        self.buffer.clear();
        self.rotation.clear();
        Ok(())
    }
}
