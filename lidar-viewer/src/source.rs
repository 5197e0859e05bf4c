//! Boundary between the viewer and the physical sensor.
//!
//! A [`ScanSource`] knows how to reach a sensor; opening it yields a
//! [`SensorHandle`] that owns the connection for the duration of one
//! scanning session. The handle is moved into the ingestion thread and
//! released there, so no sensor state is shared between threads.

use crate::error::SensorError;
use lidar_data::RawPoint;

pub trait ScanSource {
    type Handle: SensorHandle + Send + 'static;

    /// Connects to the sensor on `port` and starts the scan.
    fn open(&self, port: &str) -> Result<Self::Handle, SensorError>;
}

pub trait SensorHandle {
    /// Advances the rotation sequence.
    ///
    /// Returns `Ok(None)` when no complete rotation is available yet, so that
    /// callers can check for cancellation between polls. Once an error has
    /// been returned the sequence is exhausted and later calls fail with
    /// [`SensorError::Disconnected`].
    fn next_rotation(&mut self) -> Result<Option<Vec<RawPoint>>, SensorError>;

    /// Asks the sensor to stop measuring. Idempotent.
    fn stop(&mut self) -> Result<(), SensorError>;

    /// Spins the motor down. Idempotent.
    fn stop_motor(&mut self) -> Result<(), SensorError>;

    /// Closes the connection. Idempotent.
    fn disconnect(&mut self) -> Result<(), SensorError>;
}
