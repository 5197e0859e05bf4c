use std::io;
use std::path::PathBuf;

/// Errors raised while talking to the sensor.
///
/// Any of them ends the current scanning session.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("Response header must be always seven bytes. Actually {0} bytes.")]
    InvalidHeaderLength(usize),
    #[error("Header sign must start with 0xA5 0x5A. Observed = {0}.")]
    InvalidMagicNumber(String),
    #[error("Expected response length of {0} bytes but found {1} bytes.")]
    InvalidResponseLength(u32, u32),
    #[error("Expected type code {0:#04X} but obtained {1:#04X}.")]
    InvalidTypeCode(u8, u8),
    #[error("Malformed measurement node: {0}")]
    MalformedNode(String),
    #[error("Device health error. Error code = {0:#06X}. See the development manual for details.")]
    DeviceHealthError(u16),
    #[error("Operation timed out")]
    Timeout,
    #[error("The sensor is disconnected")]
    Disconnected,
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while persisting the scan history.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to encode scan history: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Cannot infer an export format from {0}. Use a .json or .csv file.")]
    UnknownFormat(PathBuf),
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Rejected control values. The previous setting is kept.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Zoom must be between {min} and {max}. Got {value}.")]
    ZoomOutOfRange { value: i64, min: u8, max: u8 },
    #[error("Cadence must be between {min} and {max} frames per second. Got {value}.")]
    CadenceOutOfRange { value: i64, min: u32, max: u32 },
    #[error("Canvas sides must be between 1 and 8192 pixels. Got {0}x{1}.")]
    InvalidCanvas(u32, u32),
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

/// Anything the control surface can report back to the user.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error(transparent)]
    Sensor(#[from] SensorError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("The render loop has shut down")]
    RenderLoopClosed,
    #[error("Nothing has been rendered yet")]
    NothingRendered,
}
