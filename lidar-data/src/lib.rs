pub mod device_info;
pub mod scan;
pub mod status;

pub use device_info::{DeviceHealth, DeviceInfo};
pub use scan::{RawPoint, ScanFrame, HISTORY_CAPACITY, MAX_RANGE, SLOT_COUNT};
pub use status::WorkerStatus;
