pub(crate) const HEADER_SIZE: usize = 7;
pub(crate) const NODE_SIZE: usize = 5;
pub(crate) const LIDAR_CMD_SYNC_BYTE: u8 = 0xA5;
pub(crate) const LIDAR_ANS_SYNC_BYTE: u8 = 0x5A;
pub(crate) const LIDAR_CMD_STOP: u8 = 0x25;
pub(crate) const LIDAR_CMD_SCAN: u8 = 0x20;
pub(crate) const LIDAR_CMD_GET_DEVICE_INFO: u8 = 0x50;
pub(crate) const LIDAR_CMD_GET_DEVICE_HEALTH: u8 = 0x52;
pub(crate) const LIDAR_CMD_SET_MOTOR_PWM: u8 = 0xF0;
pub(crate) const LIDAR_ANS_TYPE_DEVINFO: u8 = 0x4;
pub(crate) const LIDAR_ANS_LENGTH_DEVINFO: u32 = 20;
pub(crate) const LIDAR_ANS_TYPE_DEVHEALTH: u8 = 0x6;
pub(crate) const LIDAR_ANS_LENGTH_DEVHEALTH: u32 = 3;
pub(crate) const LIDAR_ANS_TYPE_MEASUREMENT: u8 = 0x81;
pub(crate) const LIDAR_ANS_LENGTH_MEASUREMENT: u32 = 5;
pub(crate) const N_READ_TRIALS: usize = 3;
pub(crate) const DEFAULT_MOTOR_PWM: u16 = 660;
// A start flag only closes a rotation once more points than this were seen
pub(crate) const MIN_ROTATION_POINTS: usize = 5;
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_CANVAS_SIZE: u32 = 800;
/// Largest accepted canvas side, in pixels.
pub const MAX_CANVAS_SIZE: u32 = 8192;
pub const DEFAULT_CADENCE: u32 = 30;
pub const ZOOM_RANGE: std::ops::RangeInclusive<u8> = 1..=5;
pub const CADENCE_RANGE: std::ops::RangeInclusive<u32> = 1..=60;
