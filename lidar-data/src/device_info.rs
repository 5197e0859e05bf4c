#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceInfo {
    pub model_number: u8,
    pub firmware_major_version: u8,
    pub firmware_minor_version: u8,
    pub hardware_version: u8,
    pub serial_number: [u8; 16],
}

impl DeviceInfo {
    /// Serial number as the upper-case hex string printed on the device label.
    pub fn serial_number_hex(&self) -> String {
        self.serial_number
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect()
    }
}

/// Self-diagnosis reported by the sensor before scanning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DeviceHealth {
    Good,
    /// The sensor keeps working but reports a degraded state.
    Warning(u16),
    /// The sensor refuses to scan until it is reset or power cycled.
    Error(u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_number_hex() {
        let info = DeviceInfo {
            model_number: 0x18,
            firmware_major_version: 1,
            firmware_minor_version: 29,
            hardware_version: 7,
            serial_number: [
                0x9A, 0x3B, 0x00, 0x01, 0xC0, 0xE1, 0x9A, 0xD3, 0xA0, 0xEA, 0x98, 0xF6, 0x4A,
                0x7B, 0x41, 0x10,
            ],
        };
        assert_eq!(info.serial_number_hex(), "9A3B0001C0E19AD3A0EA98F64A7B4110");
    }
}
