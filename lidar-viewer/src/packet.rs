use crate::constants::{
    HEADER_SIZE, LIDAR_ANS_SYNC_BYTE, LIDAR_CMD_SYNC_BYTE, NODE_SIZE,
};
use crate::error::SensorError;
use crate::numeric::{calc_distance, to_angle, to_string, to_u16};
use lidar_data::{DeviceHealth, DeviceInfo, RawPoint};

/// Checks a response descriptor and returns the announced response length.
///
/// A descriptor is `A5 5A`, a little-endian 30 bit length with the send mode
/// in the two upper bits, then the type code.
pub(crate) fn validate_response_header(
    header: &[u8],
    maybe_response_length: Option<u32>,
    type_code: u8,
) -> Result<u32, SensorError> {
    if header.len() != HEADER_SIZE {
        return Err(SensorError::InvalidHeaderLength(header.len()));
    }
    if header[0..2] != [LIDAR_CMD_SYNC_BYTE, LIDAR_ANS_SYNC_BYTE] {
        return Err(SensorError::InvalidMagicNumber(to_string(&header[0..2])));
    }
    let length = response_length(header);
    if let Some(expected) = maybe_response_length {
        if length != expected {
            return Err(SensorError::InvalidResponseLength(expected, length));
        }
    }
    if header[6] != type_code {
        return Err(SensorError::InvalidTypeCode(type_code, header[6]));
    }
    Ok(length)
}

fn response_length(header: &[u8]) -> u32 {
    let raw = u32::from_le_bytes([header[2], header[3], header[4], header[5]]);
    raw & 0x3FFF_FFFF
}

/// Request bytes for a command, with payload and checksum when given.
pub(crate) fn command_bytes(command: u8, payload: &[u8]) -> Vec<u8> {
    let mut data = vec![LIDAR_CMD_SYNC_BYTE, command];
    if payload.is_empty() {
        return data;
    }
    data.push(payload.len() as u8);
    data.extend_from_slice(payload);
    let checksum = data.iter().fold(0u8, |acc, b| acc ^ b);
    data.push(checksum);
    data
}

/// Decodes one measurement node into `(is_start_of_rotation, point)`.
pub(crate) fn decode_node(node: &[u8]) -> Result<(bool, RawPoint), SensorError> {
    if node.len() != NODE_SIZE {
        return Err(SensorError::MalformedNode(format!(
            "expected {} bytes, got {}",
            NODE_SIZE,
            node.len()
        )));
    }
    let new_scan = node[0] & 0x01 == 1;
    let inversed = (node[0] >> 1) & 0x01 == 1;
    if new_scan == inversed {
        return Err(SensorError::MalformedNode(format!(
            "start flag mismatch in {}",
            to_string(node)
        )));
    }
    if node[1] & 0x01 != 1 {
        return Err(SensorError::MalformedNode(format!(
            "check bit not set in {}",
            to_string(node)
        )));
    }
    let quality = node[0] >> 2;
    let angle = to_angle(node[1], node[2]);
    let distance = calc_distance(node[3], node[4]);
    Ok((new_scan, RawPoint::new(angle, distance, quality)))
}

pub(crate) fn parse_device_info(info: &[u8]) -> Result<DeviceInfo, SensorError> {
    let serial_number: [u8; 16] = info
        .get(4..20)
        .and_then(|s| s.try_into().ok())
        .ok_or(SensorError::InvalidResponseLength(20, info.len() as u32))?;
    Ok(DeviceInfo {
        model_number: info[0],
        firmware_minor_version: info[1],
        firmware_major_version: info[2],
        hardware_version: info[3],
        serial_number,
    })
}

pub(crate) fn parse_device_health(health: &[u8]) -> Result<DeviceHealth, SensorError> {
    if health.len() < 3 {
        return Err(SensorError::InvalidResponseLength(3, health.len() as u32));
    }
    let code = to_u16(health[2], health[1]);
    match health[0] {
        0 => Ok(DeviceHealth::Good),
        1 => Ok(DeviceHealth::Warning(code)),
        _ => Ok(DeviceHealth::Error(code)),
    }
}

#[cfg(test)]
pub(crate) fn encode_node(new_scan: bool, quality: u8, angle: f64, distance: f64) -> [u8; 5] {
    let flags = if new_scan { 0b01 } else { 0b10 };
    let angle_q6 = (angle * 64.) as u16;
    let distance_q2 = (distance * 4.) as u16;
    [
        (quality << 2) | flags,
        (((angle_q6 & 0x7F) << 1) as u8) | 0x01,
        (angle_q6 >> 7) as u8,
        (distance_q2 & 0xFF) as u8,
        (distance_q2 >> 8) as u8,
    ]
}
