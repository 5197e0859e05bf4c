use crate::constants::{
    DEFAULT_MOTOR_PWM, HEADER_SIZE, LIDAR_ANS_LENGTH_DEVHEALTH, LIDAR_ANS_LENGTH_DEVINFO,
    LIDAR_ANS_LENGTH_MEASUREMENT, LIDAR_ANS_TYPE_DEVHEALTH, LIDAR_ANS_TYPE_DEVINFO,
    LIDAR_ANS_TYPE_MEASUREMENT, LIDAR_CMD_GET_DEVICE_HEALTH, LIDAR_CMD_GET_DEVICE_INFO,
    LIDAR_CMD_SCAN, LIDAR_CMD_SET_MOTOR_PWM, LIDAR_CMD_STOP, N_READ_TRIALS,
};
use crate::error::SensorError;
use crate::packet::{
    command_bytes, parse_device_health, parse_device_info, validate_response_header,
};
use crate::time::sleep_ms;
use lidar_data::{DeviceHealth, DeviceInfo};
use serialport::SerialPort;
use std::io::{Read, Write};

pub(crate) fn start_scan(port: &mut Box<dyn SerialPort>) -> Result<(), SensorError> {
    send_command(port, LIDAR_CMD_SCAN)?;
    let header = read(port, HEADER_SIZE)?;
    validate_response_header(
        &header,
        Some(LIDAR_ANS_LENGTH_MEASUREMENT),
        LIDAR_ANS_TYPE_MEASUREMENT,
    )?;
    Ok(())
}

pub(crate) fn stop_scan(port: &mut Box<dyn SerialPort>) -> Result<(), SensorError> {
    send_command(port, LIDAR_CMD_STOP)?;
    Ok(())
}

pub(crate) fn stop_scan_and_flush(port: &mut Box<dyn SerialPort>) -> Result<(), SensorError> {
    stop_scan(port)?;
    sleep_ms(10);
    flush(port)?;
    Ok(())
}

pub(crate) fn start_motor(port: &mut Box<dyn SerialPort>) -> Result<(), SensorError> {
    // A1 units spin while DTR is low, A2 and later follow the PWM command
    if let Err(e) = port.write_data_terminal_ready(false) {
        log::warn!("Could not clear DTR to start the motor: {}", e);
    }
    set_motor_pwm(port, DEFAULT_MOTOR_PWM)
}

pub(crate) fn stop_motor(port: &mut Box<dyn SerialPort>) -> Result<(), SensorError> {
    set_motor_pwm(port, 0)?;
    if let Err(e) = port.write_data_terminal_ready(true) {
        log::warn!("Could not set DTR to stop the motor: {}", e);
    }
    Ok(())
}

fn set_motor_pwm(port: &mut Box<dyn SerialPort>, pwm: u16) -> Result<(), SensorError> {
    send_data(port, &command_bytes(LIDAR_CMD_SET_MOTOR_PWM, &pwm.to_le_bytes()))?;
    Ok(())
}

pub(crate) fn check_device_health(
    port: &mut Box<dyn SerialPort>,
) -> Result<DeviceHealth, SensorError> {
    send_command(port, LIDAR_CMD_GET_DEVICE_HEALTH)?;
    let header = read(port, HEADER_SIZE)?;
    validate_response_header(
        &header,
        Some(LIDAR_ANS_LENGTH_DEVHEALTH),
        LIDAR_ANS_TYPE_DEVHEALTH,
    )?;
    let health = read(port, LIDAR_ANS_LENGTH_DEVHEALTH as usize)?;
    parse_device_health(&health)
}

pub(crate) fn get_device_info(port: &mut Box<dyn SerialPort>) -> Result<DeviceInfo, SensorError> {
    send_command(port, LIDAR_CMD_GET_DEVICE_INFO)?;
    let header = read(port, HEADER_SIZE)?;
    validate_response_header(
        &header,
        Some(LIDAR_ANS_LENGTH_DEVINFO),
        LIDAR_ANS_TYPE_DEVINFO,
    )?;
    let info = read(port, LIDAR_ANS_LENGTH_DEVINFO as usize)?;
    parse_device_info(&info)
}

fn send_data(port: &mut Box<dyn SerialPort>, data: &[u8]) -> std::io::Result<()> {
    port.write_all(data)?;
    port.flush()
}

pub(crate) fn send_command(port: &mut Box<dyn SerialPort>, command: u8) -> std::io::Result<()> {
    send_data(port, &command_bytes(command, &[]))
}

pub(crate) fn get_n_read(port: &mut Box<dyn SerialPort>) -> Result<usize, SensorError> {
    let n_u32: u32 = port.bytes_to_read()?;
    Ok(n_u32.try_into().unwrap_or(0))
}

pub(crate) fn flush(port: &mut Box<dyn SerialPort>) -> Result<(), SensorError> {
    let n_read: usize = get_n_read(port).unwrap_or(0);
    if n_read == 0 {
        return Ok(());
    }
    let mut packet: Vec<u8> = vec![0; n_read];
    port.read_exact(packet.as_mut_slice())?;
    Ok(())
}

pub(crate) fn read(
    port: &mut Box<dyn SerialPort>,
    data_size: usize,
) -> Result<Vec<u8>, SensorError> {
    for _ in 0..N_READ_TRIALS {
        let n_read: usize = get_n_read(port)?;

        if n_read < data_size {
            sleep_ms(10);
            continue;
        }

        let mut packet: Vec<u8> = vec![0; data_size];
        port.read_exact(packet.as_mut_slice())?;
        return Ok(packet);
    }
    Err(SensorError::Timeout)
}

/// Reads whatever is pending on the port without waiting.
pub(crate) fn read_available(port: &mut Box<dyn SerialPort>) -> Result<Vec<u8>, SensorError> {
    let n_read = get_n_read(port)?;
    if n_read == 0 {
        return Ok(Vec::new());
    }
    let mut data: Vec<u8> = vec![0; n_read];
    port.read_exact(data.as_mut_slice())?;
    Ok(data)
}
