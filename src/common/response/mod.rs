// src/common/response/mod.rs

pub mod parse;

pub use parse::{
    decode_response, parse_auto_clean_interval, parse_data_ready, parse_device_status, parse_measurement,
    parse_serial, parse_version,
};

use crate::common::types::{AutoCleanInterval, DeviceStatus, Measurement, SerialNumber, Version};

/// Represents any valid, decoded response received from an SPS-30.
///
/// The variant is selected by the command that was sent, not by the bytes
/// received: the sensor's responses carry no type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Write-only command, nothing was read back.
    Empty,
    /// `GetDataReady`: true when a new measurement can be read.
    DataReady(bool),
    /// `ReadMeasurement`: one float measurement.
    Measurement(Measurement),
    /// `GetAutoCleanInterval`: interval stored on the device.
    AutoCleanInterval(AutoCleanInterval),
    /// `GetFirmwareVersion`.
    Version(Version),
    /// `GetSerial`.
    Serial(SerialNumber),
    /// `ReadDeviceStatus`.
    DeviceStatus(DeviceStatus),
}
