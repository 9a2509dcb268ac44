// src/fixtures.rs

//! Bus captures recorded from a physical SPS-30 (firmware 2.2).
//!
//! Requests are the bytes the host wrote, address first. Responses are the
//! framed bytes the sensor sent back. They drive the `RecordedTransport`
//! and the crate's tests, and are public so applications can test their own
//! code against the same traffic.

pub const WAKE_UP_REQUEST: [u8; 2] = [0x11, 0x03];
pub const SLEEP_REQUEST: [u8; 2] = [0x10, 0x01];
pub const RESET_REQUEST: [u8; 2] = [0xD3, 0x04];

pub const FIRMWARE_VERSION_REQUEST: [u8; 2] = [0xD1, 0x00];
/// Firmware 2.2
pub const FIRMWARE_VERSION_RESPONSE: [u8; 3] = [0x02, 0x02, 0x3A];

pub const DEVICE_STATUS_REQUEST: [u8; 2] = [0xD2, 0x06];
/// No flag raised.
pub const DEVICE_STATUS_RESPONSE_CLEAR: [u8; 6] = [0x00, 0x00, 0x81, 0x00, 0x00, 0x81];
/// Register value `0x0010_0000`.
pub const DEVICE_STATUS_RESPONSE_RAISED: [u8; 6] = [0x00, 0x10, 0xC2, 0x00, 0x00, 0x81];

pub const DATA_READY_REQUEST: [u8; 2] = [0x20, 0x20];
pub const DATA_READY_RESPONSE_NOT_READY: [u8; 3] = [0x00, 0x00, 0x81];
pub const DATA_READY_RESPONSE_READY: [u8; 3] = [0x00, 0x01, 0xB0];

/// Sets the interval to 39 288 s.
pub const SET_AUTO_CLEAN_INTERVAL_REQUEST_1: [u8; 8] = [0x80, 0x04, 0x00, 0x00, 0x81, 0x99, 0x78, 0x4E];
/// Sets the interval to 172 800 s (2 days).
pub const SET_AUTO_CLEAN_INTERVAL_REQUEST_2: [u8; 8] = [0x80, 0x04, 0x00, 0x02, 0xE3, 0xA3, 0x00, 0x53];
pub const AUTO_CLEAN_INTERVAL_REQUEST: [u8; 2] = [0x80, 0x04];
/// 39 288 s
pub const AUTO_CLEAN_INTERVAL_RESPONSE_1: [u8; 6] = [0x00, 0x00, 0x81, 0x99, 0x78, 0x4E];
/// 172 800 s
pub const AUTO_CLEAN_INTERVAL_RESPONSE_2: [u8; 6] = [0x00, 0x02, 0xE3, 0xA3, 0x00, 0x53];
/// Factory default, 604 800 s.
pub const AUTO_CLEAN_INTERVAL_RESPONSE_DEFAULT: [u8; 6] = [0x00, 0x09, 0x09, 0x3A, 0x80, 0xA7];

pub const START_MANUAL_FAN_CLEAN_REQUEST: [u8; 2] = [0x56, 0x07];

/// Start measurement with big-endian float output.
pub const START_MEASUREMENT_REQUEST: [u8; 5] = [0x00, 0x10, 0x03, 0x00, 0xAC];
pub const STOP_MEASUREMENT_REQUEST: [u8; 2] = [0x01, 0x04];

pub const SERIAL_NUMBER_REQUEST: [u8; 2] = [0xD0, 0x33];
pub const SERIAL_NUMBER_RESPONSE: [u8; 48] = [
    0x37, 0x45, 0x55, 0x44, 0x36, 0xE8, 0x32, 0x35, 0xDA, 0x45, 0x43, 0x11, 0x32, 0x43, 0x84, 0x45, //
    0x38, 0x03, 0x31, 0x45, 0x0F, 0x45, 0x38, 0x03, 0x00, 0x00, 0x81, 0x00, 0x00, 0x81, 0x00, 0x00, //
    0x81, 0x00, 0x00, 0x81, 0x00, 0x00, 0x81, 0x00, 0x00, 0x81, 0x00, 0x00, 0x81, 0x00, 0x00, 0x81,
];
/// `SERIAL_NUMBER_RESPONSE` decoded.
pub const SERIAL_NUMBER: &str = "7ED625EC2CE81EE8";

pub const READ_MEASUREMENT_REQUEST: [u8; 2] = [0x03, 0x00];

/// Measurement in clean indoor air.
pub const MEASUREMENT_LOW_PARTICLE_RESPONSE: [u8; 60] = [
    0x3E, 0x26, 0x7E, 0xCE, 0x1B, 0xEF, 0x3E, 0x87, 0xB3, 0x69, 0x38, 0x6B, 0x3E, 0xAD, 0xEE, 0x9F, //
    0xB5, 0x1F, 0x3E, 0xB5, 0x14, 0x44, 0x30, 0x4E, 0x3F, 0x63, 0x42, 0xE2, 0x81, 0x65, 0x3F, 0x97, //
    0x04, 0x9A, 0x61, 0xA8, 0x3F, 0xA5, 0xA3, 0xA3, 0xB3, 0xBF, 0x3F, 0xA8, 0xEF, 0x7D, 0x73, 0x51, //
    0x3F, 0xA8, 0xEF, 0xE7, 0x4E, 0x7B, 0x3F, 0x38, 0xD6, 0x6C, 0x7D, 0xD4,
];

/// `MEASUREMENT_LOW_PARTICLE_RESPONSE` decoded, as `f32` bit patterns in wire order.
pub const MEASUREMENT_LOW_PARTICLE_BITS: [u32; 10] = [
    0x3E26_CE1B, // mc 1.0   0.1628956049680710
    0x3E87_6938, // mc 2.5   0.2644746303558350
    0x3EAD_9FB5, // mc 4.0   0.3391090929508209
    0x3EB5_4430, // mc 10    0.3540358543395996
    0x3F63_E281, // nc 0.5   0.8901749253273010
    0x3F97_9A61, // nc 1.0   1.1843987703323364
    0x3FA5_A3B3, // nc 2.5   1.2940582036972046
    0x3FA8_7D73, // nc 4.0   1.3163284063339233
    0x3FA8_E74E, // nc 10    1.3195588588714600
    0x3F38_6C7D, // typical  0.7204053997993469
];

/// Measurement with no particles detected. Typical size reads 1.63 µm.
pub const MEASUREMENT_ZERO_PARTICLE_RESPONSE: [u8; 60] = [
    0x00, 0x00, 0x81, 0x00, 0x00, 0x81, 0x00, 0x00, 0x81, 0x00, 0x00, 0x81, 0x00, 0x00, 0x81, 0x00, //
    0x00, 0x81, 0x00, 0x00, 0x81, 0x00, 0x00, 0x81, 0x00, 0x00, 0x81, 0x00, 0x00, 0x81, 0x00, 0x00, //
    0x81, 0x00, 0x00, 0x81, 0x00, 0x00, 0x81, 0x00, 0x00, 0x81, 0x00, 0x00, 0x81, 0x00, 0x00, 0x81, //
    0x00, 0x00, 0x81, 0x00, 0x00, 0x81, 0x3F, 0xD0, 0xAE, 0xA3, 0xD7, 0xC0,
];
