// src/common/response/parse.rs

use super::Response;

use crate::common::command::{Command, ResponseShape};
use crate::common::error::Sps30Error;
use crate::common::frame::{strip_checksums, unframed_len};
use crate::common::types::{
    AutoCleanInterval, DeviceStatus, Measurement, SerialNumber, Version, MEASUREMENT_VALUES, SERIAL_NUMBER_CAPACITY,
    SERIAL_NUMBER_MAX_LEN,
};

use core::fmt::Debug;

// --- Internal Helpers ---

/// Checks `raw` against the command's declared response length and returns
/// its data bytes. `N` must equal the unframed response length.
fn unframe<E: Debug, const N: usize>(command: Command, raw: &[u8]) -> Result<[u8; N], Sps30Error<E>> {
    let expected = command.read_len();
    if raw.len() != expected {
        return Err(Sps30Error::UnexpectedLength { expected, got: raw.len() });
    }
    debug_assert_eq!(unframed_len(expected), N);

    let mut data = [0u8; N];
    strip_checksums(raw, &mut data)?;
    Ok(data)
}

// --- Public Parsing Functions ---

/// Decodes the raw response of `command`.
///
/// Write-only commands decode to `Response::Empty` and require `raw` to be
/// empty.
///
/// # Returns
///
/// * `Err(Sps30Error::UnexpectedLength)` if `raw` is not exactly the
///   command's declared response length.
/// * `Err(Sps30Error::ChecksumMismatch)` for the first corrupted word.
/// * `Err(Sps30Error::InvalidCharacter)` for a non-ASCII serial number.
pub fn decode_response<E: Debug>(command: Command, raw: &[u8]) -> Result<Response, Sps30Error<E>> {
    let spec = command.spec();
    if raw.len() != spec.read_len {
        return Err(Sps30Error::UnexpectedLength { expected: spec.read_len, got: raw.len() });
    }

    let response = match spec.shape {
        ResponseShape::Empty => Response::Empty,
        ResponseShape::DataReady => Response::DataReady(parse_data_ready(raw)?),
        ResponseShape::Measurement => Response::Measurement(parse_measurement(raw)?),
        ResponseShape::AutoCleanInterval => Response::AutoCleanInterval(parse_auto_clean_interval(raw)?),
        ResponseShape::Version => Response::Version(parse_version(raw)?),
        ResponseShape::Serial => Response::Serial(parse_serial(raw)?),
        ResponseShape::DeviceStatus => Response::DeviceStatus(parse_device_status(raw)?),
    };
    Ok(response)
}

/// Parses the 3-byte `GetFirmwareVersion` response (major, minor).
pub fn parse_version<E: Debug>(raw: &[u8]) -> Result<Version, Sps30Error<E>> {
    let data = unframe::<E, 2>(Command::GetFirmwareVersion, raw)?;
    Ok(Version::from_be_bytes(data))
}

/// Parses the 48-byte `GetSerial` response.
///
/// The device pads the serial number with NUL bytes; decoding stops at the
/// first NUL. The last byte of the field is reserved for the terminator, so
/// at most `SERIAL_NUMBER_MAX_LEN` characters are kept. Every byte before
/// the terminator must be ASCII.
pub fn parse_serial<E: Debug>(raw: &[u8]) -> Result<SerialNumber, Sps30Error<E>> {
    let data = unframe::<E, SERIAL_NUMBER_CAPACITY>(Command::GetSerial, raw)?;

    let mut value = heapless::String::<SERIAL_NUMBER_CAPACITY>::new();
    for &byte in data[..SERIAL_NUMBER_MAX_LEN].iter().take_while(|&&b| b != 0) {
        if !byte.is_ascii() {
            return Err(Sps30Error::InvalidCharacter(byte));
        }
        // Cannot overflow: at most SERIAL_NUMBER_MAX_LEN bytes are pushed
        value.push(char::from(byte)).map_err(|_| Sps30Error::UnexpectedLength {
            expected: SERIAL_NUMBER_CAPACITY,
            got: SERIAL_NUMBER_CAPACITY + 1,
        })?;
    }
    Ok(SerialNumber::new(value))
}

/// Parses the 6-byte `GetAutoCleanInterval` response (big-endian seconds).
pub fn parse_auto_clean_interval<E: Debug>(raw: &[u8]) -> Result<AutoCleanInterval, Sps30Error<E>> {
    let data = unframe::<E, 4>(Command::GetAutoCleanInterval, raw)?;
    Ok(AutoCleanInterval::from_be_bytes(data))
}

/// Parses the 6-byte `ReadDeviceStatus` response (big-endian bitmask).
pub fn parse_device_status<E: Debug>(raw: &[u8]) -> Result<DeviceStatus, Sps30Error<E>> {
    let data = unframe::<E, 4>(Command::ReadDeviceStatus, raw)?;
    Ok(DeviceStatus::from_bits(u32::from_be_bytes(data)))
}

/// Parses the 60-byte float `ReadMeasurement` response.
///
/// Values are taken bit-for-bit; no rounding or range checks are applied.
pub fn parse_measurement<E: Debug>(raw: &[u8]) -> Result<Measurement, Sps30Error<E>> {
    let data = unframe::<E, { MEASUREMENT_VALUES * 4 }>(Command::ReadMeasurement, raw)?;

    let mut values = [0f32; MEASUREMENT_VALUES];
    for (value, bytes) in values.iter_mut().zip(data.chunks_exact(4)) {
        *value = f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    Ok(Measurement::from_values(values))
}

/// Parses the 3-byte `GetDataReady` response. Any nonzero word means ready.
pub fn parse_data_ready<E: Debug>(raw: &[u8]) -> Result<bool, Sps30Error<E>> {
    let data = unframe::<E, 2>(Command::GetDataReady, raw)?;
    Ok(u16::from_be_bytes(data) != 0)
}
