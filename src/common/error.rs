// src/common/error.rs

use super::types::{SensorState, Version};

/// Errors reported by the SPS-30 driver and its frame codec.
///
/// `E` is the transport's error type. Functions that cannot touch the bus
/// (the codec) are generic over `E` so every layer shares one error type.
#[derive(Debug, thiserror::Error)]
pub enum Sps30Error<E = ()>
where
    E: core::fmt::Debug,
{
    /// Underlying bus error from the transport implementation.
    #[error("Bus error: {0:?}")]
    Bus(E),

    /// The operation is not legal in the sensor's current state.
    #[error("Operation not valid in state {state:?}")]
    InvalidState { state: SensorState },

    /// A response word failed its CRC-8 check.
    /// `position` is the index of the checksum byte in the raw response.
    #[error("Checksum mismatch at byte {position}: received {expected:#04x}, calculated {calculated:#04x}")]
    ChecksumMismatch {
        position: usize,
        expected: u8,
        calculated: u8,
    },

    /// Raw response length disagrees with the command's declared length.
    #[error("Unexpected length: expected {expected}, got {got}")]
    UnexpectedLength { expected: usize, got: usize },

    /// The cached firmware version is too old for the requested command.
    #[error("Firmware {actual} does not support this command (requires {required})")]
    FirmwareUnsupported { required: Version, actual: Version },

    /// Write payload size does not match the command's declared write length.
    /// This is a defect in the caller, not a bus condition.
    #[error("Invalid payload length: expected {expected}, got {got}")]
    InvalidPayloadLength { expected: usize, got: usize },

    /// Non-ASCII byte found where ASCII text was expected (serial number).
    #[error("Invalid character received: {0:#04x}")]
    InvalidCharacter(u8),
}

impl<E: core::fmt::Debug> Sps30Error<E> {
    /// Returns true for errors caused by a corrupted or truncated frame.
    /// Retrying the same transaction is a reasonable reaction to these.
    pub fn is_frame_error(&self) -> bool {
        matches!(
            self,
            Sps30Error::ChecksumMismatch { .. } | Sps30Error::UnexpectedLength { .. }
        )
    }
}
