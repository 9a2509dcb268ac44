// src/common/frame.rs

use super::command::Command;
use super::crc::{calculate_crc8, verify_word, FRAMED_WORD_LEN, WORD_LEN};
use super::error::Sps30Error;
use arrayvec::ArrayVec;

/// Largest unframed write payload of any command (the auto-clean interval).
pub const MAX_WRITE_LEN: usize = 4;
/// Largest framed response of any command (a float measurement).
pub const MAX_READ_LEN: usize = 60;
/// Address bytes plus the largest framed payload.
pub const MAX_FRAME_LEN: usize = 2 + framed_len(MAX_WRITE_LEN);

/// Number of bytes `data_len` data bytes occupy on the wire.
pub const fn framed_len(data_len: usize) -> usize {
    data_len / WORD_LEN * FRAMED_WORD_LEN
}

/// Number of data bytes carried by `framed_len` wire bytes.
pub const fn unframed_len(framed_len: usize) -> usize {
    framed_len / FRAMED_WORD_LEN * WORD_LEN
}

/// An encoded command: 2 address bytes followed by checksummed data words.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CommandFrame {
    command: Command,
    bytes: ArrayVec<u8, MAX_FRAME_LEN>,
}

impl CommandFrame {
    pub fn command(&self) -> Command {
        self.command
    }

    pub fn address(&self) -> u16 {
        self.command.address()
    }

    /// The complete frame as sent on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The framed data after the address bytes. Empty for read requests.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[2..]
    }
}

/// Encodes a command into its wire frame.
///
/// `payload` is the unframed data; a checksum byte is inserted after every
/// 2 data bytes. Commands without a write payload encode to the address
/// bytes only.
///
/// # Returns
///
/// * `Ok(CommandFrame)` on success.
/// * `Err(Sps30Error::InvalidPayloadLength)` if the payload size does not
///   equal the command's declared write length (`None` counts as 0).
pub fn encode_command<E>(command: Command, payload: Option<&[u8]>) -> Result<CommandFrame, Sps30Error<E>>
where
    E: core::fmt::Debug,
{
    let data = payload.unwrap_or(&[]);
    let expected = command.write_len();
    if data.len() != expected {
        return Err(Sps30Error::InvalidPayloadLength { expected, got: data.len() });
    }

    let mut bytes = ArrayVec::<u8, MAX_FRAME_LEN>::new();
    bytes.extend(command.address().to_be_bytes());
    for word in data.chunks_exact(WORD_LEN) {
        bytes.extend([word[0], word[1], calculate_crc8(word)]);
    }

    Ok(CommandFrame { command, bytes })
}

/// Frames a data stream: writes `[d0, d1, crc, d2, d3, crc, ...]` into `out`.
///
/// # Returns
///
/// * `Ok(n)` with the number of bytes written to `out`.
/// * `Err(Sps30Error::InvalidPayloadLength)` if `data` is not word aligned.
/// * `Err(Sps30Error::UnexpectedLength)` if `out` is too small.
pub fn encode_words<E>(data: &[u8], out: &mut [u8]) -> Result<usize, Sps30Error<E>>
where
    E: core::fmt::Debug,
{
    if data.len() % WORD_LEN != 0 {
        return Err(Sps30Error::InvalidPayloadLength {
            expected: data.len() + 1,
            got: data.len(),
        });
    }
    let needed = framed_len(data.len());
    if out.len() < needed {
        return Err(Sps30Error::UnexpectedLength { expected: needed, got: out.len() });
    }

    for (word, slot) in data
        .chunks_exact(WORD_LEN)
        .zip(out.chunks_exact_mut(FRAMED_WORD_LEN))
    {
        slot[0] = word[0];
        slot[1] = word[1];
        slot[2] = calculate_crc8(word);
    }
    Ok(needed)
}

/// Validates and strips the checksums from a framed response.
///
/// Every 3-byte group is checked before its 2 data bytes are copied into
/// `out`. Nothing after the first bad group is copied.
///
/// # Returns
///
/// * `Ok(n)` with the number of data bytes written to `out`.
/// * `Err(Sps30Error::UnexpectedLength)` if `raw` is not a whole number of
///   framed words, or `out` is too small.
/// * `Err(Sps30Error::ChecksumMismatch)` naming the index of the first bad
///   checksum byte in `raw`.
pub fn strip_checksums<E>(raw: &[u8], out: &mut [u8]) -> Result<usize, Sps30Error<E>>
where
    E: core::fmt::Debug,
{
    if raw.len() % FRAMED_WORD_LEN != 0 {
        return Err(Sps30Error::UnexpectedLength {
            expected: (raw.len() / FRAMED_WORD_LEN + 1) * FRAMED_WORD_LEN,
            got: raw.len(),
        });
    }
    let needed = unframed_len(raw.len());
    if out.len() < needed {
        return Err(Sps30Error::UnexpectedLength { expected: needed, got: out.len() });
    }

    for (i, (framed, slot)) in raw
        .chunks_exact(FRAMED_WORD_LEN)
        .zip(out.chunks_exact_mut(WORD_LEN))
        .enumerate()
    {
        let position = i * FRAMED_WORD_LEN + WORD_LEN;
        slot.copy_from_slice(&verify_word(framed, position)?);
    }
    Ok(needed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::command::MEASUREMENT_OUTPUT_FORMAT_FLOAT;

    #[test]
    fn test_read_commands_encode_to_address_only() {
        let frame = encode_command::<()>(Command::GetSerial, None).unwrap();
        assert_eq!(frame.as_bytes(), &[0xD0, 0x33]);
        assert!(frame.payload().is_empty());
        assert_eq!(frame.address(), 0xD033);

        let frame = encode_command::<()>(Command::GetFirmwareVersion, None).unwrap();
        assert_eq!(frame.as_bytes(), &[0xD1, 0x00]);

        let frame = encode_command::<()>(Command::WakeUp, Some(&[])).unwrap();
        assert_eq!(frame.as_bytes(), &[0x11, 0x03]);
    }

    #[test]
    fn test_start_measurement_frame() {
        let frame =
            encode_command::<()>(Command::StartMeasurement, Some(&MEASUREMENT_OUTPUT_FORMAT_FLOAT)).unwrap();
        assert_eq!(frame.as_bytes(), &[0x00, 0x10, 0x03, 0x00, 0xAC]);
        assert_eq!(frame.payload(), &[0x03, 0x00, 0xAC]);
        assert_eq!(frame.command(), Command::StartMeasurement);
    }

    #[test]
    fn test_set_auto_clean_interval_frame() {
        let frame = encode_command::<()>(Command::SetAutoCleanInterval, Some(&39_288u32.to_be_bytes())).unwrap();
        assert_eq!(frame.as_bytes(), &[0x80, 0x04, 0x00, 0x00, 0x81, 0x99, 0x78, 0x4E]);

        let frame = encode_command::<()>(Command::SetAutoCleanInterval, Some(&172_800u32.to_be_bytes())).unwrap();
        assert_eq!(frame.as_bytes(), &[0x80, 0x04, 0x00, 0x02, 0xE3, 0xA3, 0x00, 0x53]);
    }

    #[test]
    fn test_invalid_payload_length() {
        assert!(matches!(
            encode_command::<()>(Command::StartMeasurement, None),
            Err(Sps30Error::InvalidPayloadLength { expected: 2, got: 0 })
        ));
        assert!(matches!(
            encode_command::<()>(Command::SetAutoCleanInterval, Some(&[0x00, 0x01])),
            Err(Sps30Error::InvalidPayloadLength { expected: 4, got: 2 })
        ));
        assert!(matches!(
            encode_command::<()>(Command::Reset, Some(&[0x00, 0x01])),
            Err(Sps30Error::InvalidPayloadLength { expected: 0, got: 2 })
        ));
    }

    #[test]
    fn test_encode_words() {
        let mut out = [0u8; 6];
        let n = encode_words::<()>(&[0x00, 0x10, 0x00, 0x00], &mut out).unwrap();
        assert_eq!(n, 6);
        assert_eq!(out, [0x00, 0x10, 0xC2, 0x00, 0x00, 0x81]);

        assert!(matches!(
            encode_words::<()>(&[0x00, 0x10, 0x00], &mut out),
            Err(Sps30Error::InvalidPayloadLength { .. })
        ));
        assert!(matches!(
            encode_words::<()>(&[0u8; 6], &mut out),
            Err(Sps30Error::UnexpectedLength { expected: 9, got: 6 })
        ));
    }

    #[test]
    fn test_strip_checksums() {
        let raw = [0x00, 0x02, 0xE3, 0xA3, 0x00, 0x53];
        let mut data = [0u8; 4];
        assert_eq!(strip_checksums::<()>(&raw, &mut data).unwrap(), 4);
        assert_eq!(u32::from_be_bytes(data), 172_800);
    }

    #[test]
    fn test_strip_checksums_reports_failing_position() {
        let raw = [0x00, 0x02, 0xE3, 0xA3, 0x00, 0x54];
        let mut data = [0u8; 4];
        assert!(matches!(
            strip_checksums::<()>(&raw, &mut data),
            Err(Sps30Error::ChecksumMismatch { position: 5, expected: 0x54, calculated: 0x53 })
        ));
    }

    #[test]
    fn test_strip_checksums_bad_lengths() {
        let mut data = [0u8; 4];
        assert!(matches!(
            strip_checksums::<()>(&[0x00, 0x02, 0xE3, 0xA3], &mut data),
            Err(Sps30Error::UnexpectedLength { expected: 6, got: 4 })
        ));
        assert!(matches!(
            strip_checksums::<()>(&[0u8; 9], &mut data),
            Err(Sps30Error::UnexpectedLength { expected: 6, got: 4 })
        ));
    }

    #[test]
    fn test_framed_lengths() {
        assert_eq!(framed_len(40), 60);
        assert_eq!(unframed_len(48), 32);
        assert_eq!(MAX_FRAME_LEN, 8);
    }
}
