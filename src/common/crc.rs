// src/common/crc.rs

use super::error::Sps30Error;
use crc::{Algorithm, Crc};

/// Custom CRC algorithm matching the Sensirion sensor datasheets (CRC-8).
/// Polynomial: 0x31 (x^8 + x^5 + x^4 + 1)
/// Initial Value: 0xFF
/// Input Reflected: false
/// Output Reflected: false
/// Final XOR: 0x00
/// Check Value: 0xF7 (for "123456789")
/// Residue: 0x00
pub const SENSIRION_CRC: Algorithm<u8> = Algorithm {
    width: 8,
    poly: 0x31,
    init: 0xFF,
    refin: false,
    refout: false,
    xorout: 0x00,
    check: 0xF7,
    residue: 0x00,
};

// Create a Crc instance for the Sensirion algorithm for reuse.
const CRC_COMPUTER: Crc<u8> = Crc::<u8>::new(&SENSIRION_CRC);

/// Size of one data word on the wire, without its checksum.
pub const WORD_LEN: usize = 2;
/// Size of one data word on the wire, including its checksum.
pub const FRAMED_WORD_LEN: usize = WORD_LEN + 1;

/// Calculates the Sensirion CRC-8 for the given data buffer.
///
/// The sensor computes one checksum per 2-byte word, so `data` is
/// normally exactly two bytes long.
#[inline]
pub fn calculate_crc8(data: &[u8]) -> u8 {
    CRC_COMPUTER.checksum(data)
}

/// Verifies one framed word (`[hi, lo, crc]`).
///
/// `position` is the index of the checksum byte inside the full response
/// and is only used to populate the error.
///
/// # Returns
///
/// * `Ok([hi, lo])` if the checksum matches.
/// * `Err(Sps30Error::UnexpectedLength)` if `framed` is not 3 bytes long.
/// * `Err(Sps30Error::ChecksumMismatch)` if the checksums don't match.
pub fn verify_word<E>(framed: &[u8], position: usize) -> Result<[u8; WORD_LEN], Sps30Error<E>>
where
    E: core::fmt::Debug,
{
    if framed.len() != FRAMED_WORD_LEN {
        return Err(Sps30Error::UnexpectedLength {
            expected: FRAMED_WORD_LEN,
            got: framed.len(),
        });
    }
    let word = [framed[0], framed[1]];
    let calculated = calculate_crc8(&word);
    let expected = framed[WORD_LEN];

    if calculated == expected {
        Ok(word)
    } else {
        Err(Sps30Error::ChecksumMismatch {
            position,
            expected,
            calculated,
        })
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        assert_eq!(calculate_crc8(b"123456789"), 0xF7);
    }

    #[test]
    fn test_datasheet_example() {
        // Datasheet example: CRC(0xBEEF) = 0x92
        assert_eq!(calculate_crc8(&[0xBE, 0xEF]), 0x92);
    }

    #[test]
    fn test_recorded_words() {
        // Taken from captured bus traffic
        assert_eq!(calculate_crc8(&[0x02, 0x02]), 0x3A); // firmware 2.2
        assert_eq!(calculate_crc8(&[0x03, 0x00]), 0xAC); // start measurement argument
        assert_eq!(calculate_crc8(&[0x37, 0x45]), 0x55); // serial "7E"
        assert_eq!(calculate_crc8(&[0x00, 0x00]), 0x81);
        assert_eq!(calculate_crc8(&[0x00, 0x01]), 0xB0);
    }

    #[test]
    fn test_verify_word_ok() {
        let word = verify_word::<()>(&[0x3E, 0x26, 0x7E], 2).unwrap();
        assert_eq!(word, [0x3E, 0x26]);
    }

    #[test]
    fn test_verify_word_mismatch_reports_position() {
        let result = verify_word::<()>(&[0x3E, 0x26, 0x7F], 5);
        assert!(matches!(
            result,
            Err(Sps30Error::ChecksumMismatch { position: 5, expected: 0x7F, calculated: 0x7E })
        ));
    }

    #[test]
    fn test_verify_word_bad_length() {
        assert!(matches!(
            verify_word::<()>(&[0x3E, 0x26], 2),
            Err(Sps30Error::UnexpectedLength { expected: 3, got: 2 })
        ));
        assert!(matches!(
            verify_word::<()>(&[], 2),
            Err(Sps30Error::UnexpectedLength { expected: 3, got: 0 })
        ));
    }

    #[test]
    fn test_every_single_bit_flip_is_detected() {
        let word = [0x3E, 0x26];
        let crc = calculate_crc8(&word);
        for byte in 0..3 {
            for bit in 0..8 {
                let mut framed = [word[0], word[1], crc];
                framed[byte] ^= 1 << bit;
                assert!(
                    matches!(verify_word::<()>(&framed, 2), Err(Sps30Error::ChecksumMismatch { .. })),
                    "flip of byte {} bit {} went undetected",
                    byte,
                    bit
                );
            }
        }
    }
}
