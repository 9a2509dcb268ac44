// src/common/hal_traits.rs

use core::fmt::Debug;

/// Byte-level access to an SPS-30.
///
/// Implementations move already-framed bytes; checksums are produced and
/// verified by the driver. Bus-level timing (such as the delay between the
/// pointer write and the data read) is the implementation's responsibility.
///
/// Implemented for `&mut T`, so a driver can borrow a transport that the
/// caller keeps owning.
pub trait Sps30Transport {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Writes the command `address` (big-endian) followed by `payload`.
    ///
    /// `payload` is the framed data (2 data bytes + 1 checksum byte per
    /// word) and is empty for commands without arguments.
    fn write(&mut self, address: u16, payload: &[u8]) -> Result<(), Self::Error>;

    /// Writes the command `address`, then fills `buffer` with the framed
    /// response. `buffer.len()` is the exact number of bytes to read.
    fn read(&mut self, address: u16, buffer: &mut [u8]) -> Result<(), Self::Error>;
}

impl<T> Sps30Transport for &mut T
where
    T: Sps30Transport + ?Sized,
{
    type Error = T::Error;

    #[inline]
    fn write(&mut self, address: u16, payload: &[u8]) -> Result<(), Self::Error> {
        (**self).write(address, payload)
    }

    #[inline]
    fn read(&mut self, address: u16, buffer: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read(address, buffer)
    }
}
