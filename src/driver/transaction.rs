// src/driver/transaction.rs

use super::Sps30;
use crate::common::{
    command::Command,
    error::Sps30Error,
    frame::{encode_command, MAX_READ_LEN},
    hal_traits::Sps30Transport,
    types::{SensorState, Version},
};
use log::{debug, warn};

impl<T> Sps30<T>
where
    T: Sps30Transport,
{
    /// Fails with `InvalidState` unless the sensor is in one of `allowed`.
    pub(super) fn require_state(&self, allowed: &[SensorState]) -> Result<(), Sps30Error<T::Error>> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            debug!("{:?} rejected in state {:?}", allowed, self.state);
            Err(Sps30Error::InvalidState { state: self.state })
        }
    }

    /// Fails with `FirmwareUnsupported` if the cached firmware is older than
    /// `required`.
    pub(super) fn require_firmware(&self, required: Version) -> Result<(), Sps30Error<T::Error>> {
        let actual = self.firmware_version()?;
        if actual >= required {
            Ok(())
        } else {
            Err(Sps30Error::FirmwareUnsupported { required, actual })
        }
    }

    pub(super) fn transition(&mut self, next: SensorState) {
        if self.state != next {
            debug!("SPS-30 state {:?} -> {:?}", self.state, next);
        }
        self.state = next;
    }

    /// Encodes and sends a write-only command.
    pub(super) fn execute_write(
        &mut self,
        command: Command,
        payload: Option<&[u8]>,
    ) -> Result<(), Sps30Error<T::Error>> {
        let frame = encode_command(command, payload)?;
        debug!("SPS-30 write {} {:02X?}", command, frame.as_bytes());
        self.interface
            .write(frame.address(), frame.payload())
            .map_err(Sps30Error::Bus)
    }

    /// Reads the response of `command` and decodes it with `parse`.
    ///
    /// Checksum and length failures are logged here; the caller only sees
    /// the error.
    pub(super) fn execute_read<V>(
        &mut self,
        command: Command,
        parse: fn(&[u8]) -> Result<V, Sps30Error<T::Error>>,
    ) -> Result<V, Sps30Error<T::Error>> {
        let mut buffer = [0u8; MAX_READ_LEN];
        let raw = &mut buffer[..command.read_len()];

        debug!("SPS-30 read {}", command);
        self.interface
            .read(command.address(), raw)
            .map_err(Sps30Error::Bus)?;

        parse(raw).map_err(|e| {
            if e.is_frame_error() {
                warn!("SPS-30 {} response rejected: {}", command, e);
            }
            e
        })
    }
}
