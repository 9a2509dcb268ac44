// src/transport/recorded.rs

//! A simulated SPS-30 that answers with recorded frames.
//!
//! The device keeps its own state per instance: measurement mode, sleep
//! mode, the non-volatile auto-clean interval and a queue of measurement
//! frames. Incoming frames are checksum-verified the way the sensor does,
//! and commands the real device would refuse are NACKed.

use crate::common::command::{Command, MEASUREMENT_OUTPUT_FORMAT_FLOAT};
use crate::common::frame::{encode_words, framed_len, strip_checksums, MAX_WRITE_LEN};
use crate::common::hal_traits::Sps30Transport;
use crate::common::types::{AutoCleanInterval, DeviceStatus, Version, SERIAL_NUMBER_CAPACITY};
use crate::common::Sps30Error;
use crate::fixtures;
use heapless::Deque;
use log::debug;

/// Measurement frames one simulated device can queue.
pub const MEASUREMENT_QUEUE_DEPTH: usize = 8;
/// Commands kept in the history, oldest dropped first.
pub const HISTORY_DEPTH: usize = 32;

const MEASUREMENT_FRAME_LEN: usize = 60;

/// Conditions under which the simulated device refuses a transfer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RecordedError {
    /// The device did not acknowledge (asleep, wrong mode, unsupported).
    Nack { address: u16 },
    /// No command matches the address and payload length.
    UnknownCommand { address: u16 },
    /// A written word failed its checksum; `position` indexes the payload.
    Checksum { position: usize },
    /// The command argument is not one the device accepts.
    InvalidArgument { address: u16 },
    /// The read buffer does not match the command's response length.
    LengthMismatch { expected: usize, got: usize },
}

/// Builder for a `RecordedTransport`.
#[derive(Debug, Clone)]
pub struct RecordedDevice {
    serial: [u8; SERIAL_NUMBER_CAPACITY],
    version: Version,
    auto_clean_interval: AutoCleanInterval,
    status: DeviceStatus,
    measurements: Deque<[u8; MEASUREMENT_FRAME_LEN], MEASUREMENT_QUEUE_DEPTH>,
}

impl Default for RecordedDevice {
    /// The recorded sensor: serial `7ED625EC2CE81EE8`, firmware 2.2, factory
    /// auto-clean interval, no status flag, no queued measurements.
    fn default() -> Self {
        let mut serial = [0u8; SERIAL_NUMBER_CAPACITY];
        let recorded = fixtures::SERIAL_NUMBER.as_bytes();
        serial[..recorded.len()].copy_from_slice(recorded);
        RecordedDevice {
            serial,
            version: Version::new(2, 2),
            auto_clean_interval: AutoCleanInterval::DEFAULT,
            status: DeviceStatus::default(),
            measurements: Deque::new(),
        }
    }
}

impl RecordedDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the raw serial number bytes. Longer input is truncated to 32
    /// bytes, shorter input is NUL-padded.
    pub fn serial(mut self, serial: &[u8]) -> Self {
        self.serial = [0u8; SERIAL_NUMBER_CAPACITY];
        let len = serial.len().min(SERIAL_NUMBER_CAPACITY);
        self.serial[..len].copy_from_slice(&serial[..len]);
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn auto_clean_interval(mut self, interval: AutoCleanInterval) -> Self {
        self.auto_clean_interval = interval;
        self
    }

    pub fn status(mut self, status: DeviceStatus) -> Self {
        self.status = status;
        self
    }

    /// Queues a framed measurement response. Frames beyond
    /// `MEASUREMENT_QUEUE_DEPTH` are dropped.
    pub fn measurement(mut self, frame: [u8; MEASUREMENT_FRAME_LEN]) -> Self {
        if self.measurements.push_back(frame).is_err() {
            debug!("recorded device: measurement queue full, frame dropped");
        }
        self
    }

    pub fn build(self) -> RecordedTransport {
        RecordedTransport {
            device: self,
            measuring: false,
            sleeping: false,
            interface_awake: false,
            last_measurement: None,
            history: Deque::new(),
        }
    }
}

/// `Sps30Transport` backed by a simulated device.
#[derive(Debug, Clone)]
pub struct RecordedTransport {
    device: RecordedDevice,
    measuring: bool,
    sleeping: bool,
    // Set by the first WakeUp after sleep; the second one wakes the device
    interface_awake: bool,
    last_measurement: Option<[u8; MEASUREMENT_FRAME_LEN]>,
    history: Deque<Command, HISTORY_DEPTH>,
}

impl Default for RecordedTransport {
    fn default() -> Self {
        RecordedDevice::default().build()
    }
}

impl RecordedTransport {
    /// The recorded sensor with the recorded low- and zero-particle
    /// measurements queued, in that order.
    pub fn recorded() -> Self {
        RecordedDevice::default()
            .measurement(fixtures::MEASUREMENT_LOW_PARTICLE_RESPONSE)
            .measurement(fixtures::MEASUREMENT_ZERO_PARTICLE_RESPONSE)
            .build()
    }

    pub fn is_measuring(&self) -> bool {
        self.measuring
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// The interval stored in the device's non-volatile memory.
    pub fn auto_clean_interval(&self) -> AutoCleanInterval {
        self.device.auto_clean_interval
    }

    /// Commands the device accepted or refused, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Command> {
        self.history.iter()
    }

    /// Queued measurement frames not yet read.
    pub fn pending_measurements(&self) -> usize {
        self.device.measurements.len()
    }

    fn record(&mut self, command: Command) {
        if self.history.is_full() {
            self.history.pop_front();
        }
        // Cannot fail after the pop above
        let _ = self.history.push_back(command);
    }

    fn lookup(address: u16, matches: impl Fn(Command) -> bool) -> Result<Command, RecordedError> {
        Command::ALL
            .into_iter()
            .find(|c| c.address() == address && matches(*c))
            .ok_or(RecordedError::UnknownCommand { address })
    }

    fn require_awake(&self, address: u16) -> Result<(), RecordedError> {
        if self.sleeping {
            Err(RecordedError::Nack { address })
        } else {
            Ok(())
        }
    }

    fn write_command(&mut self, command: Command, data: &[u8]) -> Result<(), RecordedError> {
        let address = command.address();
        if command == Command::WakeUp {
            if !self.sleeping {
                return Ok(());
            }
            if !self.interface_awake {
                // The first WakeUp only powers up the interface and is NACKed
                self.interface_awake = true;
                return Err(RecordedError::Nack { address });
            }
            self.sleeping = false;
            self.interface_awake = false;
            return Ok(());
        }
        self.require_awake(address)?;

        match command {
            Command::StartMeasurement => {
                if data != MEASUREMENT_OUTPUT_FORMAT_FLOAT {
                    return Err(RecordedError::InvalidArgument { address });
                }
                self.measuring = true;
            }
            Command::StopMeasurement => self.measuring = false,
            Command::SetAutoCleanInterval => {
                let bytes = [data[0], data[1], data[2], data[3]];
                self.device.auto_clean_interval = AutoCleanInterval::from_be_bytes(bytes);
            }
            Command::Reset => {
                self.measuring = false;
                self.last_measurement = None;
            }
            Command::Sleep => {
                if self.measuring || self.device.version < Version::new(2, 0) {
                    return Err(RecordedError::Nack { address });
                }
                self.sleeping = true;
            }
            Command::StartManualFanClean => {
                if !self.measuring {
                    return Err(RecordedError::Nack { address });
                }
            }
            _ => return Err(RecordedError::UnknownCommand { address }),
        }
        Ok(())
    }

    fn read_command(&mut self, command: Command, buffer: &mut [u8]) -> Result<(), RecordedError> {
        let address = command.address();
        self.require_awake(address)?;

        match command {
            Command::ReadMeasurement => {
                if !self.measuring {
                    return Err(RecordedError::Nack { address });
                }
                // The device repeats the last sample until a new one is ready
                if let Some(frame) = self.device.measurements.pop_front() {
                    self.last_measurement = Some(frame);
                }
                let frame = self.last_measurement.unwrap_or(fixtures::MEASUREMENT_ZERO_PARTICLE_RESPONSE);
                buffer.copy_from_slice(&frame);
                Ok(())
            }
            Command::GetDataReady => {
                let ready = self.measuring && !self.device.measurements.is_empty();
                frame_into(&u16::from(ready).to_be_bytes(), buffer)
            }
            Command::GetAutoCleanInterval => frame_into(&self.device.auto_clean_interval.to_be_bytes(), buffer),
            Command::GetFirmwareVersion => frame_into(&self.device.version.to_be_bytes(), buffer),
            Command::GetSerial => frame_into(&self.device.serial, buffer),
            Command::ReadDeviceStatus => {
                if self.device.version < Version::new(2, 2) {
                    return Err(RecordedError::Nack { address });
                }
                frame_into(&self.device.status.bits().to_be_bytes(), buffer)
            }
            _ => Err(RecordedError::UnknownCommand { address }),
        }
    }
}

fn frame_into(data: &[u8], buffer: &mut [u8]) -> Result<(), RecordedError> {
    encode_words::<()>(data, buffer)
        .map(|_| ())
        .map_err(|_| RecordedError::LengthMismatch { expected: framed_len(data.len()), got: buffer.len() })
}

impl Sps30Transport for RecordedTransport {
    type Error = RecordedError;

    fn write(&mut self, address: u16, payload: &[u8]) -> Result<(), Self::Error> {
        let command = Self::lookup(address, |c| framed_len(c.write_len()) == payload.len() && c.read_len() == 0)?;
        self.record(command);

        let mut data = [0u8; MAX_WRITE_LEN];
        let len = strip_checksums::<()>(payload, &mut data).map_err(|e| match e {
            Sps30Error::ChecksumMismatch { position, .. } => RecordedError::Checksum { position },
            _ => RecordedError::UnknownCommand { address },
        })?;
        self.write_command(command, &data[..len])
    }

    fn read(&mut self, address: u16, buffer: &mut [u8]) -> Result<(), Self::Error> {
        let command = Self::lookup(address, |c| c.requires_response())?;
        self.record(command);

        if buffer.len() != command.read_len() {
            return Err(RecordedError::LengthMismatch { expected: command.read_len(), got: buffer.len() });
        }
        self.read_command(command, buffer)
    }
}
