//! SPS-30 I2C command definitions.
//!
//! Every command is a 16-bit pointer address sent big-endian, optionally
//! followed by CRC-protected data words. See the SPS-30 datasheet,
//! Section 6.3 "I2C Commands".

use core::fmt;

/// How the data stream of a response is interpreted.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResponseShape {
    /// The command has no response.
    Empty,
    /// `u16` read as a boolean (nonzero = ready).
    DataReady,
    /// 10 × big-endian `f32`.
    Measurement,
    /// Big-endian `u32` seconds.
    AutoCleanInterval,
    /// Major byte, minor byte.
    Version,
    /// NUL-padded ASCII string.
    Serial,
    /// Big-endian `u32` bitmask.
    DeviceStatus,
}

/// Static table entry for a command.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CommandSpec {
    /// Pointer address sent first in every transaction.
    pub address: u16,
    /// Data bytes written after the address, *excluding* checksums.
    pub write_len: usize,
    /// Bytes read back, *including* checksums.
    pub read_len: usize,
    pub shape: ResponseShape,
}

/// Argument of `StartMeasurement` selecting big-endian IEEE-754 float output.
pub const MEASUREMENT_OUTPUT_FORMAT_FLOAT: [u8; 2] = [0x03, 0x00];

/// Represents an SPS-30 command.
///
/// The auto-clean interval register is accessed with the same pointer for
/// reads and writes; it is split into two variants so that each variant has
/// exactly one request and response length.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Enter measurement mode. Takes the output-format argument.
    StartMeasurement,
    /// Return to idle mode.
    StopMeasurement,
    /// Read the latest measurement (60 bytes in float mode).
    ReadMeasurement,
    /// Read the data-ready flag.
    GetDataReady,
    /// Read the fan auto-clean interval.
    GetAutoCleanInterval,
    /// Write the fan auto-clean interval (non-volatile).
    SetAutoCleanInterval,
    /// Read the firmware version.
    GetFirmwareVersion,
    /// Read the ASCII serial number.
    GetSerial,
    /// Soft reset.
    Reset,
    /// Enter sleep mode (firmware >= 2.0).
    Sleep,
    /// Leave sleep mode. Must be sent twice, see `Sps30::wake`.
    WakeUp,
    /// Read the device status register.
    ReadDeviceStatus,
    /// Start a manual fan cleaning cycle.
    StartManualFanClean,
}

impl Command {
    /// Every command, in table order.
    pub const ALL: [Command; 13] = [
        Command::StartMeasurement,
        Command::StopMeasurement,
        Command::ReadMeasurement,
        Command::GetDataReady,
        Command::GetAutoCleanInterval,
        Command::SetAutoCleanInterval,
        Command::GetFirmwareVersion,
        Command::GetSerial,
        Command::Reset,
        Command::Sleep,
        Command::WakeUp,
        Command::ReadDeviceStatus,
        Command::StartManualFanClean,
    ];

    /// Returns the static table entry for this command.
    pub const fn spec(self) -> CommandSpec {
        use ResponseShape as S;
        let (address, write_len, read_len, shape) = match self {
            Command::StartMeasurement => (0x0010, 2, 0, S::Empty),
            Command::StopMeasurement => (0x0104, 0, 0, S::Empty),
            Command::ReadMeasurement => (0x0300, 0, 60, S::Measurement),
            Command::GetDataReady => (0x2020, 0, 3, S::DataReady),
            Command::GetAutoCleanInterval => (0x8004, 0, 6, S::AutoCleanInterval),
            Command::SetAutoCleanInterval => (0x8004, 4, 0, S::Empty),
            Command::GetFirmwareVersion => (0xD100, 0, 3, S::Version),
            Command::GetSerial => (0xD033, 0, 48, S::Serial),
            Command::Reset => (0xD304, 0, 0, S::Empty),
            Command::Sleep => (0x1001, 0, 0, S::Empty),
            Command::WakeUp => (0x1103, 0, 0, S::Empty),
            Command::ReadDeviceStatus => (0xD206, 0, 6, S::DeviceStatus),
            Command::StartManualFanClean => (0x5607, 0, 0, S::Empty),
        };
        CommandSpec { address, write_len, read_len, shape }
    }

    #[inline]
    pub const fn address(self) -> u16 {
        self.spec().address
    }

    #[inline]
    pub const fn write_len(self) -> usize {
        self.spec().write_len
    }

    #[inline]
    pub const fn read_len(self) -> usize {
        self.spec().read_len
    }

    /// True if the sensor sends data back for this command.
    pub const fn requires_response(self) -> bool {
        self.spec().read_len > 0
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:#06x})", self, self.address())
    }
}
