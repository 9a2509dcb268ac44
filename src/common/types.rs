// src/common/types.rs

use core::fmt;
use core::time::Duration;

// --- Sensor State ---

/// Operational state tracked by the driver.
///
/// `Idle` always implies the sensor has been probed: every path into
/// `Idle` (probe, stop, wake) leaves the device information cached.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SensorState {
    /// Freshly constructed or reset; no device information cached.
    Unprobed,
    /// Probed and idle, ready to start measuring.
    Idle,
    /// Measurement mode; data can be polled once per second.
    Measuring,
    /// Low-power sleep mode (firmware >= 2.0 only).
    Sleeping,
}

// --- Firmware Version ---

/// Firmware version reported by the sensor.
///
/// Ordering compares `major` first, then `minor`, which is what
/// the capability checks rely on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub const fn new(major: u8, minor: u8) -> Self {
        Version { major, minor }
    }

    /// Builds a version from its 2-byte wire representation (major first).
    pub const fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Version { major: bytes[0], minor: bytes[1] }
    }

    pub const fn to_be_bytes(self) -> [u8; 2] {
        [self.major, self.minor]
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

// --- Serial Number ---

/// Capacity of the serial number, matching the device's 32-byte field.
pub const SERIAL_NUMBER_CAPACITY: usize = 32;
/// Longest serial number; the field's last byte holds the NUL terminator.
pub const SERIAL_NUMBER_MAX_LEN: usize = SERIAL_NUMBER_CAPACITY - 1;

/// ASCII serial number, as reported by the sensor.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Default)]
pub struct SerialNumber(heapless::String<SERIAL_NUMBER_CAPACITY>);

impl SerialNumber {
    /// Wraps an already-validated string.
    pub fn new(value: heapless::String<SERIAL_NUMBER_CAPACITY>) -> Self {
        SerialNumber(value)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<&str> for SerialNumber {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

// --- Fan Auto-Clean Interval ---

const SECONDS_PER_DAY: u32 = 86_400;

/// Fan auto-cleaning interval in seconds. `0` disables auto-cleaning.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct AutoCleanInterval(u32);

impl AutoCleanInterval {
    /// Factory setting: 168 hours.
    pub const DEFAULT: AutoCleanInterval = AutoCleanInterval(604_800);
    pub const DISABLED: AutoCleanInterval = AutoCleanInterval(0);

    pub const fn from_secs(seconds: u32) -> Self {
        AutoCleanInterval(seconds)
    }

    /// Interval of whole days. A `u8` day count cannot overflow the `u32` field.
    pub const fn from_days(days: u8) -> Self {
        AutoCleanInterval(days as u32 * SECONDS_PER_DAY)
    }

    pub const fn as_secs(&self) -> u32 {
        self.0
    }

    /// Interval in whole days, truncating.
    pub const fn whole_days(&self) -> u32 {
        self.0 / SECONDS_PER_DAY
    }

    pub const fn is_disabled(&self) -> bool {
        self.0 == 0
    }

    pub const fn from_be_bytes(bytes: [u8; 4]) -> Self {
        AutoCleanInterval(u32::from_be_bytes(bytes))
    }

    pub const fn to_be_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl Default for AutoCleanInterval {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<AutoCleanInterval> for Duration {
    fn from(value: AutoCleanInterval) -> Self {
        Duration::from_secs(u64::from(value.0))
    }
}

// --- Device Status Register ---

/// Snapshot of the device status register.
///
/// The flags clear themselves on the device once the condition is gone;
/// this value never changes after it has been read.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct DeviceStatus(u32);

impl DeviceStatus {
    /// Fan switched on but measured speed is 0 RPM.
    pub const FAN_ERROR: u32 = 1 << 4;
    /// Laser current out of range.
    pub const LASER_ERROR: u32 = 1 << 5;
    /// Fan speed too high or too low.
    pub const FAN_SPEED_WARNING: u32 = 1 << 21;

    pub const fn from_bits(bits: u32) -> Self {
        DeviceStatus(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn contains(&self, flag: u32) -> bool {
        self.0 & flag == flag
    }

    pub const fn fan_error(&self) -> bool {
        self.contains(Self::FAN_ERROR)
    }

    pub const fn laser_error(&self) -> bool {
        self.contains(Self::LASER_ERROR)
    }

    pub const fn fan_speed_warning(&self) -> bool {
        self.contains(Self::FAN_SPEED_WARNING)
    }

    /// True when no flag is raised.
    pub const fn is_ok(&self) -> bool {
        self.0 == 0
    }
}

// --- Measurement ---

/// Number of `f32` values in one measurement.
pub const MEASUREMENT_VALUES: usize = 10;

/// One measurement read from the sensor in big-endian float mode.
///
/// Mass concentrations are in µg/m³, number concentrations in #/cm³,
/// typical particle size in µm.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Measurement {
    /// Mass concentration PM1.0
    pub mc_1p0: f32,
    /// Mass concentration PM2.5
    pub mc_2p5: f32,
    /// Mass concentration PM4.0
    pub mc_4p0: f32,
    /// Mass concentration PM10
    pub mc_10p0: f32,
    /// Number concentration PM0.5
    pub nc_0p5: f32,
    /// Number concentration PM1.0
    pub nc_1p0: f32,
    /// Number concentration PM2.5
    pub nc_2p5: f32,
    /// Number concentration PM4.0
    pub nc_4p0: f32,
    /// Number concentration PM10
    pub nc_10p0: f32,
    /// Typical particle size
    pub typical_particle_size: f32,
}

impl Measurement {
    /// Builds a measurement from values in wire order.
    pub const fn from_values(v: [f32; MEASUREMENT_VALUES]) -> Self {
        Measurement {
            mc_1p0: v[0],
            mc_2p5: v[1],
            mc_4p0: v[2],
            mc_10p0: v[3],
            nc_0p5: v[4],
            nc_1p0: v[5],
            nc_2p5: v[6],
            nc_4p0: v[7],
            nc_10p0: v[8],
            typical_particle_size: v[9],
        }
    }

    /// Values in wire order.
    pub const fn values(&self) -> [f32; MEASUREMENT_VALUES] {
        [
            self.mc_1p0,
            self.mc_2p5,
            self.mc_4p0,
            self.mc_10p0,
            self.nc_0p5,
            self.nc_1p0,
            self.nc_2p5,
            self.nc_4p0,
            self.nc_10p0,
            self.typical_particle_size,
        ]
    }
}

// --- Probe Cache ---

/// Device information collected by `probe()`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DeviceInfo {
    pub serial: SerialNumber,
    pub version: Version,
    pub auto_clean_interval: AutoCleanInterval,
}
