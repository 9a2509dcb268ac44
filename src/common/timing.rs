// src/common/timing.rs

use core::time::Duration;

// The driver never sleeps on these itself. Callers (and bus transports)
// wait the listed times between operations. Values are the datasheet
// minimums (SPS-30 datasheet, Sec 4 and 6.3).

// === Device Lifecycle ===

/// Time the sensor needs after a soft reset before it accepts commands.
pub const RESET_DELAY: Duration = Duration::from_millis(100);
/// Window after the first WakeUp write in which the second one must follow.
pub const WAKE_UP_WINDOW: Duration = Duration::from_millis(100);

// === Command Execution ===

/// Minimum time between the pointer write and the data read of a read
/// transaction, and between two consecutive commands.
pub const COMMAND_DELAY: Duration = Duration::from_millis(5);
/// Execution time of StartMeasurement and StopMeasurement.
pub const START_STOP_DELAY: Duration = Duration::from_millis(20);
/// Execution time of SetAutoCleanInterval (non-volatile write).
pub const WRITE_FLASH_DELAY: Duration = Duration::from_millis(20);

// === Measurement Mode ===

/// A new measurement is produced once per second.
pub const MEASUREMENT_INTERVAL: Duration = Duration::from_secs(1);
/// Number concentrations (all ranges) stabilize this long after
/// StartMeasurement. Mass concentrations are valid from the first sample.
pub const NUMBER_CONCENTRATION_SETTLING_TIME: Duration = Duration::from_secs(8);
/// Duration of a fan cleaning cycle. Measurements read during the cycle
/// are not meaningful.
pub const FAN_CLEAN_DURATION: Duration = Duration::from_secs(10);
