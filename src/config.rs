// src/config.rs

use crate::common::timing::COMMAND_DELAY;
use core::time::Duration;

/// 7-bit I2C address of the SPS-30. The device address is fixed.
pub const DEFAULT_I2C_ADDRESS: u8 = 0x69;

/// Configuration settings for the I2C bus transport.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    /// 7-bit device address.
    pub i2c_address: u8,
    /// Wait between the pointer write and the data read of a read transaction.
    pub command_delay: Duration,
}

impl Config {
    /// Creates a new `Config` instance.
    ///
    /// # Arguments
    ///
    /// * `i2c_address` - 7-bit device address.
    /// * `command_delay` - Delay inserted before every data read.
    pub fn new(i2c_address: u8, command_delay: Duration) -> Config {
        Config { i2c_address, command_delay }
    }

    /// Sets the device address, for boards with an address translator.
    pub fn i2c_address(mut self, i2c_address: u8) -> Self {
        self.i2c_address = i2c_address;
        self
    }

    /// Sets the read delay. Values below the datasheet minimum make the
    /// sensor NACK the read.
    pub fn command_delay(mut self, command_delay: Duration) -> Self {
        self.command_delay = command_delay;
        self
    }
}

/// Provides the datasheet configuration: address `0x69`, 5 ms read delay.
impl Default for Config {
    fn default() -> Config {
        Config {
            i2c_address: DEFAULT_I2C_ADDRESS,
            command_delay: COMMAND_DELAY,
        }
    }
}
