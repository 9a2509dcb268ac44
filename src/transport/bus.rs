// src/transport/bus.rs

use crate::common::hal_traits::Sps30Transport;
use crate::config::Config;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{I2c, Operation};

/// `Sps30Transport` over an `embedded-hal` 1.0 I2C bus.
///
/// Writes are sent as one transaction (pointer then framed data). Reads
/// write the pointer, wait `Config::command_delay`, then read the response
/// in a separate transaction; the sensor does not support a repeated start
/// between the two.
#[derive(Debug)]
pub struct I2cTransport<I2C, D> {
    i2c: I2C,
    delay: D,
    config: Config,
}

impl<I2C, D> I2cTransport<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Creates a transport with the default address (`0x69`) and read delay.
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_config(i2c, delay, Config::default())
    }

    pub fn with_config(i2c: I2C, delay: D, config: Config) -> Self {
        I2cTransport { i2c, delay, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the bus and delay provider.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn command_delay_us(&self) -> u32 {
        u32::try_from(self.config.command_delay.as_micros()).unwrap_or(u32::MAX)
    }
}

impl<I2C, D> Sps30Transport for I2cTransport<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    type Error = I2C::Error;

    fn write(&mut self, address: u16, payload: &[u8]) -> Result<(), Self::Error> {
        let pointer = address.to_be_bytes();
        // Adjacent writes go out back to back without a restart
        self.i2c.transaction(
            self.config.i2c_address,
            &mut [Operation::Write(&pointer), Operation::Write(payload)],
        )
    }

    fn read(&mut self, address: u16, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write(self.config.i2c_address, &address.to_be_bytes())?;
        let wait = self.command_delay_us();
        self.delay.delay_us(wait);
        self.i2c.read(self.config.i2c_address, buffer)
    }
}
