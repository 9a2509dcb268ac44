// src/lib.rs

#![cfg_attr(not(any(test, feature = "std")), no_std)] // no_std unless testing or std is requested

pub mod common;
pub mod config;
pub mod driver;
pub mod fixtures;
pub mod transport;

// Re-export key types for convenience
pub use common::{Command, Measurement, SensorState, Sps30Error, Sps30Transport};
pub use config::Config;
pub use driver::Sps30;
#[cfg(feature = "i2c")]
pub use transport::I2cTransport;
