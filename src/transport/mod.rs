// src/transport/mod.rs

// Declare the transport implementations
#[cfg(feature = "i2c")]
pub mod bus;
pub mod mock;
pub mod recorded;

// Re-export the transports themselves
#[cfg(feature = "i2c")]
pub use bus::I2cTransport;
pub use mock::{Expectation, MockError, MockTransport};
pub use recorded::{RecordedDevice, RecordedError, RecordedTransport};
