// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod command;
pub mod crc;
pub mod error;
pub mod frame;
pub mod hal_traits;
pub mod response;
pub mod timing;
pub mod types;

// --- Re-export key types/traits/functions for easier access ---

// From command.rs
pub use command::{Command, CommandSpec, ResponseShape};

// From crc.rs
pub use crc::{calculate_crc8, verify_word};

// From error.rs
pub use error::Sps30Error;

// From frame.rs
pub use frame::{encode_command, encode_words, strip_checksums, CommandFrame};

// From hal_traits.rs
pub use hal_traits::Sps30Transport;

// From response/mod.rs (and its sub-modules via its own `pub use`)
pub use response::{decode_response, Response};

// From timing.rs (constants - users can access via common::timing::*)

// From types.rs
pub use types::{AutoCleanInterval, DeviceInfo, DeviceStatus, Measurement, SensorState, SerialNumber, Version};
