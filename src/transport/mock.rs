// src/transport/mock.rs

use crate::common::frame::{MAX_FRAME_LEN, MAX_READ_LEN};
use crate::common::hal_traits::Sps30Transport;
use heapless::{Deque, Vec};

/// Number of expectations one mock can hold.
pub const MOCK_QUEUE_DEPTH: usize = 16;

const MAX_PAYLOAD_LEN: usize = MAX_FRAME_LEN - 2;

/// One scripted transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// A write to `address` with exactly `payload`.
    Write { address: u16, payload: Vec<u8, MAX_PAYLOAD_LEN> },
    /// A read from `address`, answered with `response`.
    Read { address: u16, response: Vec<u8, MAX_READ_LEN> },
    /// A write to `address` that fails on the bus.
    WriteError { address: u16 },
    /// A read from `address` that fails on the bus.
    ReadError { address: u16 },
}

/// Errors returned by `MockTransport`. Everything except `Injected` means
/// the code under test did something the script did not expect.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MockError {
    /// A scripted bus failure.
    Injected,
    /// A call arrived after the script was exhausted.
    Exhausted,
    /// More expectations were scripted than the queue holds.
    QueueFull,
    /// The call kind or address differs from the next expectation.
    Unexpected { address: u16 },
    /// The written payload differs from the expected one.
    PayloadMismatch { address: u16 },
    /// The read buffer length differs from the scripted response.
    LengthMismatch { expected: usize, got: usize },
}

/// A transport that replays a FIFO of expectations.
///
/// Each instance owns its own script, so tests never share state. Calls
/// that do not match the script return an error instead of panicking; use
/// `is_done()` to check that every expectation was consumed.
#[derive(Debug, Default)]
pub struct MockTransport {
    queue: Deque<Expectation, MOCK_QUEUE_DEPTH>,
    overflowed: bool,
    writes: usize,
    reads: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, expectation: Expectation) -> Self {
        if self.queue.push_back(expectation).is_err() {
            self.overflowed = true;
        }
        self
    }

    /// Expects a write of the framed `payload` (without the address bytes).
    pub fn expect_write(self, address: u16, payload: &[u8]) -> Self {
        match Vec::from_slice(payload) {
            Ok(payload) => self.push(Expectation::Write { address, payload }),
            Err(()) => self.overflow(),
        }
    }

    /// Expects a read and answers it with the framed `response`.
    pub fn expect_read(self, address: u16, response: &[u8]) -> Self {
        match Vec::from_slice(response) {
            Ok(response) => self.push(Expectation::Read { address, response }),
            Err(()) => self.overflow(),
        }
    }

    /// Expects a write and fails it with `MockError::Injected`.
    pub fn fail_write(self, address: u16) -> Self {
        self.push(Expectation::WriteError { address })
    }

    /// Expects a read and fails it with `MockError::Injected`.
    pub fn fail_read(self, address: u16) -> Self {
        self.push(Expectation::ReadError { address })
    }

    fn overflow(mut self) -> Self {
        self.overflowed = true;
        self
    }

    /// True when every scripted expectation was consumed.
    pub fn is_done(&self) -> bool {
        self.queue.is_empty() && !self.overflowed
    }

    /// Number of expectations not yet consumed.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Number of write calls seen, matched or not.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Number of read calls seen, matched or not.
    pub fn reads(&self) -> usize {
        self.reads
    }

    fn next(&mut self) -> Result<Expectation, MockError> {
        if self.overflowed {
            return Err(MockError::QueueFull);
        }
        self.queue.pop_front().ok_or(MockError::Exhausted)
    }
}

impl Sps30Transport for MockTransport {
    type Error = MockError;

    fn write(&mut self, address: u16, payload: &[u8]) -> Result<(), Self::Error> {
        self.writes += 1;
        match self.next()? {
            Expectation::Write { address: a, payload: p } if a == address => {
                if p.as_slice() == payload {
                    Ok(())
                } else {
                    Err(MockError::PayloadMismatch { address })
                }
            }
            Expectation::WriteError { address: a } if a == address => Err(MockError::Injected),
            _ => Err(MockError::Unexpected { address }),
        }
    }

    fn read(&mut self, address: u16, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.reads += 1;
        match self.next()? {
            Expectation::Read { address: a, response } if a == address => {
                if response.len() != buffer.len() {
                    return Err(MockError::LengthMismatch { expected: response.len(), got: buffer.len() });
                }
                buffer.copy_from_slice(&response);
                Ok(())
            }
            Expectation::ReadError { address: a } if a == address => Err(MockError::Injected),
            _ => Err(MockError::Unexpected { address }),
        }
    }
}
