//! Transport to the instrument.
//!
//! The driver only needs two primitives from the bus: send a command, and send
//! a command then read one reply. Anything that provides them (a VISA session,
//! another GPIB stack, or [`MockBus`] in tests) can drive the counter.

pub mod mock;
#[cfg(feature = "visa")]
pub mod visa;

pub use mock::MockBus;
#[cfg(feature = "visa")]
pub use visa::VisaBus;

use crate::error::CounterError;
use crate::types::GpibAddress;
use std::time::Duration;

/// Command/response access to one instrument.
///
/// Calls block until the instrument answers or the transport times out.
pub trait Bus {
    /// Send a command that produces no reply.
    fn write(&mut self, command: &str) -> Result<(), CounterError>;

    /// Send a command and return the reply with the line terminator removed.
    fn query(&mut self, command: &str) -> Result<String, CounterError>;
}

impl<B: Bus + ?Sized> Bus for Box<B> {
    fn write(&mut self, command: &str) -> Result<(), CounterError> {
        (**self).write(command)
    }

    fn query(&mut self, command: &str) -> Result<String, CounterError> {
        (**self).query(command)
    }
}

/// Open a VISA session to `address`.
#[cfg(feature = "visa")]
pub fn open_visa(address: GpibAddress, timeout: Duration) -> Result<Box<dyn Bus>, CounterError> {
    Ok(Box::new(VisaBus::open(address, timeout)?))
}

/// Open a VISA session to `address`.
///
/// This build has no VISA support; rebuild with `--features visa`.
#[cfg(not(feature = "visa"))]
pub fn open_visa(
    address: GpibAddress,
    _timeout: Duration,
) -> Result<Box<dyn Bus>, CounterError> {
    Err(CounterError::Unsupported(format!(
        "cannot open {}: built without the 'visa' feature",
        address.resource()
    )))
}
