// src/common/hal_traits.rs

use super::address::SensorAddr;
use alloc::sync::Arc;
use core::fmt::Debug;

/// Monotonic time in ticks. `StdClock` uses milliseconds.
pub type Timestamp = u64;

/// Source of monotonic time for last-read timestamps.
pub trait Clock {
    /// Current time. Must never go backwards.
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Milliseconds since the clock was created.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    pub fn new() -> Self {
        StdClock { origin: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now(&self) -> Timestamp {
        // Saturate instead of wrapping after ~584 million years.
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Metadata for one packet written into the caller's receive buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Address of the sensor node that sent the packet.
    pub sender: SensorAddr,
    /// Number of payload bytes written to the buffer.
    pub len: usize,
}

/// Abstraction for the receive side of a low-power radio (nRF24L01 or similar).
///
/// Implementations wrap the radio driver; modulation, retransmission and
/// encryption stay on the driver side.
pub trait RadioLink {
    /// Associated error type for driver failures.
    type Error: Debug;

    /// Brings the radio into receive mode. Called once by `Collector::start`.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Attempts to take one received packet.
    ///
    /// Copies the payload into `buf` and returns its sender and length, or
    /// `Err(nb::Error::WouldBlock)` if nothing has arrived. Payloads longer than
    /// `buf` must be truncated by the driver, with `len` set to `buf.len()`.
    fn receive(&mut self, buf: &mut [u8]) -> nb::Result<Packet, Self::Error>;
}
