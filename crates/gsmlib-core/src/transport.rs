//! Transport trait for modem communication.
//!
//! The [`Transport`] trait abstracts over the physical link to a modem.
//! Implementations exist for serial ports (`gsmlib-transport`) and mock
//! transports for testing (`gsmlib-test-harness`).
//!
//! The AT protocol engine in `gsmlib-at` operates on a `Transport` rather
//! than directly on a serial port, enabling both real hardware control and
//! deterministic unit testing against canned modem transcripts.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level transport to a modem.
///
/// Implementations handle buffering and error mapping at the physical layer.
/// Protocol-level concerns (line framing, result-code recognition, the SMS
/// prompt) are handled by the AT engine that consumes this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes to the modem.
    ///
    /// Implementations should not return until all bytes have been handed to
    /// the underlying transport (serial TX buffer).
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive bytes from the modem into the provided buffer.
    ///
    /// Returns the number of bytes actually read. Waits up to `timeout` for
    /// data to arrive; returns [`Error::Timeout`](crate::error::Error::Timeout)
    /// if nothing is received within the deadline.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Discard any bytes already received but not yet consumed.
    ///
    /// A transaction flushes stale input before writing its command so that
    /// late output from a previously timed-out command cannot be mistaken
    /// for the new response.
    async fn flush_input(&mut self) -> Result<()>;

    /// Close the transport connection.
    ///
    /// After `close()`, subsequent `send()` and `receive()` calls should
    /// return [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}
