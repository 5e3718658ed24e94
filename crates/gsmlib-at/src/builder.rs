//! ModemBuilder -- fluent builder for constructing [`GsmModem`] instances.
//!
//! Separates configuration from construction so that callers can set up the
//! serial port and timeout values before the port is touched.
//!
//! # Example
//!
//! ```no_run
//! use gsmlib_at::ModemBuilder;
//! use std::time::Duration;
//!
//! # async fn example() -> gsmlib_core::Result<()> {
//! let modem = ModemBuilder::new()
//!     .serial_port("/dev/ttyUSB0")
//!     .baud_rate(115_200)
//!     .command_timeout(Duration::from_secs(2))
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use gsmlib_core::error::{Error, Result};
use gsmlib_core::transport::Transport;

use crate::modem::GsmModem;

/// Fluent builder for [`GsmModem`].
pub struct ModemBuilder {
    serial_port: Option<String>,
    baud_rate: u32,
    command_timeout: Duration,
}

impl ModemBuilder {
    /// Create a builder with defaults: 115200 baud, 1 s command timeout.
    pub fn new() -> Self {
        ModemBuilder {
            serial_port: None,
            baud_rate: 115_200,
            command_timeout: Duration::from_secs(1),
        }
    }

    /// Set the serial port path (e.g. `/dev/ttyUSB0` or `COM3`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Override the default baud rate.
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = baud;
        self
    }

    /// Set the timeout for short configuration-style commands (default:
    /// 1 s). Long operations (operator scan, USSD, SMS submission) use
    /// their own budgets.
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Build a [`GsmModem`] with a caller-provided transport.
    ///
    /// This is the entry point for testing (pass a `MockTransport` from
    /// `gsmlib-test-harness`) and for custom transports. No wire traffic is
    /// performed; run [`GsmModem::initialize`] when the init sequence is
    /// wanted.
    pub fn build_with_transport(self, transport: Box<dyn Transport>) -> GsmModem {
        GsmModem::new(transport, self.command_timeout)
    }

    /// Open the configured serial port, construct the modem, and run the
    /// init sequence (`ATZ`, `ATE0`, `AT+CMGF=1`, `AT+CMEE=1`).
    pub async fn build(self) -> Result<GsmModem> {
        let port = self
            .serial_port
            .as_deref()
            .ok_or_else(|| Error::State("serial_port is required for build()".into()))?;

        let transport = gsmlib_transport::SerialTransport::open(port, self.baud_rate).await?;
        let modem = GsmModem::new(Box::new(transport), self.command_timeout);
        modem.initialize().await?;
        Ok(modem)
    }
}

impl Default for ModemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsmlib_test_harness::MockTransport;

    #[tokio::test]
    async fn build_requires_serial_port() {
        let result = ModemBuilder::new().build().await;
        assert!(matches!(result.unwrap_err(), Error::State(_)));
    }

    #[tokio::test]
    async fn build_with_transport_performs_no_io() {
        // A mock with zero expectations: any wire traffic would error.
        let mock = MockTransport::new();
        let modem = ModemBuilder::new()
            .command_timeout(Duration::from_millis(200))
            .build_with_transport(Box::new(mock));
        assert_eq!(modem.dropped_events(), 0);
    }

    #[tokio::test]
    async fn built_modem_initializes_on_demand() {
        let mut mock = MockTransport::new();
        mock.expect(b"ATZ\r\n", b"\r\nOK\r\n");
        mock.expect(b"ATE0\r\n", b"\r\nOK\r\n");
        mock.expect(b"AT+CMGF=1\r\n", b"\r\nOK\r\n");
        mock.expect(b"AT+CMEE=1\r\n", b"\r\nOK\r\n");

        let modem = ModemBuilder::new().build_with_transport(Box::new(mock));
        modem.initialize().await.unwrap();
    }
}
