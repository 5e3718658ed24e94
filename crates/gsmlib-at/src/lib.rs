//! gsmlib-at: Hayes/3GPP 27.007 AT protocol engine.
//!
//! This crate implements the AT command protocol used by cellular modems.
//! It provides:
//!
//! - **Wire framing** ([`protocol`]) -- split the serial byte stream into
//!   logical lines and the SMS `"> "` prompt, and classify each line as a
//!   terminal result code, response data, or an unsolicited result code.
//! - **Character-set codec** ([`codec`]) -- GSM-7 detection and
//!   UCS-2 ⇄ UTF-8 hex transcoding, with auto-detection for inbound text.
//! - **Command builders and parsers** ([`commands`]) -- construct
//!   correctly-formatted AT commands and parse the prefixed responses
//!   (`+CSQ:`, `+CREG:`, `+COPS:`, `+CMGR:`, `+CMGL:`, …) including GSM
//!   service-center timestamps.
//! - **URC classification** ([`urc`]) -- map unsolicited lines (`+CMTI`,
//!   `RING`, `+CLIP`, `+CREG`, `+CUSD`, `+CDS`, …) to structured events.
//! - **Transaction engine** ([`modem`]) -- [`GsmModem`] serializes
//!   command/response exchanges over a shared [`Transport`], honors
//!   wall-clock timeouts, and drives the two-step SMS prompt protocol.
//! - **Event dispatcher** ([`dispatcher`]) -- an optional background task
//!   that watches the line during idle periods and feeds URCs into a
//!   bounded event channel.
//! - **SMS engine** ([`sms`]) -- text-mode send/read/list/delete with
//!   transparent charset selection and a chunked fallback for long texts.
//! - **Builder** ([`builder`]) -- fluent construction with the standard
//!   init sequence.
//!
//! # Example
//!
//! ```no_run
//! use gsmlib_at::ModemBuilder;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> gsmlib_core::Result<()> {
//!     let modem = ModemBuilder::new()
//!         .serial_port("/dev/ttyUSB0")
//!         .baud_rate(115_200)
//!         .build()
//!         .await?;
//!
//!     let quality = modem.signal_quality().await?;
//!     println!("RSSI {} BER {}", quality.rssi, quality.ber);
//!
//!     modem.send_sms("+79991234567", "Hello from gsmlib").await?;
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod codec;
pub mod commands;
pub mod dispatcher;
pub mod modem;
pub mod protocol;
pub mod queries;
pub mod sms;
pub mod urc;

pub use builder::ModemBuilder;
pub use dispatcher::EventReceiver;
pub use modem::GsmModem;

// Re-exported so downstream code only needs this crate in scope.
pub use gsmlib_core::transport::Transport;
