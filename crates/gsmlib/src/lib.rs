//! # gsmlib -- Cellular Modem Control over AT Commands
//!
//! `gsmlib` is an asynchronous Rust library for driving cellular modems
//! (SIMCom, Quectel, Huawei, u-blox, and anything else that speaks
//! Hayes/3GPP 27.007 AT commands) over a serial line. It gives application
//! code a synchronous request/response interface over the modem's shared
//! byte stream, plus an out-of-band event stream for unsolicited result
//! codes: new SMS notifications, incoming calls, registration changes, and
//! USSD replies.
//!
//! ## Quick Start
//!
//! Add `gsmlib` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! gsmlib = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Connect to a modem and send a text message:
//!
//! ```no_run
//! use gsmlib::ModemBuilder;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let modem = ModemBuilder::new()
//!         .serial_port("/dev/ttyUSB0")
//!         .baud_rate(115_200)
//!         .build()
//!         .await?;
//!
//!     let quality = modem.signal_quality().await?;
//!     println!("RSSI: {:?} dBm", quality.rssi_dbm());
//!
//!     // Cyrillic (or emoji) payloads switch to UCS-2 automatically.
//!     modem.send_sms("+79991234567", "Привет!").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                 | Purpose                                        |
//! |-----------------------|------------------------------------------------|
//! | `gsmlib-core`         | `Transport` trait, data model, events, errors  |
//! | `gsmlib-transport`    | Serial transport (tokio-serial), discovery     |
//! | `gsmlib-at`           | The AT protocol engine and `GsmModem`          |
//! | `gsmlib-test-harness` | `MockTransport` canned modem for tests         |
//! | **`gsmlib`**          | This facade crate -- re-exports everything     |
//!
//! ## Event Subscription
//!
//! Modems announce new SMS, incoming calls, network changes, and USSD
//! replies as Unsolicited Result Codes on the same serial line. Start the
//! event listener and drain the channel:
//!
//! ```no_run
//! use gsmlib::{EventKind, ModemBuilder};
//!
//! # async fn example(modem: gsmlib::GsmModem) -> gsmlib::Result<()> {
//! modem.start_event_listener().await?;
//! let events = modem.event_channel().await?;
//!
//! while let Some(event) = events.recv().await {
//!     match event.kind {
//!         EventKind::NewSms { storage, index } => {
//!             let sms = modem.read_sms(index).await?;
//!             println!("[{storage}:{index}] {}: {}", sms.sender, sms.text);
//!         }
//!         EventKind::IncomingCall { number } => {
//!             println!("call from {}", number.as_deref().unwrap_or("unknown"));
//!         }
//!         other => println!("{other:?}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The channel is bounded; if nothing drains it, new events are dropped
//! (counted via [`GsmModem::dropped_events`]) rather than ever stalling
//! the reader.
//!
//! ## Discovery
//!
//! [`available_modems`] probes the platform's usual serial device names
//! with `AT` and reports everything that answers, with manufacturer, model,
//! and IMEI filled in where available.

pub use gsmlib_core::*;

pub use gsmlib_at::{EventReceiver, GsmModem, ModemBuilder};

/// AT protocol internals: framing, codec, command builders, URC parsing.
///
/// Most applications only need [`GsmModem`]; these are exposed for tools
/// that speak fragments of the protocol themselves.
pub mod at {
    pub use gsmlib_at::{codec, commands, protocol, urc};
}

pub use gsmlib_transport::{available_modems, candidate_ports, ModemInfo, SerialTransport};
