//! gsmlib-core: Core traits, types, and error definitions for gsmlib.
//!
//! This crate defines the transport-agnostic abstractions that the AT
//! protocol engine and the serial transport build on. Applications depend on
//! these types without pulling in any specific transport.
//!
//! # Key types
//!
//! - [`Transport`] -- byte-level communication channel
//! - [`ModemEvent`] / [`EventKind`] -- unsolicited result code notifications
//! - [`Error`] / [`Result`] -- error handling
//! - The 27.007 data model: [`SignalQuality`], [`NetworkStatus`],
//!   [`OperatorInfo`], [`PinStatus`], [`ModemMode`], [`SmsMessage`], …

pub mod error;
pub mod events;
pub mod transport;
pub mod types;

// Re-export key types at crate root for ergonomic `use gsmlib_core::*`.
pub use error::{Error, Result};
pub use events::{EventKind, EventType, ModemEvent};
pub use transport::Transport;
pub use types::*;
