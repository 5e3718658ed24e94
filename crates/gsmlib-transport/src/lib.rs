//! gsmlib-transport: Serial transport and modem discovery for gsmlib.
//!
//! Provides [`SerialTransport`], the [`Transport`](gsmlib_core::Transport)
//! implementation used against real hardware, and [`discovery`] helpers that
//! probe the platform's tty devices for AT-speaking modems.

pub mod discovery;
pub mod serial;

pub use discovery::{available_modems, candidate_ports, ModemInfo};
pub use serial::SerialTransport;
