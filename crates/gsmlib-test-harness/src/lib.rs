//! gsmlib-test-harness: Mock transports and canned-modem utilities for
//! gsmlib.
//!
//! Provides [`MockTransport`] for deterministic unit testing of the AT
//! engine without real modem hardware, including an [`UnsolicitedInjector`]
//! for scripting URC arrival at arbitrary points in a test.

pub mod mock_serial;

pub use mock_serial::{MockTransport, UnsolicitedInjector};
