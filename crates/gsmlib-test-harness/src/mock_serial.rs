//! Mock transport for deterministic testing of the AT engine.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! request/response pairs, playing the role of a canned modem. This lets you
//! test command framing, response parsing, the SMS prompt protocol, and URC
//! dispatch without real hardware.
//!
//! In addition to the ordered expectation queue, the mock exposes an
//! [`UnsolicitedInjector`]: a cloneable handle that pushes bytes the mock
//! will serve when no response is pending, simulating URCs the modem emits
//! on its own (RING, +CMTI, +CUSD, …) at any point during a test.
//!
//! # Example
//!
//! ```
//! use gsmlib_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! // Pre-load: when the engine sends this command, return this reply.
//! mock.expect(b"AT\r\n", b"\r\nOK\r\n");
//!
//! // Script a URC arriving later, from anywhere in the test.
//! let injector = mock.injector();
//! injector.push(b"+CMTI: \"SM\",3\r\n");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use gsmlib_core::error::{Error, Result};
use gsmlib_core::transport::Transport;

/// A pre-loaded request/response pair for the mock transport.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact bytes we expect to be sent.
    request: Vec<u8>,
    /// The bytes to return when the matching request is received.
    response: Vec<u8>,
}

/// A cloneable handle that feeds unsolicited bytes into a [`MockTransport`].
///
/// Bytes pushed here are returned by `receive()` whenever no expectation
/// response is pending, in push order.
#[derive(Debug, Clone)]
pub struct UnsolicitedInjector {
    queue: Arc<Mutex<VecDeque<u8>>>,
}

impl UnsolicitedInjector {
    /// Queue bytes for delivery as unsolicited modem output.
    pub fn push(&self, bytes: &[u8]) {
        let mut queue = self.queue.lock().unwrap();
        queue.extend(bytes.iter().copied());
    }

    /// Number of queued bytes not yet delivered.
    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}

/// A mock [`Transport`] for testing the AT engine without hardware.
///
/// Expectations are consumed in order. When `send()` is called, the sent
/// data is recorded and matched against the next expectation; the
/// corresponding response is then served by subsequent `receive()` calls.
/// When no response is pending, `receive()` drains the unsolicited queue
/// instead, and times out when that is empty too.
#[derive(Debug)]
pub struct MockTransport {
    /// Ordered queue of expected request/response pairs.
    expectations: VecDeque<Expectation>,
    /// The response data pending for the next `receive()` calls.
    pending_response: VecDeque<u8>,
    /// Unsolicited bytes shared with [`UnsolicitedInjector`] handles.
    unsolicited: Arc<Mutex<VecDeque<u8>>>,
    /// Whether the transport is "connected".
    connected: bool,
    /// Log of all bytes sent through this transport.
    sent_log: Vec<Vec<u8>>,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        MockTransport {
            expectations: VecDeque::new(),
            pending_response: VecDeque::new(),
            unsolicited: Arc::new(Mutex::new(VecDeque::new())),
            connected: true,
            sent_log: Vec::new(),
        }
    }

    /// Add an expected request/response pair.
    ///
    /// When `send()` is called with data matching `request`, subsequent
    /// `receive()` calls will return `response`.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// A handle for scripting unsolicited modem output.
    pub fn injector(&self) -> UnsolicitedInjector {
        UnsolicitedInjector {
            queue: Arc::clone(&self.unsolicited),
        }
    }

    /// Return all data that has been sent through this transport.
    ///
    /// Each element is the byte slice from one `send()` call.
    pub fn sent_data(&self) -> &[Vec<u8>] {
        &self.sent_log
    }

    /// Return the number of expectations that have not yet been consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Set the connected state of the mock transport.
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    fn fill_from(buf: &mut [u8], source: &mut VecDeque<u8>) -> usize {
        let n = source.len().min(buf.len());
        for slot in buf.iter_mut().take(n) {
            // Pop cannot fail: n is bounded by source.len().
            *slot = source.pop_front().unwrap();
        }
        n
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        // Record what was sent.
        self.sent_log.push(data.to_vec());

        // Match against the next expectation.
        if let Some(expectation) = self.expectations.pop_front() {
            if data != expectation.request.as_slice() {
                return Err(Error::Parse(format!(
                    "unexpected send data: expected {:02X?}, got {:02X?}",
                    expectation.request, data
                )));
            }
            self.pending_response = expectation.response.into();
            Ok(())
        } else {
            Err(Error::Parse("no more expectations in mock transport".into()))
        }
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        if !self.pending_response.is_empty() {
            return Ok(Self::fill_from(buf, &mut self.pending_response));
        }

        {
            let mut unsolicited = self.unsolicited.lock().unwrap();
            if !unsolicited.is_empty() {
                return Ok(Self::fill_from(buf, &mut unsolicited));
            }
        }

        // Nothing available. Behave like a real port: wait a little before
        // reporting the timeout, and pick up bytes injected in the meantime.
        tokio::time::sleep(timeout.min(Duration::from_millis(10))).await;

        let mut unsolicited = self.unsolicited.lock().unwrap();
        if !unsolicited.is_empty() {
            return Ok(Self::fill_from(buf, &mut unsolicited));
        }
        Err(Error::Timeout)
    }

    async fn flush_input(&mut self) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        self.pending_response.clear();
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.pending_response.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_transport_basic_send_receive() {
        let mut mock = MockTransport::new();
        let request = b"AT\r\n";
        let response = b"\r\nOK\r\n";

        mock.expect(request, response);

        mock.send(request).await.unwrap();

        let mut buf = [0u8; 64];
        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();

        assert_eq!(n, response.len());
        assert_eq!(&buf[..n], response);
    }

    #[tokio::test]
    async fn mock_transport_tracks_sent_data() {
        let mut mock = MockTransport::new();
        let req1 = b"AT+CGMI\r\n";
        let req2 = b"AT+CGMM\r\n";

        mock.expect(req1, b"OK\r\n");
        mock.expect(req2, b"OK\r\n");

        mock.send(req1).await.unwrap();
        mock.send(req2).await.unwrap();

        assert_eq!(mock.sent_data().len(), 2);
        assert_eq!(mock.sent_data()[0], req1);
        assert_eq!(mock.sent_data()[1], req2);
    }

    #[tokio::test]
    async fn mock_transport_wrong_data_errors() {
        let mut mock = MockTransport::new();
        mock.expect(b"AT\r\n", b"OK\r\n");

        let result = mock.send(b"ATZ\r\n").await;
        assert!(matches!(result.unwrap_err(), Error::Parse(_)));
    }

    #[tokio::test]
    async fn mock_transport_no_expectations_errors() {
        let mut mock = MockTransport::new();

        let result = mock.send(b"AT\r\n").await;
        assert!(matches!(result.unwrap_err(), Error::Parse(_)));
    }

    #[tokio::test]
    async fn mock_transport_receive_without_send_times_out() {
        let mut mock = MockTransport::new();
        let mut buf = [0u8; 64];

        let result = mock.receive(&mut buf, Duration::from_millis(10)).await;
        assert!(matches!(result.unwrap_err(), Error::Timeout));
    }

    #[tokio::test]
    async fn mock_transport_partial_receive() {
        let mut mock = MockTransport::new();
        let request = b"AT\r\n";
        let response = b"\r\n+CSQ: 20,0\r\nOK\r\n";
        mock.expect(request, response);

        mock.send(request).await.unwrap();

        // Read with a buffer smaller than the response.
        let mut buf = [0u8; 4];
        let mut collected = Vec::new();
        loop {
            match mock.receive(&mut buf, Duration::from_millis(10)).await {
                Ok(n) => collected.extend_from_slice(&buf[..n]),
                Err(Error::Timeout) => break,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(collected, response);
    }

    #[tokio::test]
    async fn mock_transport_serves_unsolicited_bytes() {
        let mut mock = MockTransport::new();
        let injector = mock.injector();
        injector.push(b"RING\r\n");

        let mut buf = [0u8; 64];
        let n = mock
            .receive(&mut buf, Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(&buf[..n], b"RING\r\n");
        assert_eq!(injector.pending(), 0);
    }

    #[tokio::test]
    async fn mock_transport_pending_response_takes_priority() {
        let mut mock = MockTransport::new();
        mock.injector().push(b"RING\r\n");
        mock.expect(b"AT\r\n", b"OK\r\n");

        mock.send(b"AT\r\n").await.unwrap();

        // The command response is served before the unsolicited bytes.
        let mut buf = [0u8; 64];
        let n = mock
            .receive(&mut buf, Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(&buf[..n], b"OK\r\n");
    }

    #[tokio::test]
    async fn mock_transport_injection_during_timeout_wait() {
        let mut mock = MockTransport::new();
        let injector = mock.injector();

        // Inject from another task while receive() is waiting.
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2)).await;
            injector.push(b"+CMTI: \"SM\",1\r\n");
        });

        let mut buf = [0u8; 64];
        let n = mock
            .receive(&mut buf, Duration::from_millis(50))
            .await
            .unwrap();
        assert_eq!(&buf[..n], b"+CMTI: \"SM\",1\r\n");
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn mock_transport_flush_discards_pending_response() {
        let mut mock = MockTransport::new();
        mock.expect(b"AT\r\n", b"LATE OUTPUT\r\n");
        mock.send(b"AT\r\n").await.unwrap();

        mock.flush_input().await.unwrap();

        let mut buf = [0u8; 64];
        let result = mock.receive(&mut buf, Duration::from_millis(10)).await;
        assert!(matches!(result.unwrap_err(), Error::Timeout));
    }

    #[tokio::test]
    async fn mock_transport_disconnect() {
        let mut mock = MockTransport::new();
        assert!(mock.is_connected());

        mock.close().await.unwrap();
        assert!(!mock.is_connected());

        let result = mock.send(b"AT\r\n").await;
        assert!(matches!(result.unwrap_err(), Error::NotConnected));
    }

    #[tokio::test]
    async fn mock_transport_remaining_expectations() {
        let mut mock = MockTransport::new();
        mock.expect(b"A", b"1");
        mock.expect(b"B", b"2");
        assert_eq!(mock.remaining_expectations(), 2);

        mock.send(b"A").await.unwrap();
        assert_eq!(mock.remaining_expectations(), 1);

        mock.send(b"B").await.unwrap();
        assert_eq!(mock.remaining_expectations(), 0);
    }
}
