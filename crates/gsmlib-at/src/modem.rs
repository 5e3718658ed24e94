//! GsmModem -- the AT transaction engine.
//!
//! This module ties the line framer ([`crate::protocol`]) to a
//! [`Transport`] to produce the synchronous request/response core that
//! everything else builds on. It handles:
//!
//! - serialized transactions (one in flight per modem, guarded by a mutex)
//! - wall-clock timeouts with partial-body recovery (some modems omit the
//!   `OK` terminator on multi-line dumps)
//! - recognition of terminal result codes vs. data lines vs. URCs
//! - the two-step `"> "` prompt protocol used by `AT+CMGS`
//! - the bounded event channel URCs are delivered through
//!
//! The query wrappers live in [`crate::queries`], the SMS engine in
//! [`crate::sms`], and the background URC listener in
//! [`crate::dispatcher`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, trace};

use gsmlib_core::error::{Error, Result};
use gsmlib_core::events::ModemEvent;
use gsmlib_core::transport::Transport;

use crate::dispatcher::DispatcherHandle;
use crate::protocol::{classify_line, ClassifyContext, LineClass, LineFramer, Token};
use crate::urc;

/// Capacity of the event channel. When full, new events are dropped and
/// counted; the reader never blocks on event delivery.
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Upper bound for a single `receive()` call, so the transaction deadline
/// is re-checked at least this often.
const READ_SLICE: Duration = Duration::from_millis(100);

/// Grace period between writing `AT+CMGS=…"\r` and expecting the prompt.
const PROMPT_GRACE: Duration = Duration::from_millis(100);

/// How long to wait for the `"> "` prompt before giving up on an SMS
/// submission.
const PROMPT_TIMEOUT: Duration = Duration::from_secs(5);

/// A cellular modem driven over an AT command interface.
///
/// Constructed via [`ModemBuilder`](crate::builder::ModemBuilder) or
/// [`GsmModem::open`]. The modem instance may be shared across tasks; all
/// port I/O is serialized internally.
pub struct GsmModem {
    /// The serial line. Exclusively owned; transactions and the URC
    /// listener take turns under this mutex.
    pub(crate) transport: Arc<Mutex<Box<dyn Transport>>>,
    /// Timeout applied to configuration-style commands issued internally.
    pub(crate) command_timeout: Duration,
    pub(crate) event_tx: mpsc::Sender<ModemEvent>,
    pub(crate) event_rx: Arc<Mutex<mpsc::Receiver<ModemEvent>>>,
    pub(crate) dropped_events: Arc<AtomicU64>,
    pub(crate) dispatcher: Mutex<Option<DispatcherHandle>>,
    /// The listener is currently running: URCs seen inside transactions are
    /// routed to the event channel instead of the response body.
    pub(crate) dispatcher_live: Arc<AtomicBool>,
    /// The listener has been started at least once. Queued events stay
    /// drainable after a stop.
    pub(crate) listener_started: AtomicBool,
}

impl std::fmt::Debug for GsmModem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GsmModem")
            .field("command_timeout", &self.command_timeout)
            .field("dropped_events", &self.dropped_events)
            .field("dispatcher_live", &self.dispatcher_live)
            .field("listener_started", &self.listener_started)
            .finish_non_exhaustive()
    }
}

impl GsmModem {
    /// Create a modem over an already-open transport. No wire traffic is
    /// performed; call [`initialize`](Self::initialize) to run the init
    /// sequence.
    pub fn new(transport: Box<dyn Transport>, command_timeout: Duration) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        GsmModem {
            transport: Arc::new(Mutex::new(transport)),
            command_timeout,
            event_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
            dropped_events: Arc::new(AtomicU64::new(0)),
            dispatcher: Mutex::new(None),
            dispatcher_live: Arc::new(AtomicBool::new(false)),
            listener_started: AtomicBool::new(false),
        }
    }

    /// Open a serial port and initialize the modem on it.
    ///
    /// Equivalent to the builder chain
    /// `ModemBuilder::new().serial_port(port).baud_rate(baud).build()`.
    pub async fn open(port: &str, baud_rate: u32) -> Result<Self> {
        crate::builder::ModemBuilder::new()
            .serial_port(port)
            .baud_rate(baud_rate)
            .build()
            .await
    }

    /// Run the init sequence: factory reset, echo off, text-mode SMS,
    /// numeric error reports.
    pub async fn initialize(&self) -> Result<()> {
        self.send_command("ATZ", Duration::from_secs(2)).await?;
        self.send_command("ATE0", self.command_timeout).await?;
        self.send_command("AT+CMGF=1", self.command_timeout).await?;
        self.send_command("AT+CMEE=1", self.command_timeout).await?;
        Ok(())
    }

    /// Send an AT command and wait for its response.
    ///
    /// The returned body is the newline-joined sequence of response lines,
    /// terminal `OK` included. A terminal error line maps to
    /// [`Error::Modem`] carrying that raw line. If the timeout elapses with
    /// nothing accumulated the result is [`Error::Timeout`]; if partial
    /// output was accumulated without a terminator, the partial body is
    /// returned and the caller's parser decides whether it is usable.
    pub async fn send_command(&self, cmd: &str, timeout: Duration) -> Result<String> {
        let mut transport = self.transport.lock().await;
        self.run_transaction(&mut **transport, cmd, timeout).await
    }

    /// Check that the modem answers `AT` with `OK`.
    pub async fn test_connection(&self) -> Result<()> {
        let body = self.send_command("AT", Duration::from_secs(1)).await?;
        if body.contains("OK") {
            Ok(())
        } else {
            Err(Error::Parse(format!("unexpected response: {body}")))
        }
    }

    /// Number of events dropped because the event channel was full.
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    /// Stop the event listener (if running) and close the port.
    pub async fn close(&self) -> Result<()> {
        self.stop_event_listener().await?;
        let mut transport = self.transport.lock().await;
        transport.close().await
    }

    // -----------------------------------------------------------------
    // Transaction internals
    // -----------------------------------------------------------------

    /// One command/response exchange on an already-locked transport.
    pub(crate) async fn run_transaction(
        &self,
        transport: &mut dyn Transport,
        cmd: &str,
        timeout: Duration,
    ) -> Result<String> {
        trace!(cmd, "issuing AT command");
        // Discard late output of any previously timed-out command.
        transport.flush_input().await?;
        transport.send(format!("{cmd}\r\n").as_bytes()).await?;

        let ctx = ClassifyContext::for_command(cmd);
        self.collect_response(transport, &ctx, timeout).await
    }

    /// Accumulate classified lines until a terminal result code or the
    /// deadline.
    pub(crate) async fn collect_response(
        &self,
        transport: &mut dyn Transport,
        ctx: &ClassifyContext,
        timeout: Duration,
    ) -> Result<String> {
        let deadline = tokio::time::Instant::now() + timeout;
        let mut framer = LineFramer::new();
        let mut body: Vec<String> = Vec::new();
        let mut buf = [0u8; 256];

        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                if body.is_empty() {
                    return Err(Error::Timeout);
                }
                // No terminator, but data arrived: some modems omit OK on
                // multi-line dumps. Hand the partial body to the parser.
                debug!(lines = body.len(), "returning unterminated response body");
                return Ok(body.join("\n"));
            }

            match transport.receive(&mut buf, remaining.min(READ_SLICE)).await {
                Ok(n) if n > 0 => {
                    for token in framer.push(&buf[..n]) {
                        let line = match token {
                            Token::Line(line) => line,
                            // A stray prompt outside SMS submission carries
                            // no information.
                            Token::Prompt => continue,
                        };
                        match classify_line(&line, ctx) {
                            LineClass::Urc if self.dispatcher_live.load(Ordering::Relaxed) => {
                                // Out-of-band line: belongs to the event
                                // stream, not to this transaction.
                                self.route_urc(&line);
                            }
                            LineClass::TerminalOk => {
                                body.push(line);
                                return Ok(body.join("\n"));
                            }
                            LineClass::TerminalError => {
                                debug!(error = %line, "modem reported command error");
                                return Err(Error::Modem(line));
                            }
                            LineClass::Urc | LineClass::Data => body.push(line),
                        }
                    }
                }
                Ok(_) => {}
                Err(Error::Timeout) => {}
                Err(e) => return Err(e),
            }
        }
    }

    /// Wait for the `"> "` prompt that follows `AT+CMGS`.
    async fn await_prompt(&self, transport: &mut dyn Transport) -> Result<()> {
        let deadline = tokio::time::Instant::now() + PROMPT_TIMEOUT;
        let ctx = ClassifyContext::default();
        let mut framer = LineFramer::new();
        let mut buf = [0u8; 64];

        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Err(Error::Timeout);
            }
            match transport.receive(&mut buf, remaining.min(READ_SLICE)).await {
                Ok(n) if n > 0 => {
                    for token in framer.push(&buf[..n]) {
                        match token {
                            Token::Prompt => return Ok(()),
                            Token::Line(line) => match classify_line(&line, &ctx) {
                                LineClass::TerminalError => return Err(Error::Modem(line)),
                                LineClass::Urc
                                    if self.dispatcher_live.load(Ordering::Relaxed) =>
                                {
                                    self.route_urc(&line);
                                }
                                // Anything else before the prompt is noise.
                                _ => trace!(%line, "discarding pre-prompt line"),
                            },
                        }
                    }
                }
                Ok(_) => {}
                Err(Error::Timeout) => {}
                Err(e) => return Err(e),
            }
        }
    }

    /// The two-phase SMS submission transaction.
    ///
    /// Phase A writes `AT+CMGS="<number>"` terminated by a bare `\r` and
    /// waits for the prompt; phase B writes the payload terminated by
    /// Ctrl-Z (`0x1A`) and collects the normal response. The transport
    /// mutex is held across both phases.
    pub(crate) async fn send_sms_payload(
        &self,
        number_field: &str,
        payload: &str,
        timeout: Duration,
    ) -> Result<String> {
        let mut transport = self.transport.lock().await;

        transport.flush_input().await?;
        transport
            .send(format!("AT+CMGS=\"{number_field}\"\r").as_bytes())
            .await?;

        tokio::time::sleep(PROMPT_GRACE).await;
        self.await_prompt(&mut **transport).await?;

        let mut data = payload.as_bytes().to_vec();
        data.push(0x1A);
        transport.send(&data).await?;

        self.collect_response(&mut **transport, &ClassifyContext::default(), timeout)
            .await
    }

    /// Parse a URC line and deliver it to the event channel.
    pub(crate) fn route_urc(&self, line: &str) {
        if let Some(kind) = urc::parse_urc_line(line) {
            deliver_event(&self.event_tx, &self.dropped_events, ModemEvent::new(kind));
        } else {
            trace!(%line, "unparseable URC line dropped");
        }
    }
}

/// Non-blocking event delivery: on a full channel the event is dropped and
/// the counter advanced.
pub(crate) fn deliver_event(
    tx: &mpsc::Sender<ModemEvent>,
    dropped: &AtomicU64,
    event: ModemEvent,
) {
    if tx.try_send(event).is_err() {
        dropped.fetch_add(1, Ordering::Relaxed);
        debug!("event channel full, dropping event");
    }
}
