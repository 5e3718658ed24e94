//! Background URC listener.
//!
//! When enabled, a reader task watches the serial line during idle periods
//! and turns unsolicited result codes into [`ModemEvent`]s: new-SMS
//! notifications, incoming calls, registration changes, USSD replies,
//! delivery reports.
//!
//! The task shares the transport mutex with the transaction engine: it
//! locks, reads for at most one slice, routes any complete lines, and
//! releases, so commands interleave freely. While a transaction holds the
//! mutex, its own read loop performs the URC routing instead
//! (see [`GsmModem::collect_response`](crate::modem::GsmModem)), which is
//! how a URC arriving mid-transaction still reaches the event stream
//! without polluting the response body.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use gsmlib_core::error::{Error, Result};
use gsmlib_core::events::{EventType, ModemEvent};
use gsmlib_core::transport::Transport;

use crate::modem::{deliver_event, GsmModem};
use crate::protocol::{LineFramer, Token};
use crate::urc;

/// How long one guarded idle read may hold the transport mutex.
const IDLE_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Pause after a transport error before retrying the idle read.
const ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Handle to the background listener task.
pub(crate) struct DispatcherHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// A cloneable consumer handle for the modem's event channel.
///
/// The channel has a single producer and one underlying receiver; clones of
/// this handle compete for events. Created with
/// [`GsmModem::event_channel`].
#[derive(Clone)]
pub struct EventReceiver {
    inner: Arc<Mutex<mpsc::Receiver<ModemEvent>>>,
}

impl std::fmt::Debug for EventReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventReceiver").finish_non_exhaustive()
    }
}

impl EventReceiver {
    /// Wait for the next event. Returns `None` once the channel is closed
    /// and drained.
    pub async fn recv(&self) -> Option<ModemEvent> {
        self.inner.lock().await.recv().await
    }

    /// Take an already-queued event without waiting.
    pub async fn try_recv(&self) -> Option<ModemEvent> {
        self.inner.lock().await.try_recv().ok()
    }
}

impl GsmModem {
    /// Start the URC listener.
    ///
    /// Configures the modem for unsolicited reports first: store-and-notify
    /// for new SMS (`AT+CNMI=2,1,0,0,0`), caller ID (`AT+CLIP=1`), and
    /// registration updates with cell info (`AT+CREG=2`), then spawns the
    /// reader task. Calling this while the listener is already running is a
    /// no-op.
    pub async fn start_event_listener(&self) -> Result<()> {
        // Hold the handle slot across the whole start so concurrent calls
        // cannot configure the modem or spawn the reader twice.
        let mut guard = self.dispatcher.lock().await;
        if guard.is_some() {
            debug!("event listener already running");
            return Ok(());
        }

        self.send_command("AT+CNMI=2,1,0,0,0", self.command_timeout)
            .await?;
        self.send_command("AT+CLIP=1", self.command_timeout).await?;
        self.send_command("AT+CREG=2", self.command_timeout).await?;

        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(listener_loop(
            Arc::clone(&self.transport),
            self.event_tx.clone(),
            Arc::clone(&self.dropped_events),
            Arc::clone(&self.dispatcher_live),
            stop_rx,
        ));

        self.dispatcher_live.store(true, Ordering::SeqCst);
        self.listener_started.store(true, Ordering::SeqCst);
        *guard = Some(DispatcherHandle { stop_tx, task });
        debug!("event listener started");
        Ok(())
    }

    /// Stop the URC listener and wait for the reader task to exit.
    ///
    /// The event channel stays open: queued events can still be drained,
    /// but no further events are produced. A no-op when the listener is
    /// not running.
    pub async fn stop_event_listener(&self) -> Result<()> {
        let handle = self.dispatcher.lock().await.take();
        let Some(DispatcherHandle { stop_tx, task }) = handle else {
            return Ok(());
        };

        self.dispatcher_live.store(false, Ordering::SeqCst);
        let _ = stop_tx.send(true);
        let _ = task.await;
        debug!("event listener stopped");
        Ok(())
    }

    /// A consumer handle for the event channel.
    ///
    /// Fails with [`Error::State`] until
    /// [`start_event_listener`](Self::start_event_listener) has been
    /// called. Remains valid after a stop, so queued events can still be
    /// drained.
    pub async fn event_channel(&self) -> Result<EventReceiver> {
        if !self.listener_started.load(Ordering::SeqCst) {
            return Err(Error::State("event listener not started".into()));
        }
        Ok(EventReceiver {
            inner: Arc::clone(&self.event_rx),
        })
    }

    /// Wait for the first event of the given type, dropping any
    /// non-matching events read in the meantime.
    ///
    /// Intended for short-lived foreground flows (USSD replies, delivery
    /// confirmation); long-running consumers should drain
    /// [`event_channel`](Self::event_channel) instead.
    pub async fn wait_for_event(&self, ty: EventType, timeout: Duration) -> Result<ModemEvent> {
        let deadline = tokio::time::Instant::now() + timeout;
        let mut rx = self.event_rx.lock().await;

        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Err(Error::Timeout);
            }
            match tokio::time::timeout(remaining, rx.recv()).await {
                Ok(Some(event)) if event.event_type() == ty => return Ok(event),
                Ok(Some(event)) => {
                    trace!(ty = ?event.event_type(), "dropping non-matching event");
                }
                Ok(None) => return Err(Error::State("event channel closed".into())),
                Err(_) => return Err(Error::Timeout),
            }
        }
    }
}

/// The reader task: take the transport when it is free, read one slice,
/// route complete lines, release, repeat.
async fn listener_loop(
    transport: Arc<Mutex<Box<dyn Transport>>>,
    event_tx: mpsc::Sender<ModemEvent>,
    dropped: Arc<AtomicU64>,
    live: Arc<AtomicBool>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut framer = LineFramer::new();
    let mut buf = [0u8; 1024];
    debug!("URC listener loop running");

    loop {
        tokio::select! {
            biased;

            _ = stop_rx.changed() => {
                debug!("URC listener received stop signal");
                break;
            }

            tokens = async {
                let mut transport = transport.lock().await;
                match transport.receive(&mut buf, IDLE_READ_TIMEOUT).await {
                    Ok(n) if n > 0 => Some(framer.push(&buf[..n])),
                    Ok(_) => None,
                    Err(Error::Timeout) => None,
                    Err(e) => {
                        trace!(error = %e, "idle read failed, backing off");
                        drop(transport);
                        tokio::time::sleep(ERROR_BACKOFF).await;
                        None
                    }
                }
            } => {
                let Some(tokens) = tokens else { continue };
                for token in tokens {
                    let Token::Line(line) = token else { continue };
                    match urc::parse_urc_line(&line) {
                        Some(kind) => {
                            trace!(%line, "URC");
                            deliver_event(&event_tx, &dropped, ModemEvent::new(kind));
                        }
                        None => trace!(%line, "ignoring non-URC line in idle read"),
                    }
                }
            }
        }
    }

    live.store(false, Ordering::SeqCst);
}
