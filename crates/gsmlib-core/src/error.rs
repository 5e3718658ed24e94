//! Error types for gsmlib.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport-layer failures, modem-reported
//! errors, and response-parsing problems are all captured here.

/// The error type for all gsmlib operations.
///
/// Variants cover the full range of failure modes encountered when driving a
/// cellular modem over a serial line: port-level failures, command timeouts,
/// errors reported by the modem itself, and malformed responses.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (serial port open/configure failure).
    #[error("transport error: {0}")]
    Transport(String),

    /// Timed out waiting for a response and nothing was accumulated.
    ///
    /// This typically indicates the modem is powered off, the baud rate is
    /// wrong, or the device on the port does not speak AT commands.
    #[error("timeout waiting for response")]
    Timeout,

    /// The modem answered with `ERROR`, `+CME ERROR: …` or `+CMS ERROR: …`.
    ///
    /// The payload is the raw error line so callers can match the numeric
    /// code (enable them with `AT+CMEE=1`).
    #[error("modem error: {0}")]
    Modem(String),

    /// A response arrived but its fields did not match the expected shape
    /// (missing prefix, wrong arity, unparseable integer).
    #[error("parse error: {0}")]
    Parse(String),

    /// UCS-2 transcoding was fed malformed input (odd length, not hex,
    /// invalid UTF-16).
    #[error("encoding error: {0}")]
    Encoding(String),

    /// An operation was invoked in the wrong state, e.g. requesting the
    /// event channel before the listener was started.
    #[error("invalid state: {0}")]
    State(String),

    /// No connection to the modem has been established.
    #[error("not connected")]
    NotConnected,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_transport() {
        let e = Error::Transport("port busy".into());
        assert_eq!(e.to_string(), "transport error: port busy");
    }

    #[test]
    fn error_display_timeout() {
        let e = Error::Timeout;
        assert_eq!(e.to_string(), "timeout waiting for response");
    }

    #[test]
    fn error_display_modem_carries_raw_line() {
        let e = Error::Modem("+CMS ERROR: 305".into());
        assert_eq!(e.to_string(), "modem error: +CMS ERROR: 305");
    }

    #[test]
    fn error_display_parse() {
        let e = Error::Parse("prefix +CSQ: not found".into());
        assert_eq!(e.to_string(), "parse error: prefix +CSQ: not found");
    }

    #[test]
    fn error_display_encoding() {
        let e = Error::Encoding("odd number of UCS-2 bytes".into());
        assert_eq!(e.to_string(), "encoding error: odd number of UCS-2 bytes");
    }

    #[test]
    fn error_display_state() {
        let e = Error::State("event listener not started".into());
        assert_eq!(e.to_string(), "invalid state: event listener not started");
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("pipe broken"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        // io::Error is Send + Sync, so our Error should be too.
        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<Error>();
    }
}
