//! AT wire-level framing and line classification.
//!
//! The modem's serial output is a line-oriented byte stream: logical lines
//! delimited by `\r`, `\n`, or `\r\n`, freely interleaved with blank
//! separator lines. One token is not a line at all: the two bytes `"> "`
//! that prompt for an SMS body during `AT+CMGS`.
//!
//! [`LineFramer`] performs the incremental split. It accepts byte chunks of
//! arbitrary size and yields [`Token`]s; an unterminated tail is buffered
//! until more bytes arrive, so feeding a stream byte-by-byte produces the
//! same tokens as feeding it whole.
//!
//! [`classify_line`] labels each framed line for the transaction engine.
//! Two classifications depend on the outstanding command and are steered by
//! [`ClassifyContext`]:
//!
//! - `+CREG:`/`+CGREG:` is response data for `AT+CREG?`/`AT+CGREG?` and an
//!   unsolicited registration report otherwise.
//! - `NO CARRIER`/`BUSY`/`NO ANSWER` terminate an `ATD` dial attempt, but
//!   signal the end of an established call when no dial is outstanding.

use bytes::BytesMut;

/// A unit of modem output produced by the framer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A logical line, delimiters stripped and whitespace trimmed.
    /// Never empty.
    Line(String),
    /// The `"> "` SMS body prompt.
    Prompt,
}

/// Incremental splitter from raw bytes to [`Token`]s.
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: BytesMut,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes, returning every token completed by it.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Token> {
        self.buf.extend_from_slice(bytes);

        let mut tokens = Vec::new();
        loop {
            // The prompt is not line-terminated; recognize it as soon as
            // both bytes are present at the start of the pending segment.
            if self.buf.len() >= 2 && &self.buf[..2] == b"> " {
                let _ = self.buf.split_to(2);
                tokens.push(Token::Prompt);
                continue;
            }

            let Some(pos) = self.buf.iter().position(|&b| b == b'\r' || b == b'\n') else {
                break;
            };
            let segment = self.buf.split_to(pos + 1);
            let line = String::from_utf8_lossy(&segment[..pos]);
            let line = line.trim();
            if !line.is_empty() {
                tokens.push(Token::Line(line.to_string()));
            }
        }
        tokens
    }

    /// Number of buffered bytes awaiting a terminator.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

/// Classification of a framed line within a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// `OK` -- the transaction completed successfully.
    TerminalOk,
    /// `ERROR`, `+CME ERROR:`, `+CMS ERROR:`, or a failed dial result --
    /// the transaction completed with a modem-reported error.
    TerminalError,
    /// An unsolicited result code belonging to the event stream.
    Urc,
    /// Response data: prefixed lines (`+CSQ:` …) and free-form payload
    /// lines following `+CMGR:`/`+CMGL:` headers.
    Data,
}

/// Per-transaction classification state, derived from the command that is
/// currently outstanding.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyContext {
    /// The command solicits a registration report (`AT+CREG?`/`AT+CGREG?`),
    /// so `+CREG:`/`+CGREG:` lines are data, not URCs.
    pub registration_query: bool,
    /// The command is a dial attempt (`ATD…`), so `NO CARRIER` and friends
    /// terminate it instead of reporting a remote hang-up.
    pub dialing: bool,
}

impl ClassifyContext {
    /// Derive the context for a command about to be written.
    pub fn for_command(cmd: &str) -> Self {
        ClassifyContext {
            registration_query: cmd.starts_with("AT+CREG?") || cmd.starts_with("AT+CGREG?"),
            dialing: cmd.starts_with("ATD"),
        }
    }
}

/// URC prefixes that are never part of a transaction's own output.
const URC_PREFIXES: &[&str] = &["+CMTI:", "+CLIP:", "+CRING:", "+CUSD:", "+CDS:"];

/// Lines that end a call, one way or the other.
const CALL_RESULTS: &[&str] = &["NO CARRIER", "BUSY", "NO ANSWER"];

/// Label one framed line for the transaction engine.
pub fn classify_line(line: &str, ctx: &ClassifyContext) -> LineClass {
    if line == "OK" {
        return LineClass::TerminalOk;
    }
    if line == "ERROR" || line.starts_with("+CME ERROR:") || line.starts_with("+CMS ERROR:") {
        return LineClass::TerminalError;
    }
    if CALL_RESULTS.contains(&line) {
        return if ctx.dialing {
            LineClass::TerminalError
        } else {
            LineClass::Urc
        };
    }
    if line == "RING" {
        return LineClass::Urc;
    }
    if line.starts_with("+CREG:") || line.starts_with("+CGREG:") {
        return if ctx.registration_query {
            LineClass::Data
        } else {
            LineClass::Urc
        };
    }
    if URC_PREFIXES.iter().any(|p| line.starts_with(p)) {
        return LineClass::Urc;
    }
    LineClass::Data
}
