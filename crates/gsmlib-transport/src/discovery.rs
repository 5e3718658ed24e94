//! Modem discovery: probe candidate serial devices for an AT interface.
//!
//! Scans the platform's usual tty device names, opens each candidate, and
//! sends a bare `AT`. Devices that answer `OK` are reported as modems,
//! enriched with manufacturer, model, and IMEI where the device answers the
//! corresponding identification queries.
//!
//! This is a convenience for interactive tools; applications that know their
//! port should open it directly via
//! [`ModemBuilder`](https://docs.rs/gsmlib-at) or
//! [`SerialTransport`](crate::SerialTransport).

use std::time::Duration;

use tracing::{debug, trace};

use gsmlib_core::error::Result;
use gsmlib_core::transport::Transport;

use crate::serial::SerialTransport;

/// Baud rate used while probing candidate ports.
const PROBE_BAUD: u32 = 115_200;
/// How long to wait for a probe reply before giving up on a port.
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// A modem found by [`available_modems`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModemInfo {
    /// Serial device path ("/dev/ttyUSB0", "COM3", …).
    pub port: String,
    pub manufacturer: String,
    pub model: String,
    pub imei: String,
    /// "Manufacturer Model" convenience string.
    pub description: String,
}

/// Scan the platform's candidate serial devices and return every one that
/// answers AT commands.
///
/// Ports that cannot be opened (missing, busy, no permission) are silently
/// skipped.
pub async fn available_modems() -> Vec<ModemInfo> {
    let mut modems = Vec::new();
    for path in candidate_ports() {
        if let Some(info) = probe_port(&path).await {
            debug!(port = %path, description = %info.description, "found modem");
            modems.push(info);
        }
    }
    modems
}

/// Candidate device paths for the current platform.
///
/// Linux: `/dev/ttyUSB0-9`, `/dev/ttyACM0-9`. macOS: `tty.`/`cu.` variants
/// of `usbserial*` and `usbmodem*`. Windows: `COM1`..`COM20`.
pub fn candidate_ports() -> Vec<String> {
    let mut ports = Vec::new();

    if cfg!(target_os = "linux") {
        for prefix in ["/dev/ttyUSB", "/dev/ttyACM"] {
            for i in 0..10 {
                ports.push(format!("{prefix}{i}"));
            }
        }
    } else if cfg!(target_os = "macos") {
        for prefix in [
            "/dev/tty.usbserial",
            "/dev/tty.usbmodem",
            "/dev/cu.usbserial",
            "/dev/cu.usbmodem",
        ] {
            for i in 0..10 {
                ports.push(format!("{prefix}{i}"));
            }
        }
    } else if cfg!(target_os = "windows") {
        for i in 1..=20 {
            ports.push(format!("COM{i}"));
        }
    }

    ports
}

/// Try to open a port and confirm an AT interface is listening.
async fn probe_port(path: &str) -> Option<ModemInfo> {
    let mut transport = match SerialTransport::open(path, PROBE_BAUD).await {
        Ok(t) => t,
        Err(_) => return None,
    };

    let reply = probe_command(&mut transport, "AT").await.ok()?;
    if !reply.contains("OK") {
        trace!(port = %path, "device did not answer AT, skipping");
        return None;
    }

    let manufacturer = identification_field(&mut transport, "AT+CGMI").await;
    let model = identification_field(&mut transport, "AT+CGMM").await;
    let imei = identification_field(&mut transport, "AT+CGSN").await;
    let description = format!("{manufacturer} {model}").trim().to_string();

    let _ = transport.close().await;

    Some(ModemInfo {
        port: path.to_string(),
        manufacturer,
        model,
        imei,
        description,
    })
}

/// Write a command and accumulate the reply until `OK`/`ERROR` or the probe
/// timeout elapses. Probing tolerates garbage, so everything is lossy here.
async fn probe_command(transport: &mut SerialTransport, cmd: &str) -> Result<String> {
    transport.flush_input().await?;
    transport.send(format!("{cmd}\r\n").as_bytes()).await?;

    let deadline = tokio::time::Instant::now() + PROBE_TIMEOUT;
    let mut reply = String::new();
    let mut buf = [0u8; 256];

    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            return Ok(reply);
        }
        match transport.receive(&mut buf, remaining).await {
            Ok(n) if n > 0 => {
                reply.push_str(&String::from_utf8_lossy(&buf[..n]));
                if reply.contains("OK") || reply.contains("ERROR") {
                    return Ok(reply);
                }
            }
            Ok(_) => {}
            Err(_) => return Ok(reply),
        }
    }
}

/// Run an identification query and pull out its payload line, or an empty
/// string when the device does not answer it.
async fn identification_field(transport: &mut SerialTransport, cmd: &str) -> String {
    match probe_command(transport, cmd).await {
        Ok(reply) => first_payload_line(&reply),
        Err(_) => String::new(),
    }
}

/// The first reply line that is not a result code or a command echo.
fn first_payload_line(reply: &str) -> String {
    reply
        .lines()
        .map(str::trim)
        .find(|line| {
            !line.is_empty()
                && !line.starts_with("OK")
                && !line.starts_with("ERROR")
                && !line.starts_with("AT")
        })
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_ports_cover_platform_patterns() {
        let ports = candidate_ports();
        if cfg!(target_os = "linux") {
            assert!(ports.contains(&"/dev/ttyUSB0".to_string()));
            assert!(ports.contains(&"/dev/ttyACM9".to_string()));
            assert_eq!(ports.len(), 20);
        } else if cfg!(target_os = "windows") {
            assert!(ports.contains(&"COM1".to_string()));
            assert!(ports.contains(&"COM20".to_string()));
        }
    }

    #[test]
    fn first_payload_line_skips_echo_and_result_codes() {
        let reply = "AT+CGMI\r\nSIMCOM_Ltd\r\nOK\r\n";
        assert_eq!(first_payload_line(reply), "SIMCOM_Ltd");
    }

    #[test]
    fn first_payload_line_empty_on_error_only() {
        assert_eq!(first_payload_line("ERROR\r\n"), "");
        assert_eq!(first_payload_line(""), "");
    }
}
