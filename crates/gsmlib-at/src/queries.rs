//! Query and control wrappers over the transaction engine.
//!
//! Thin, regular-shaped operations: each issues one AT command (or a short
//! fixed sequence) through [`GsmModem::send_command`] and parses the body
//! with [`crate::commands`]. Timeouts follow the operation's nature -- an
//! operator scan can legitimately take minutes, a signal query should not.

use std::time::Duration;

use tracing::debug;

use gsmlib_core::error::{Error, Result};
use gsmlib_core::events::{EventKind, EventType};
use gsmlib_core::types::*;

use crate::commands;
use crate::modem::GsmModem;

/// `AT+COPS=?` walks every band; 3 minutes is the documented worst case.
const OPERATOR_SCAN_TIMEOUT: Duration = Duration::from_secs(180);
/// Registering on a chosen network can take a while.
const OPERATOR_SELECT_TIMEOUT: Duration = Duration::from_secs(30);
/// USSD replies arrive from the network, not the modem.
const USSD_TIMEOUT: Duration = Duration::from_secs(30);
/// CFUN transitions restart parts of the radio stack.
const MODE_SWITCH_TIMEOUT: Duration = Duration::from_secs(10);
const PIN_TIMEOUT: Duration = Duration::from_secs(5);
const DIAL_TIMEOUT: Duration = Duration::from_secs(5);

impl GsmModem {
    // -----------------------------------------------------------------
    // Identification
    // -----------------------------------------------------------------

    /// Manufacturer identification (`AT+CGMI`).
    pub async fn manufacturer(&self) -> Result<String> {
        let body = self.send_command("AT+CGMI", self.command_timeout).await?;
        Ok(commands::extract_payload(&body))
    }

    /// Model identification (`AT+CGMM`).
    pub async fn model(&self) -> Result<String> {
        let body = self.send_command("AT+CGMM", self.command_timeout).await?;
        Ok(commands::extract_payload(&body))
    }

    /// Firmware revision (`AT+CGMR`).
    pub async fn revision(&self) -> Result<String> {
        let body = self.send_command("AT+CGMR", self.command_timeout).await?;
        Ok(commands::extract_payload(&body))
    }

    /// IMEI (`AT+CGSN`).
    pub async fn imei(&self) -> Result<String> {
        let body = self.send_command("AT+CGSN", self.command_timeout).await?;
        Ok(commands::extract_payload(&body))
    }

    /// Collect an identity/status snapshot, skipping queries that fail.
    pub async fn extended_info(&self) -> ExtendedInfo {
        ExtendedInfo {
            manufacturer: self.manufacturer().await.ok(),
            model: self.model().await.ok(),
            revision: self.revision().await.ok(),
            imei: self.imei().await.ok(),
            network_status: self.network_status().await.ok(),
            signal: self.signal_quality().await.ok(),
            operator: self.current_operator().await.ok().map(|op| op.long_name),
            sim_status: self.sim_status().await.ok(),
        }
    }

    // -----------------------------------------------------------------
    // Network
    // -----------------------------------------------------------------

    /// GSM registration status (`AT+CREG?`).
    pub async fn network_status(&self) -> Result<NetworkStatus> {
        let body = self.send_command("AT+CREG?", self.command_timeout).await?;
        commands::parse_registration(&body, "+CREG:")
    }

    /// GPRS registration status (`AT+CGREG?`).
    pub async fn gprs_status(&self) -> Result<NetworkStatus> {
        let body = self.send_command("AT+CGREG?", self.command_timeout).await?;
        commands::parse_registration(&body, "+CGREG:")
    }

    /// The operator the modem is currently registered to (`AT+COPS?`).
    pub async fn current_operator(&self) -> Result<OperatorInfo> {
        let body = self
            .send_command("AT+COPS?", Duration::from_secs(3))
            .await?;
        commands::parse_current_operator(&body)
    }

    /// Scan for available operators (`AT+COPS=?`). May take up to 3
    /// minutes.
    pub async fn scan_operators(&self) -> Result<Vec<OperatorInfo>> {
        debug!("scanning operators, this can take minutes");
        let body = self
            .send_command("AT+COPS=?", OPERATOR_SCAN_TIMEOUT)
            .await?;
        commands::parse_operator_scan(&body)
    }

    /// Manually register on the operator with the given numeric MCC+MNC
    /// code.
    pub async fn select_operator(&self, numeric: &str) -> Result<()> {
        self.send_command(
            &commands::cmd_select_operator(numeric),
            OPERATOR_SELECT_TIMEOUT,
        )
        .await?;
        Ok(())
    }

    /// Return to automatic operator selection (`AT+COPS=0`).
    pub async fn auto_operator(&self) -> Result<()> {
        self.send_command("AT+COPS=0", OPERATOR_SELECT_TIMEOUT)
            .await?;
        Ok(())
    }

    /// Signal quality (`AT+CSQ`).
    pub async fn signal_quality(&self) -> Result<SignalQuality> {
        let body = self.send_command("AT+CSQ", self.command_timeout).await?;
        commands::parse_signal_quality(&body)
    }

    /// Extended error report for the last failed operation (`AT+CEER`).
    pub async fn last_failure_reason(&self) -> Result<String> {
        let body = self.send_command("AT+CEER", self.command_timeout).await?;
        Ok(commands::extract_payload(&body))
    }

    // -----------------------------------------------------------------
    // SIM
    // -----------------------------------------------------------------

    /// SIM PIN state (`AT+CPIN?`).
    pub async fn sim_status(&self) -> Result<PinStatus> {
        let body = self.send_command("AT+CPIN?", self.command_timeout).await?;
        commands::parse_pin_status(&body)
    }

    /// Enter the SIM PIN.
    pub async fn enter_pin(&self, pin: &str) -> Result<()> {
        self.send_command(&commands::cmd_enter_pin(pin), PIN_TIMEOUT)
            .await?;
        Ok(())
    }

    /// The subscriber number stored on the SIM (`AT+CNUM`), when present.
    pub async fn sim_number(&self) -> Result<String> {
        let body = self.send_command("AT+CNUM", self.command_timeout).await?;
        commands::parse_sim_number(&body)
    }

    // -----------------------------------------------------------------
    // Power
    // -----------------------------------------------------------------

    /// Current functionality level (`AT+CFUN?`).
    pub async fn modem_mode(&self) -> Result<ModemMode> {
        let body = self.send_command("AT+CFUN?", self.command_timeout).await?;
        commands::parse_modem_mode(&body)
    }

    /// Switch the functionality level (`AT+CFUN=n`).
    ///
    /// Only the three well-known modes can be requested; an opaque
    /// [`ModemMode::Other`] value is rejected with [`Error::State`].
    pub async fn set_modem_mode(&self, mode: ModemMode) -> Result<()> {
        if let ModemMode::Other(n) = mode {
            return Err(Error::State(format!("unsupported modem mode: CFUN {n}")));
        }
        self.send_command(
            &commands::cmd_set_functionality(mode.cfun()),
            MODE_SWITCH_TIMEOUT,
        )
        .await?;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Voice
    // -----------------------------------------------------------------

    /// Dial a voice call.
    pub async fn make_call(&self, number: &str) -> Result<()> {
        self.send_command(&commands::cmd_dial(number), DIAL_TIMEOUT)
            .await?;
        Ok(())
    }

    /// Answer an incoming call (`ATA`).
    pub async fn answer_call(&self) -> Result<()> {
        self.send_command("ATA", self.command_timeout).await?;
        Ok(())
    }

    /// Hang up the current call (`ATH`).
    pub async fn hang_up(&self) -> Result<()> {
        self.send_command("ATH", self.command_timeout).await?;
        Ok(())
    }

    /// Enable or disable call waiting (`AT+CCWA`).
    pub async fn set_call_waiting(&self, enable: bool) -> Result<()> {
        self.send_command(&commands::cmd_set_call_waiting(enable), self.command_timeout)
            .await?;
        Ok(())
    }

    /// List current calls (`AT+CLCC`).
    pub async fn call_status(&self) -> Result<Vec<CallInfo>> {
        let body = self.send_command("AT+CLCC", self.command_timeout).await?;
        Ok(commands::parse_call_list(&body))
    }

    // -----------------------------------------------------------------
    // USSD
    // -----------------------------------------------------------------

    /// Send a USSD code and return the network's reply.
    ///
    /// Depending on the modem, the reply arrives either inline in the
    /// command response or as a later `+CUSD:` URC; both paths are
    /// accepted. The URC path requires the event listener to be running.
    pub async fn send_ussd(&self, code: &str) -> Result<String> {
        self.send_command(&commands::cmd_set_charset("GSM"), self.command_timeout)
            .await?;

        let body = self
            .send_command(&commands::cmd_send_ussd(code), USSD_TIMEOUT)
            .await?;

        if let Some(message) = commands::parse_cusd_message(&body) {
            return Ok(message);
        }

        let event = self.wait_for_event(EventType::Ussd, USSD_TIMEOUT).await?;
        match event.kind {
            EventKind::Ussd { message } => Ok(message),
            _ => Err(Error::Parse("invalid USSD event payload".into())),
        }
    }
}
