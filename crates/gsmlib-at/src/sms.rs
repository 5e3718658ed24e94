//! SMS engine: send, read, list, delete, storage selection.
//!
//! Text-mode (`AT+CMGF=1`) only. Sending auto-selects the character set:
//! payloads that fit 7-bit ASCII go out under `AT+CSCS="GSM"`, anything
//! else switches the modem to UCS-2, hex-encodes both the recipient number
//! and the body, and restores the GSM charset afterwards.
//!
//! Long texts have no PDU concatenation here (PDU mode is out of scope);
//! [`GsmModem::send_long_sms`] falls back to `[i/N] `-prefixed chunks sent
//! as independent messages, split at word boundaries.

use std::time::Duration;

use tracing::debug;

use gsmlib_core::error::Result;
use gsmlib_core::types::*;

use crate::codec;
use crate::commands;
use crate::modem::GsmModem;

/// Submission waits on the network, not just the modem.
const SMS_SEND_TIMEOUT: Duration = Duration::from_secs(30);
const SMS_READ_TIMEOUT: Duration = Duration::from_secs(2);
const SMS_LIST_TIMEOUT: Duration = Duration::from_secs(5);
const BULK_DELETE_TIMEOUT: Duration = Duration::from_secs(5);

/// A single GSM-7 message holds 160 septets; anything longer goes through
/// the chunked fallback.
const MAX_SINGLE_LENGTH: usize = 160;
/// Chunk budget, leaving room for the `[i/N] ` prefix.
const CHUNK_LENGTH: usize = 150;
/// How far to scan back from a chunk boundary for a space.
const WORD_BREAK_SCAN: usize = 20;

/// Pause between chunks of a long message so they arrive in order.
const INTER_CHUNK_DELAY: Duration = Duration::from_secs(1);

impl GsmModem {
    /// Send one SMS.
    ///
    /// Chooses GSM-7 or UCS-2 automatically. For UCS-2, the recipient
    /// number travels hex-encoded like the body, and the charset is
    /// restored to GSM afterwards even if the submission failed.
    pub async fn send_sms(&self, number: &str, text: &str) -> Result<()> {
        self.send_command("AT+CMGF=1", self.command_timeout).await?;

        let ucs2 = codec::needs_ucs2(text);
        let (number_field, payload) = if ucs2 {
            self.send_command(&commands::cmd_set_charset("UCS2"), self.command_timeout)
                .await?;
            (codec::encode_ucs2(number), codec::encode_ucs2(text))
        } else {
            self.send_command(&commands::cmd_set_charset("GSM"), self.command_timeout)
                .await?;
            (number.to_string(), text.to_string())
        };

        debug!(number, ucs2, len = text.len(), "sending SMS");
        let result = self
            .send_sms_payload(&number_field, &payload, SMS_SEND_TIMEOUT)
            .await;

        if ucs2 {
            let _ = self
                .send_command(&commands::cmd_set_charset("GSM"), self.command_timeout)
                .await;
        }

        result.map(|_| ())
    }

    /// Send a text of arbitrary length.
    ///
    /// Texts within a single message are sent as-is. Longer texts are
    /// split into word-boundary chunks prefixed `[i/N] ` and sent
    /// sequentially with a delay in between; receivers see separate
    /// messages, not a reassembled one.
    pub async fn send_long_sms(&self, number: &str, text: &str) -> Result<()> {
        if text.chars().count() <= MAX_SINGLE_LENGTH {
            return self.send_sms(number, text).await;
        }

        let chunks = split_text(text, CHUNK_LENGTH);
        let total = chunks.len();
        debug!(number, total, "sending long SMS in chunks");

        for (i, chunk) in chunks.iter().enumerate() {
            let message = format!("[{}/{}] {}", i + 1, total, chunk);
            self.send_sms(number, &message).await?;
            if i + 1 < total {
                tokio::time::sleep(INTER_CHUNK_DELAY).await;
            }
        }
        Ok(())
    }

    /// Read one stored message (`AT+CMGR`). On most modems this also marks
    /// it as read.
    pub async fn read_sms(&self, index: u32) -> Result<SmsMessage> {
        self.send_command("AT+CMGF=1", self.command_timeout).await?;
        let body = self
            .send_command(&commands::cmd_read_sms(index), SMS_READ_TIMEOUT)
            .await?;
        commands::parse_sms_read(&body, index)
    }

    /// List stored messages matching a status filter (`AT+CMGL`), in
    /// modem-returned order.
    pub async fn list_sms(&self, filter: SmsFilter) -> Result<Vec<SmsMessage>> {
        self.send_command("AT+CMGF=1", self.command_timeout).await?;
        let body = self
            .send_command(&commands::cmd_list_sms(filter), SMS_LIST_TIMEOUT)
            .await?;
        commands::parse_sms_list(&body)
    }

    /// All unread messages.
    pub async fn list_unread_sms(&self) -> Result<Vec<SmsMessage>> {
        self.list_sms(SmsFilter::RecUnread).await
    }

    /// All read messages.
    pub async fn list_read_sms(&self) -> Result<Vec<SmsMessage>> {
        self.list_sms(SmsFilter::RecRead).await
    }

    /// All stored sent messages.
    pub async fn list_sent_sms(&self) -> Result<Vec<SmsMessage>> {
        self.list_sms(SmsFilter::StoSent).await
    }

    /// All stored unsent messages.
    pub async fn list_unsent_sms(&self) -> Result<Vec<SmsMessage>> {
        self.list_sms(SmsFilter::StoUnsent).await
    }

    /// Number of unread messages.
    pub async fn count_unread_sms(&self) -> Result<usize> {
        Ok(self.list_unread_sms().await?.len())
    }

    /// Mark a message as read by reading it.
    pub async fn mark_sms_read(&self, index: u32) -> Result<()> {
        self.read_sms(index).await.map(|_| ())
    }

    /// Delete one stored message (`AT+CMGD=n`).
    pub async fn delete_sms(&self, index: u32) -> Result<()> {
        self.send_command(&commands::cmd_delete_sms(index), SMS_READ_TIMEOUT)
            .await?;
        Ok(())
    }

    /// Delete every stored message.
    ///
    /// Tries `AT+CMGD=1,4` first; modems that reject the flagged form get
    /// the vendor fallback `AT+CMGDA="DEL ALL"`.
    pub async fn delete_all_sms(&self) -> Result<()> {
        if let Err(e) = self
            .send_command(&commands::cmd_delete_bulk(4), BULK_DELETE_TIMEOUT)
            .await
        {
            debug!(error = %e, "flagged bulk delete rejected, trying AT+CMGDA");
            self.send_command(
                &commands::cmd_delete_fallback("DEL ALL"),
                BULK_DELETE_TIMEOUT,
            )
            .await?;
        }
        Ok(())
    }

    /// Delete all read messages, with the same fallback scheme as
    /// [`delete_all_sms`](Self::delete_all_sms).
    pub async fn delete_read_sms(&self) -> Result<()> {
        if let Err(e) = self
            .send_command(&commands::cmd_delete_bulk(1), BULK_DELETE_TIMEOUT)
            .await
        {
            debug!(error = %e, "flagged bulk delete rejected, trying AT+CMGDA");
            self.send_command(
                &commands::cmd_delete_fallback("DEL READ"),
                BULK_DELETE_TIMEOUT,
            )
            .await?;
        }
        Ok(())
    }

    /// Bulk delete with a raw `AT+CMGD=1,<flag>` flag, for modems whose
    /// flag semantics diverge from 27.005.
    pub async fn delete_sms_by_status(&self, flag: u8) -> Result<()> {
        self.send_command(&commands::cmd_delete_bulk(flag), BULK_DELETE_TIMEOUT)
            .await?;
        Ok(())
    }

    /// Select the read/write/receive message storage areas (`AT+CPMS`).
    pub async fn set_sms_storage(
        &self,
        read: SmsStorage,
        write: SmsStorage,
        receive: SmsStorage,
    ) -> Result<()> {
        self.send_command(
            &commands::cmd_set_storage(read, write, receive),
            self.command_timeout,
        )
        .await?;
        Ok(())
    }

    /// Usage of the three storage slots (`AT+CPMS?`).
    pub async fn sms_storage_info(&self) -> Result<StorageInfo> {
        let body = self.send_command("AT+CPMS?", self.command_timeout).await?;
        commands::parse_storage_info(&body)
    }

    /// Configure new-message indications (`AT+CNMI`).
    pub async fn set_new_sms_indication(
        &self,
        mode: u8,
        mt: u8,
        bm: u8,
        ds: u8,
        bfr: u8,
    ) -> Result<()> {
        self.send_command(
            &commands::cmd_new_sms_indication(mode, mt, bm, ds, bfr),
            self.command_timeout,
        )
        .await?;
        Ok(())
    }
}

/// Split text into chunks of at most `max_len` characters, preferring to
/// break at a space within the last [`WORD_BREAK_SCAN`] characters of the
/// boundary.
fn split_text(text: &str, max_len: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut parts = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        if chars.len() - start <= max_len {
            parts.push(chars[start..].iter().collect());
            break;
        }

        let mut split_at = start + max_len;
        let scan_floor = split_at.saturating_sub(WORD_BREAK_SCAN).max(start + 1);
        for i in (scan_floor..split_at).rev() {
            if chars[i] == ' ' {
                split_at = i;
                break;
            }
        }

        parts.push(chars[start..split_at].iter().collect());
        start = split_at;
        // Whitespace at the break belongs to neither chunk.
        while start < chars.len() && chars[start] == ' ' {
            start += 1;
        }
    }

    parts
}
