//! Unsolicited result code (URC) classification.
//!
//! A stateless mapping from one framed modem line to the structured
//! [`EventKind`] it announces. Lines that are not recognized URCs yield
//! `None` and are dropped by the dispatcher.

use gsmlib_core::events::EventKind;
use gsmlib_core::types::NetworkStatus;

use crate::commands::split_fields;

/// Map an unsolicited line to its event payload, or `None` if the line is
/// not a recognized URC.
pub fn parse_urc_line(line: &str) -> Option<EventKind> {
    // +CMTI: "SM",1
    if let Some(rest) = line.strip_prefix("+CMTI:") {
        let fields = split_fields(rest);
        let storage = fields.first()?.clone();
        let index = fields.get(1)?.parse().ok()?;
        return Some(EventKind::NewSms { storage, index });
    }

    // RING / +CRING: VOICE
    if line == "RING" || line.starts_with("+CRING:") {
        return Some(EventKind::IncomingCall { number: None });
    }

    // +CLIP: "+79991234567",145,"",,"",0
    if let Some(rest) = line.strip_prefix("+CLIP:") {
        let fields = split_fields(rest);
        let number = fields.first().filter(|n| !n.is_empty()).cloned();
        return Some(EventKind::IncomingCall { number });
    }

    // +CREG: 1  /  +CREG: 1,"1A2B","04F2"
    if let Some(rest) = line.strip_prefix("+CREG:") {
        let fields = split_fields(rest);
        let code: u8 = fields.first()?.parse().ok()?;
        return Some(EventKind::NetworkChange {
            status: NetworkStatus::from_code(code),
            lac: fields.get(1).filter(|f| !f.is_empty()).cloned(),
            cell_id: fields.get(2).filter(|f| !f.is_empty()).cloned(),
        });
    }

    // +CUSD: 0,"Balance: 100.50 RUB",15
    if let Some(rest) = line.strip_prefix("+CUSD:") {
        let fields = split_fields(rest);
        let message = fields.get(1)?.clone();
        return Some(EventKind::Ussd { message });
    }

    // +CDS: … delivery report, body not parsed.
    if line.starts_with("+CDS:") {
        return Some(EventKind::SmsDeliveryReport);
    }

    if line == "NO CARRIER" || line == "BUSY" || line == "NO ANSWER" {
        return Some(EventKind::CallEnded {
            reason: line.to_string(),
        });
    }

    if line.starts_with("+CME ERROR:") || line.starts_with("+CMS ERROR:") {
        return Some(EventKind::ModemError {
            error: line.to_string(),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmti_new_sms() {
        match parse_urc_line("+CMTI: \"SM\",3").unwrap() {
            EventKind::NewSms { storage, index } => {
                assert_eq!(storage, "SM");
                assert_eq!(index, 3);
            }
            other => panic!("expected NewSms, got {other:?}"),
        }
    }

    #[test]
    fn cmti_malformed_index_is_dropped() {
        assert!(parse_urc_line("+CMTI: \"SM\",x").is_none());
    }

    #[test]
    fn ring_and_cring_are_incoming_calls() {
        for line in ["RING", "+CRING: VOICE"] {
            match parse_urc_line(line).unwrap() {
                EventKind::IncomingCall { number } => assert!(number.is_none()),
                other => panic!("expected IncomingCall, got {other:?}"),
            }
        }
    }

    #[test]
    fn clip_carries_the_caller_number() {
        match parse_urc_line("+CLIP: \"+79991234567\",145,\"\",,\"\",0").unwrap() {
            EventKind::IncomingCall { number } => {
                assert_eq!(number.as_deref(), Some("+79991234567"));
            }
            other => panic!("expected IncomingCall, got {other:?}"),
        }
    }

    #[test]
    fn creg_status_only() {
        match parse_urc_line("+CREG: 1").unwrap() {
            EventKind::NetworkChange {
                status,
                lac,
                cell_id,
            } => {
                assert_eq!(status, NetworkStatus::RegisteredHome);
                assert!(lac.is_none());
                assert!(cell_id.is_none());
            }
            other => panic!("expected NetworkChange, got {other:?}"),
        }
    }

    #[test]
    fn creg_with_cell_info() {
        match parse_urc_line("+CREG: 5,\"1A2B\",\"04F2\"").unwrap() {
            EventKind::NetworkChange {
                status,
                lac,
                cell_id,
            } => {
                assert_eq!(status, NetworkStatus::RegisteredRoaming);
                assert_eq!(lac.as_deref(), Some("1A2B"));
                assert_eq!(cell_id.as_deref(), Some("04F2"));
            }
            other => panic!("expected NetworkChange, got {other:?}"),
        }
    }

    #[test]
    fn cusd_message() {
        match parse_urc_line("+CUSD: 0,\"Balance: 100.50 RUB\",15").unwrap() {
            EventKind::Ussd { message } => assert_eq!(message, "Balance: 100.50 RUB"),
            other => panic!("expected Ussd, got {other:?}"),
        }
    }

    #[test]
    fn cds_delivery_report() {
        assert!(matches!(
            parse_urc_line("+CDS: 6,34,\"+79991234567\"").unwrap(),
            EventKind::SmsDeliveryReport
        ));
    }

    #[test]
    fn call_end_reasons_keep_the_raw_line() {
        for line in ["NO CARRIER", "BUSY", "NO ANSWER"] {
            match parse_urc_line(line).unwrap() {
                EventKind::CallEnded { reason } => assert_eq!(reason, line),
                other => panic!("expected CallEnded, got {other:?}"),
            }
        }
    }

    #[test]
    fn cme_and_cms_errors() {
        match parse_urc_line("+CME ERROR: 10").unwrap() {
            EventKind::ModemError { error } => assert_eq!(error, "+CME ERROR: 10"),
            other => panic!("expected ModemError, got {other:?}"),
        }
        assert!(matches!(
            parse_urc_line("+CMS ERROR: 305").unwrap(),
            EventKind::ModemError { .. }
        ));
    }

    #[test]
    fn unknown_lines_are_dropped() {
        assert!(parse_urc_line("OK").is_none());
        assert!(parse_urc_line("+CSQ: 20,0").is_none());
        assert!(parse_urc_line("random noise").is_none());
    }
}
