//! AT command builders and response parsers.
//!
//! This module provides functions to construct command strings for the
//! operations gsmlib supports and to parse the corresponding responses.
//!
//! All functions are pure -- they produce or consume strings without
//! performing any I/O. The caller is responsible for sending commands over
//! a transport and feeding the accumulated response body back into the
//! parsers.
//!
//! # Response shape
//!
//! A response body is the newline-joined sequence of logical lines a
//! transaction accumulated, e.g. `"+CSQ: 20,0\nOK"`. Prefixed lines carry
//! comma-separated fields in which commas inside `"…"` do not split and
//! string fields are surrounded by quotes; [`split_fields`] implements that
//! tokenization once for every parser here.

use chrono::{DateTime, TimeZone, Utc};

use gsmlib_core::error::{Error, Result};
use gsmlib_core::types::*;

use crate::codec;

// ---------------------------------------------------------------
// Command builders
// ---------------------------------------------------------------

/// Build a "select operator by numeric code" command
/// (`AT+COPS=1,2,"25002"`).
pub fn cmd_select_operator(numeric: &str) -> String {
    format!("AT+COPS=1,2,\"{numeric}\"")
}

/// Build a "set TE character set" command (`AT+CSCS="GSM"` / `"UCS2"`).
pub fn cmd_set_charset(charset: &str) -> String {
    format!("AT+CSCS=\"{charset}\"")
}

/// Build an "enter PIN" command (`AT+CPIN="1234"`).
pub fn cmd_enter_pin(pin: &str) -> String {
    format!("AT+CPIN=\"{pin}\"")
}

/// Build a "set functionality level" command (`AT+CFUN=n`).
pub fn cmd_set_functionality(cfun: u8) -> String {
    format!("AT+CFUN={cfun}")
}

/// Build a voice dial command (`ATD+79991234567;`).
///
/// The trailing semicolon selects a voice call; without it the modem would
/// attempt a data call.
pub fn cmd_dial(number: &str) -> String {
    format!("ATD{number};")
}

/// Build a "set call waiting" command (`AT+CCWA=0,{0|1}`).
pub fn cmd_set_call_waiting(enable: bool) -> String {
    if enable {
        "AT+CCWA=0,1".to_string()
    } else {
        "AT+CCWA=0,0".to_string()
    }
}

/// Build a USSD request command (`AT+CUSD=1,"*100#",15`).
///
/// `1` asks the network to present the result; `15` is the default GSM
/// data coding scheme.
pub fn cmd_send_ussd(code: &str) -> String {
    format!("AT+CUSD=1,\"{code}\",15")
}

/// Build a "read stored message" command (`AT+CMGR=n`).
pub fn cmd_read_sms(index: u32) -> String {
    format!("AT+CMGR={index}")
}

/// Build a "list stored messages" command (`AT+CMGL="ALL"`).
pub fn cmd_list_sms(filter: SmsFilter) -> String {
    format!("AT+CMGL=\"{}\"", filter.as_str())
}

/// Build a "delete one message" command (`AT+CMGD=n`).
pub fn cmd_delete_sms(index: u32) -> String {
    format!("AT+CMGD={index}")
}

/// Build a bulk-delete command (`AT+CMGD=1,flag`).
///
/// The flag semantics follow 27.005: 1 = delete read, 2 = read+sent,
/// 3 = read+sent+unsent, 4 = all messages. Some modems diverge; see
/// [`cmd_delete_fallback`].
pub fn cmd_delete_bulk(flag: u8) -> String {
    format!("AT+CMGD=1,{flag}")
}

/// Build the vendor bulk-delete fallback (`AT+CMGDA="DEL ALL"`).
pub fn cmd_delete_fallback(what: &str) -> String {
    format!("AT+CMGDA=\"{what}\"")
}

/// Build a "select message storage" command
/// (`AT+CPMS="SM","SM","SM"`).
pub fn cmd_set_storage(read: SmsStorage, write: SmsStorage, receive: SmsStorage) -> String {
    format!(
        "AT+CPMS=\"{}\",\"{}\",\"{}\"",
        read.as_str(),
        write.as_str(),
        receive.as_str()
    )
}

/// Build a "new message indication" command (`AT+CNMI=2,1,0,0,0`).
pub fn cmd_new_sms_indication(mode: u8, mt: u8, bm: u8, ds: u8, bfr: u8) -> String {
    format!("AT+CNMI={mode},{mt},{bm},{ds},{bfr}")
}

// ---------------------------------------------------------------
// Generic parsing helpers
// ---------------------------------------------------------------

/// Split a prefixed response remainder into fields.
///
/// Splits on commas at quote depth 0 (commas inside `"…"` do not split),
/// trims each field, and strips surrounding quotes.
pub fn split_fields(data: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in data.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);

    fields
        .iter()
        .map(|f| f.trim().trim_matches('"').to_string())
        .collect()
}

/// Find the line starting with `prefix` and return the trimmed remainder.
pub fn response_line(body: &str, prefix: &str) -> Result<String> {
    body.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix(prefix))
        .map(|rest| rest.trim().to_string())
        .ok_or_else(|| Error::Parse(format!("prefix {prefix} not found in response")))
}

/// Find the line starting with `prefix` and split its remainder into
/// fields.
pub fn response_fields(body: &str, prefix: &str) -> Result<Vec<String>> {
    Ok(split_fields(&response_line(body, prefix)?))
}

/// Extract the payload of an identification-style response.
///
/// Returns the first line that is neither a result code nor a command echo,
/// with any `+FOO: ` prefix stripped.
pub fn extract_payload(body: &str) -> String {
    for line in body.lines().map(str::trim) {
        if line.is_empty()
            || line.starts_with("OK")
            || line.starts_with("ERROR")
            || line.starts_with("AT")
        {
            continue;
        }
        if let Some(idx) = line.find(':') {
            return line[idx + 1..].trim().to_string();
        }
        return line.to_string();
    }
    String::new()
}

/// Parse one integer field, with the prefix and field index in the error.
fn int_field<T: std::str::FromStr>(fields: &[String], idx: usize, prefix: &str) -> Result<T> {
    let raw = fields
        .get(idx)
        .ok_or_else(|| Error::Parse(format!("{prefix} response has no field {idx}")))?;
    raw.parse()
        .map_err(|_| Error::Parse(format!("{prefix} field {idx} is not a number: {raw:?}")))
}

// ---------------------------------------------------------------
// GSM timestamps
// ---------------------------------------------------------------

/// Parse a GSM service-center timestamp: `"YY/MM/DD,hh:mm:ss±zz"`.
///
/// The year is `2000 + YY`. The trailing time-zone field counts
/// quarter-hours but is discarded; the local instant is interpreted as UTC.
/// Any parse failure yields the Unix epoch.
pub fn parse_gsm_timestamp(s: &str) -> DateTime<Utc> {
    parse_gsm_timestamp_opt(s).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn parse_gsm_timestamp_opt(s: &str) -> Option<DateTime<Utc>> {
    let (date, time) = s.split_once(',')?;

    let mut date_parts = date.split('/');
    let yy: i32 = date_parts.next()?.parse().ok()?;
    let month: u32 = date_parts.next()?.parse().ok()?;
    let day: u32 = date_parts.next()?.parse().ok()?;

    // Chop the quarter-hour zone suffix ("+12" / "-08") before splitting
    // the clock fields.
    let clock = time.split(['+', '-']).next()?;
    let mut clock_parts = clock.split(':');
    let hour: u32 = clock_parts.next()?.parse().ok()?;
    let minute: u32 = clock_parts.next()?.parse().ok()?;
    let second: u32 = clock_parts.next()?.parse().ok()?;

    Utc.with_ymd_and_hms(2000 + yy, month, day, hour, minute, second)
        .single()
}

// ---------------------------------------------------------------
// Typed response parsers
// ---------------------------------------------------------------

/// Parse a `+CSQ: rssi,ber` response.
pub fn parse_signal_quality(body: &str) -> Result<SignalQuality> {
    let fields = response_fields(body, "+CSQ:")?;
    Ok(SignalQuality {
        rssi: int_field(&fields, 0, "+CSQ")?,
        ber: int_field(&fields, 1, "+CSQ")?,
    })
}

/// Parse a solicited registration response (`+CREG: n,stat` or
/// `+CGREG: n,stat`). The first field is the URC mode, the second the
/// status.
pub fn parse_registration(body: &str, prefix: &str) -> Result<NetworkStatus> {
    let fields = response_fields(body, prefix)?;
    let code: u8 = int_field(&fields, 1, prefix)?;
    Ok(NetworkStatus::from_code(code))
}

/// Parse the current operator from a `+COPS: mode,format,"name"[,act]`
/// response.
pub fn parse_current_operator(body: &str) -> Result<OperatorInfo> {
    let fields = response_fields(body, "+COPS:")?;
    if fields.len() < 3 {
        return Err(Error::Parse(format!(
            "+COPS response too short: {} fields",
            fields.len()
        )));
    }
    Ok(OperatorInfo {
        status: OperatorStatus::Current,
        long_name: fields[2].clone(),
        short_name: String::new(),
        numeric: fields.get(3).cloned().unwrap_or_default(),
    })
}

/// Parse an operator scan: `+COPS: (2,"MegaFon","MegaFon","25002",0),(…)`.
///
/// Groups are separated by `),(` after trimming the outer parentheses.
pub fn parse_operator_scan(body: &str) -> Result<Vec<OperatorInfo>> {
    let data = response_line(body, "+COPS:")?;
    let data = data.trim().trim_matches(|c| c == '(' || c == ')');

    let mut operators = Vec::new();
    for group in data.split("),(") {
        let fields = split_fields(group.trim_matches(|c| c == '(' || c == ')'));
        if fields.len() < 4 {
            continue;
        }
        let status_code: u8 = fields[0].parse().unwrap_or(0);
        operators.push(OperatorInfo {
            status: OperatorStatus::from_code(status_code),
            long_name: fields[1].clone(),
            short_name: fields[2].clone(),
            numeric: fields[3].clone(),
        });
    }
    Ok(operators)
}

/// Parse a `+CPIN: <token>` response.
pub fn parse_pin_status(body: &str) -> Result<PinStatus> {
    let token = response_line(body, "+CPIN:")?;
    Ok(PinStatus::from_token(&token))
}

/// Parse a `+CFUN: n` response.
pub fn parse_modem_mode(body: &str) -> Result<ModemMode> {
    let fields = response_fields(body, "+CFUN:")?;
    let code: u8 = int_field(&fields, 0, "+CFUN")?;
    Ok(ModemMode::from_cfun(code))
}

/// Parse the subscriber number from `+CNUM: "","79991234567",145`.
pub fn parse_sim_number(body: &str) -> Result<String> {
    let fields = response_fields(body, "+CNUM:")?;
    match fields.get(1) {
        Some(number) if !number.is_empty() => Ok(number.clone()),
        _ => Err(Error::Parse("phone number not stored on SIM".into())),
    }
}

/// Parse every `+CLCC:` row of a current-call listing.
pub fn parse_call_list(body: &str) -> Vec<CallInfo> {
    let mut calls = Vec::new();
    for line in body.lines().map(str::trim) {
        let Some(rest) = line.strip_prefix("+CLCC:") else {
            continue;
        };
        let fields = split_fields(rest);
        if fields.len() < 6 {
            continue;
        }
        let Ok(id) = fields[0].parse() else { continue };
        calls.push(CallInfo {
            id,
            direction: match fields[1].as_str() {
                "0" => CallDirection::Outgoing,
                "1" => CallDirection::Incoming,
                _ => CallDirection::Unknown,
            },
            state: match fields[2].as_str() {
                "0" => CallState::Active,
                "1" => CallState::Held,
                "2" => CallState::Dialing,
                "3" => CallState::Alerting,
                "4" => CallState::Incoming,
                "5" => CallState::Waiting,
                _ => CallState::Unknown,
            },
            mode: match fields[3].as_str() {
                "0" => CallMode::Voice,
                "1" => CallMode::Data,
                "2" => CallMode::Fax,
                _ => CallMode::Unknown,
            },
            multiparty: fields[4] == "1",
            number: fields[5].clone(),
        });
    }
    calls
}

/// Parse `+CPMS: "SM",10,20,"SM",10,20,"SM",10,20` into the three storage
/// slots.
pub fn parse_storage_info(body: &str) -> Result<StorageInfo> {
    let fields = response_fields(body, "+CPMS:")?;
    if fields.len() < 9 {
        return Err(Error::Parse(format!(
            "+CPMS response too short: {} fields",
            fields.len()
        )));
    }
    let slot = |offset: usize| -> Result<StorageSlot> {
        Ok(StorageSlot {
            storage: fields[offset].clone(),
            used: int_field(&fields, offset + 1, "+CPMS")?,
            total: int_field(&fields, offset + 2, "+CPMS")?,
        })
    };
    Ok(StorageInfo {
        read: slot(0)?,
        write: slot(3)?,
        receive: slot(6)?,
    })
}

/// Pull the USSD message out of a body that carries `+CUSD:` inline.
///
/// Some modems deliver the USSD reply in the synchronous response instead
/// of as a URC; both paths must be accepted.
pub fn parse_cusd_message(body: &str) -> Option<String> {
    let fields = response_fields(body, "+CUSD:").ok()?;
    fields.get(1).filter(|m| !m.is_empty()).cloned()
}

// ---------------------------------------------------------------
// SMS response parsers
// ---------------------------------------------------------------

/// Parse an `AT+CMGR=n` response: the `+CMGR:` header plus the payload
/// line that follows it.
pub fn parse_sms_read(body: &str, index: u32) -> Result<SmsMessage> {
    let lines: Vec<&str> = body.lines().map(str::trim).collect();

    for (i, line) in lines.iter().enumerate() {
        let Some(rest) = line.strip_prefix("+CMGR:") else {
            continue;
        };
        // +CMGR: "REC UNREAD","+79991234567","","20/01/01,12:00:00+12"
        let fields = split_fields(rest);
        if fields.len() < 2 {
            return Err(Error::Parse(format!("+CMGR header too short: {line:?}")));
        }
        let status = SmsStatus::from_token(&fields[0])
            .ok_or_else(|| Error::Parse(format!("unknown SMS status: {:?}", fields[0])))?;
        let time = fields
            .get(3)
            .map(|t| parse_gsm_timestamp(t))
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        // The message body is the next non-empty, non-terminal line.
        let text = lines
            .iter()
            .skip(i + 1)
            .find(|l| !l.is_empty() && **l != "OK")
            .map(|l| codec::decode_gsm_text(l))
            .unwrap_or_default();

        return Ok(SmsMessage {
            index,
            status,
            sender: codec::decode_gsm_text(&fields[1]),
            receiver: None,
            time,
            text,
        });
    }

    Err(Error::Parse("no +CMGR header in response".into()))
}

/// Parse an `AT+CMGL` response: a sequence of `+CMGL:` headers, each
/// followed by its own payload line, in modem-returned order.
pub fn parse_sms_list(body: &str) -> Result<Vec<SmsMessage>> {
    let lines: Vec<&str> = body.lines().map(str::trim).collect();
    let mut messages = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let Some(rest) = lines[i].strip_prefix("+CMGL:") else {
            i += 1;
            continue;
        };
        // +CMGL: 1,"REC UNREAD","+79991234567","","20/01/01,12:00:00+12"
        let fields = split_fields(rest);
        if fields.len() < 2 {
            i += 1;
            continue;
        }
        let Ok(index) = fields[0].parse() else {
            i += 1;
            continue;
        };
        let Some(status) = SmsStatus::from_token(&fields[1]) else {
            i += 1;
            continue;
        };

        let sender = fields
            .get(2)
            .map(|s| codec::decode_gsm_text(s))
            .unwrap_or_default();
        let time = fields
            .get(4)
            .map(|t| parse_gsm_timestamp(t))
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        let mut text = String::new();
        if let Some(next) = lines.get(i + 1) {
            if !next.is_empty() && *next != "OK" && !next.starts_with("+CMGL:") {
                text = codec::decode_gsm_text(next);
                i += 1; // the payload line is consumed with its header
            }
        }

        messages.push(SmsMessage {
            index,
            status,
            sender,
            receiver: None,
            time,
            text,
        });
        i += 1;
    }

    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------
    // Command builders
    // ---------------------------------------------------------------

    #[test]
    fn builds_quoted_commands() {
        assert_eq!(cmd_select_operator("25002"), "AT+COPS=1,2,\"25002\"");
        assert_eq!(cmd_set_charset("UCS2"), "AT+CSCS=\"UCS2\"");
        assert_eq!(cmd_enter_pin("1234"), "AT+CPIN=\"1234\"");
        assert_eq!(cmd_send_ussd("*100#"), "AT+CUSD=1,\"*100#\",15");
        assert_eq!(cmd_dial("+79991234567"), "ATD+79991234567;");
    }

    #[test]
    fn builds_sms_commands() {
        assert_eq!(cmd_read_sms(5), "AT+CMGR=5");
        assert_eq!(cmd_list_sms(SmsFilter::RecUnread), "AT+CMGL=\"REC UNREAD\"");
        assert_eq!(cmd_list_sms(SmsFilter::All), "AT+CMGL=\"ALL\"");
        assert_eq!(cmd_delete_sms(3), "AT+CMGD=3");
        assert_eq!(cmd_delete_bulk(4), "AT+CMGD=1,4");
        assert_eq!(cmd_delete_fallback("DEL ALL"), "AT+CMGDA=\"DEL ALL\"");
        assert_eq!(
            cmd_set_storage(SmsStorage::Sim, SmsStorage::Phone, SmsStorage::Sim),
            "AT+CPMS=\"SM\",\"ME\",\"SM\""
        );
        assert_eq!(cmd_new_sms_indication(2, 1, 0, 0, 0), "AT+CNMI=2,1,0,0,0");
    }

    #[test]
    fn builds_call_waiting() {
        assert_eq!(cmd_set_call_waiting(true), "AT+CCWA=0,1");
        assert_eq!(cmd_set_call_waiting(false), "AT+CCWA=0,0");
    }

    // ---------------------------------------------------------------
    // split_fields
    // ---------------------------------------------------------------

    #[test]
    fn split_fields_basic() {
        assert_eq!(split_fields("20,0"), vec!["20", "0"]);
    }

    #[test]
    fn split_fields_strips_quotes_and_spaces() {
        assert_eq!(
            split_fields(" \"REC UNREAD\", \"+79991234567\" ,\"\""),
            vec!["REC UNREAD", "+79991234567", ""]
        );
    }

    #[test]
    fn split_fields_keeps_commas_inside_quotes() {
        assert_eq!(
            split_fields("1,\"REC UNREAD\",\"+79991234567\",\"\",\"20/01/01,12:00:00+12\""),
            vec![
                "1",
                "REC UNREAD",
                "+79991234567",
                "",
                "20/01/01,12:00:00+12"
            ]
        );
    }

    // ---------------------------------------------------------------
    // response_line / response_fields / extract_payload
    // ---------------------------------------------------------------

    #[test]
    fn response_line_finds_prefixed_line() {
        let body = "+CSQ: 20,0\nOK";
        assert_eq!(response_line(body, "+CSQ:").unwrap(), "20,0");
    }

    #[test]
    fn response_line_missing_prefix_is_parse_error() {
        let err = response_line("OK", "+CSQ:").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn extract_payload_identification() {
        assert_eq!(extract_payload("SIMCOM_Ltd\nOK"), "SIMCOM_Ltd");
        assert_eq!(extract_payload("861234567890123\nOK"), "861234567890123");
        // Prefixed form loses the prefix.
        assert_eq!(extract_payload("+CGMI: Quectel\nOK"), "Quectel");
        assert_eq!(extract_payload("OK"), "");
    }

    // ---------------------------------------------------------------
    // GSM timestamps
    // ---------------------------------------------------------------

    #[test]
    fn gsm_timestamp_parses_as_utc() {
        let t = parse_gsm_timestamp("20/01/01,12:00:00+12");
        assert_eq!(t, Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn gsm_timestamp_negative_zone_is_dropped_too() {
        let t = parse_gsm_timestamp("24/06/15,23:59:59-08");
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 6, 15, 23, 59, 59).unwrap());
    }

    #[test]
    fn gsm_timestamp_failure_is_epoch() {
        assert_eq!(parse_gsm_timestamp(""), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(parse_gsm_timestamp("garbage"), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(
            parse_gsm_timestamp("20/13/45,99:99:99+00"),
            DateTime::<Utc>::UNIX_EPOCH
        );
    }

    // ---------------------------------------------------------------
    // Typed parsers
    // ---------------------------------------------------------------

    #[test]
    fn parses_signal_quality() {
        let q = parse_signal_quality("+CSQ: 20,0\nOK").unwrap();
        assert_eq!(q, SignalQuality { rssi: 20, ber: 0 });
    }

    #[test]
    fn parses_signal_quality_unknown() {
        let q = parse_signal_quality("+CSQ: 99,99\nOK").unwrap();
        assert!(!q.rssi_known());
    }

    #[test]
    fn signal_quality_bad_arity_is_parse_error() {
        assert!(matches!(
            parse_signal_quality("+CSQ: 20\nOK").unwrap_err(),
            Error::Parse(_)
        ));
    }

    #[test]
    fn parses_registration_status() {
        let s = parse_registration("+CREG: 0,1\nOK", "+CREG:").unwrap();
        assert_eq!(s, NetworkStatus::RegisteredHome);

        let s = parse_registration("+CGREG: 0,5\nOK", "+CGREG:").unwrap();
        assert_eq!(s, NetworkStatus::RegisteredRoaming);
    }

    #[test]
    fn parses_current_operator() {
        let op = parse_current_operator("+COPS: 0,0,\"MegaFon\",2\nOK").unwrap();
        assert_eq!(op.long_name, "MegaFon");
        assert_eq!(op.numeric, "2");
    }

    #[test]
    fn parses_operator_scan() {
        let body = "+COPS: (2,\"MegaFon\",\"MegaFon\",\"25002\",0),(1,\"MTS\",\"MTS\",\"25001\",0)\nOK";
        let ops = parse_operator_scan(body).unwrap();
        assert_eq!(ops.len(), 2);

        assert_eq!(ops[0].status, OperatorStatus::Current);
        assert_eq!(ops[0].long_name, "MegaFon");
        assert_eq!(ops[0].short_name, "MegaFon");
        assert_eq!(ops[0].numeric, "25002");

        assert_eq!(ops[1].status, OperatorStatus::Available);
        assert_eq!(ops[1].long_name, "MTS");
        assert_eq!(ops[1].numeric, "25001");
    }

    #[test]
    fn parses_pin_status() {
        assert_eq!(
            parse_pin_status("+CPIN: READY\nOK").unwrap(),
            PinStatus::Ready
        );
        assert_eq!(
            parse_pin_status("+CPIN: SIM PUK\nOK").unwrap(),
            PinStatus::PukRequired
        );
    }

    #[test]
    fn parses_modem_mode() {
        assert_eq!(parse_modem_mode("+CFUN: 1\nOK").unwrap(), ModemMode::Online);
        assert_eq!(
            parse_modem_mode("+CFUN: 4\nOK").unwrap(),
            ModemMode::Offline
        );
        assert_eq!(
            parse_modem_mode("+CFUN: 5\nOK").unwrap(),
            ModemMode::Other(5)
        );
    }

    #[test]
    fn parses_sim_number() {
        let body = "+CNUM: \"\",\"79991234567\",145\nOK";
        assert_eq!(parse_sim_number(body).unwrap(), "79991234567");
    }

    #[test]
    fn sim_number_empty_is_parse_error() {
        let body = "+CNUM: \"\",\"\",145\nOK";
        assert!(matches!(parse_sim_number(body).unwrap_err(), Error::Parse(_)));
    }

    #[test]
    fn parses_call_list() {
        let body = "+CLCC: 1,0,2,0,0,\"+79991234567\",145\nOK";
        let calls = parse_call_list(body);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, 1);
        assert_eq!(calls[0].direction, CallDirection::Outgoing);
        assert_eq!(calls[0].state, CallState::Dialing);
        assert_eq!(calls[0].mode, CallMode::Voice);
        assert!(!calls[0].multiparty);
        assert_eq!(calls[0].number, "+79991234567");
    }

    #[test]
    fn call_list_empty_body() {
        assert!(parse_call_list("OK").is_empty());
    }

    #[test]
    fn parses_storage_info() {
        let body = "+CPMS: \"SM\",10,20,\"ME\",5,100,\"SM\",10,20\nOK";
        let info = parse_storage_info(body).unwrap();
        assert_eq!(info.read.storage, "SM");
        assert_eq!(info.read.used, 10);
        assert_eq!(info.read.total, 20);
        assert_eq!(info.write.storage, "ME");
        assert_eq!(info.write.used, 5);
        assert_eq!(info.write.total, 100);
        assert_eq!(info.receive.storage, "SM");
    }

    #[test]
    fn parses_inline_cusd() {
        let body = "+CUSD: 0,\"Balance: 100.50 RUB\",15\nOK";
        assert_eq!(
            parse_cusd_message(body).unwrap(),
            "Balance: 100.50 RUB"
        );
        assert_eq!(parse_cusd_message("OK"), None);
    }

    // ---------------------------------------------------------------
    // SMS parsers
    // ---------------------------------------------------------------

    #[test]
    fn parses_cmgr_ascii() {
        let body = "+CMGR: \"REC UNREAD\",\"+79991234567\",\"\",\"20/01/01,12:00:00+12\"\nhello\nOK";
        let sms = parse_sms_read(body, 7).unwrap();
        assert_eq!(sms.index, 7);
        assert_eq!(sms.status, SmsStatus::RecUnread);
        assert_eq!(sms.sender, "+79991234567");
        assert_eq!(sms.text, "hello");
        assert_eq!(
            sms.time,
            Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn parses_cmgr_ucs2_payload() {
        let body =
            "+CMGR: \"REC READ\",\"+79991234567\",\"\",\"20/01/01,12:00:00+12\"\n043F044004380432043504420021\nOK";
        let sms = parse_sms_read(body, 1).unwrap();
        assert_eq!(sms.text, "привет!");
    }

    #[test]
    fn cmgr_missing_header_is_parse_error() {
        assert!(matches!(
            parse_sms_read("OK", 1).unwrap_err(),
            Error::Parse(_)
        ));
    }

    #[test]
    fn parses_cmgl_pairs_in_order() {
        let body = "+CMGL: 1,\"REC UNREAD\",\"+79991234567\",\"\",\"20/01/01,12:00:00+12\"\n\
                    hello\n\
                    +CMGL: 2,\"REC UNREAD\",\"+79997654321\",\"\",\"20/01/01,12:00:05+12\"\n\
                    043F044004380432043504420021\n\
                    OK";
        let list = parse_sms_list(body).unwrap();
        assert_eq!(list.len(), 2);

        assert_eq!(list[0].index, 1);
        assert_eq!(list[0].sender, "+79991234567");
        assert_eq!(list[0].text, "hello");
        assert_eq!(
            list[0].time,
            Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap()
        );

        assert_eq!(list[1].index, 2);
        assert_eq!(list[1].text, "привет!");
        assert_eq!(
            list[1].time,
            Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 5).unwrap()
        );
    }

    #[test]
    fn cmgl_empty_list() {
        assert!(parse_sms_list("OK").unwrap().is_empty());
    }

    #[test]
    fn cmgl_header_without_payload() {
        // Back-to-back headers: the first message has no body line.
        let body = "+CMGL: 1,\"REC READ\",\"+111\",\"\",\"20/01/01,10:00:00+12\"\n\
                    +CMGL: 2,\"REC READ\",\"+222\",\"\",\"20/01/01,11:00:00+12\"\n\
                    text\n\
                    OK";
        let list = parse_sms_list(body).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].text, "");
        assert_eq!(list[1].text, "text");
    }
}
