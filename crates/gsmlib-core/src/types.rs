//! Core types used throughout gsmlib.
//!
//! These types give a typed view over the integer and quoted-string fields
//! that 3GPP 27.007 responses are made of. Raw wire values are preserved
//! where the standard leaves room for vendor extensions.

use std::fmt;

use chrono::{DateTime, Utc};

/// GSM network registration status, as reported by `+CREG` / `+CGREG`.
///
/// The discriminants map verbatim to the `<stat>` integer of
/// 3GPP TS 27.007 §7.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkStatus {
    /// Not registered, not currently searching.
    NotRegistered,
    /// Registered to the home network.
    RegisteredHome,
    /// Not registered, searching for a network.
    Searching,
    /// Registration was denied by the network.
    Denied,
    /// Status unknown.
    Unknown,
    /// Registered to a visited network (roaming).
    RegisteredRoaming,
}

impl NetworkStatus {
    /// Map a raw `<stat>` integer to a status. Values outside 0..=5 map to
    /// [`NetworkStatus::Unknown`].
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => NetworkStatus::NotRegistered,
            1 => NetworkStatus::RegisteredHome,
            2 => NetworkStatus::Searching,
            3 => NetworkStatus::Denied,
            5 => NetworkStatus::RegisteredRoaming,
            _ => NetworkStatus::Unknown,
        }
    }

    /// `true` when the modem is registered (home or roaming).
    pub fn is_registered(&self) -> bool {
        matches!(
            self,
            NetworkStatus::RegisteredHome | NetworkStatus::RegisteredRoaming
        )
    }
}

impl fmt::Display for NetworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NetworkStatus::NotRegistered => "Not registered",
            NetworkStatus::RegisteredHome => "Registered (home)",
            NetworkStatus::Searching => "Searching",
            NetworkStatus::Denied => "Registration denied",
            NetworkStatus::Unknown => "Unknown",
            NetworkStatus::RegisteredRoaming => "Registered (roaming)",
        };
        write!(f, "{s}")
    }
}

/// Signal quality as reported by `AT+CSQ`.
///
/// `rssi` ranges 0..=31 (99 = unknown); `ber` ranges 0..=7 (99 = unknown).
/// A rough reading of `rssi`: 0-9 poor, 10-14 fair, 15-19 good, 20-31
/// excellent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalQuality {
    /// Received signal strength indicator.
    pub rssi: u8,
    /// Bit error rate band.
    pub ber: u8,
}

impl SignalQuality {
    /// The wire value meaning "not known or not detectable".
    pub const UNKNOWN: u8 = 99;

    /// `true` when the RSSI reading is a real measurement.
    pub fn rssi_known(&self) -> bool {
        self.rssi != Self::UNKNOWN
    }

    /// RSSI converted to dBm, when known. `rssi` 0 is -113 dBm and every
    /// step adds 2 dB, saturating at -51 dBm for 31.
    pub fn rssi_dbm(&self) -> Option<i16> {
        if self.rssi_known() {
            Some(-113 + 2 * i16::from(self.rssi.min(31)))
        } else {
            None
        }
    }
}

/// Availability of an operator in a `AT+COPS=?` scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorStatus {
    Unknown,
    Available,
    Current,
    Forbidden,
}

impl OperatorStatus {
    /// Map the `<stat>` field of a `+COPS` operator quadruplet.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => OperatorStatus::Available,
            2 => OperatorStatus::Current,
            3 => OperatorStatus::Forbidden,
            _ => OperatorStatus::Unknown,
        }
    }
}

/// A network operator, from `AT+COPS?` or an `AT+COPS=?` scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorInfo {
    pub status: OperatorStatus,
    /// Long alphanumeric name (e.g. "MegaFon").
    pub long_name: String,
    /// Short alphanumeric name.
    pub short_name: String,
    /// Numeric MCC+MNC code (e.g. "25002").
    pub numeric: String,
}

/// SIM PIN state, discriminated by the token following `+CPIN:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinStatus {
    /// SIM is ready for use.
    Ready,
    /// A PIN must be entered.
    PinRequired,
    /// The PIN is blocked; the PUK must be entered.
    PukRequired,
    /// PIN2 must be entered.
    Pin2Required,
    /// PIN2 is blocked; PUK2 must be entered.
    Puk2Required,
    /// A vendor-specific token this library does not interpret.
    Other(String),
}

impl PinStatus {
    /// Map the textual `+CPIN:` token.
    pub fn from_token(token: &str) -> Self {
        match token {
            "READY" => PinStatus::Ready,
            "SIM PIN" => PinStatus::PinRequired,
            "SIM PUK" => PinStatus::PukRequired,
            "SIM PIN2" => PinStatus::Pin2Required,
            "SIM PUK2" => PinStatus::Puk2Required,
            other => PinStatus::Other(other.to_string()),
        }
    }
}

/// Modem functionality level, mapped to the `AT+CFUN` integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemMode {
    /// Minimum functionality, RF transmitter off (`CFUN: 0`).
    LowPower,
    /// Full functionality (`CFUN: 1`).
    Online,
    /// Airplane mode (`CFUN: 4`).
    Offline,
    /// Any other CFUN value, preserved opaquely.
    Other(u8),
}

impl ModemMode {
    /// Map a raw CFUN integer to a mode.
    pub fn from_cfun(code: u8) -> Self {
        match code {
            0 => ModemMode::LowPower,
            1 => ModemMode::Online,
            4 => ModemMode::Offline,
            other => ModemMode::Other(other),
        }
    }

    /// The CFUN integer for this mode.
    pub fn cfun(&self) -> u8 {
        match self {
            ModemMode::LowPower => 0,
            ModemMode::Online => 1,
            ModemMode::Offline => 4,
            ModemMode::Other(n) => *n,
        }
    }
}

/// Status of a stored SMS message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsStatus {
    RecUnread,
    RecRead,
    StoSent,
    StoUnsent,
}

impl SmsStatus {
    /// Parse the quoted status token of a `+CMGR:`/`+CMGL:` header.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "REC UNREAD" => Some(SmsStatus::RecUnread),
            "REC READ" => Some(SmsStatus::RecRead),
            "STO SENT" => Some(SmsStatus::StoSent),
            "STO UNSENT" => Some(SmsStatus::StoUnsent),
            _ => None,
        }
    }

    /// The wire token for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            SmsStatus::RecUnread => "REC UNREAD",
            SmsStatus::RecRead => "REC READ",
            SmsStatus::StoSent => "STO SENT",
            SmsStatus::StoUnsent => "STO UNSENT",
        }
    }
}

impl fmt::Display for SmsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status filter for `AT+CMGL` message listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmsFilter {
    #[default]
    All,
    RecUnread,
    RecRead,
    StoSent,
    StoUnsent,
}

impl SmsFilter {
    /// The quoted token `AT+CMGL` expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            SmsFilter::All => "ALL",
            SmsFilter::RecUnread => "REC UNREAD",
            SmsFilter::RecRead => "REC READ",
            SmsFilter::StoSent => "STO SENT",
            SmsFilter::StoUnsent => "STO UNSENT",
        }
    }
}

/// SMS storage area selectable with `AT+CPMS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsStorage {
    /// SIM card storage.
    Sim,
    /// Modem internal memory.
    Phone,
    /// Any available storage.
    Any,
    /// Broadcast messages.
    Broadcast,
    /// Delivery status reports.
    StatusReport,
}

impl SmsStorage {
    /// The two-letter storage token used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            SmsStorage::Sim => "SM",
            SmsStorage::Phone => "ME",
            SmsStorage::Any => "MT",
            SmsStorage::Broadcast => "BM",
            SmsStorage::StatusReport => "SR",
        }
    }
}

/// A text-mode SMS message as stored on the modem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsMessage {
    /// Index of the message in modem storage.
    pub index: u32,
    pub status: SmsStatus,
    /// Sender number in international format.
    pub sender: String,
    /// Recipient number, present for stored outgoing messages.
    pub receiver: Option<String>,
    /// Delivery timestamp. The modem reports local time; the time-zone
    /// portion is dropped and the instant is interpreted as UTC.
    pub time: DateTime<Utc>,
    /// Message body, always decoded to UTF-8 (never raw UCS-2 hex).
    pub text: String,
}

/// Usage of one `AT+CPMS` storage slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSlot {
    /// Storage token ("SM", "ME", …).
    pub storage: String,
    pub used: u32,
    pub total: u32,
}

/// The three storage slots reported by `AT+CPMS?`: read, write, receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageInfo {
    pub read: StorageSlot,
    pub write: StorageSlot,
    pub receive: StorageSlot,
}

/// Direction of a call in a `+CLCC` listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallDirection {
    Outgoing,
    Incoming,
    Unknown,
}

/// State of a call in a `+CLCC` listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Active,
    Held,
    Dialing,
    Alerting,
    Incoming,
    Waiting,
    Unknown,
}

/// Bearer mode of a call in a `+CLCC` listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    Voice,
    Data,
    Fax,
    Unknown,
}

/// One current call, from `AT+CLCC`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInfo {
    pub id: u32,
    pub direction: CallDirection,
    pub state: CallState,
    pub mode: CallMode,
    pub multiparty: bool,
    pub number: String,
}

/// Aggregated modem identity and status snapshot.
///
/// Every field is optional: the snapshot collects whatever the modem answers
/// and skips queries that fail.
#[derive(Debug, Clone, Default)]
pub struct ExtendedInfo {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub revision: Option<String>,
    pub imei: Option<String>,
    pub network_status: Option<NetworkStatus>,
    pub signal: Option<SignalQuality>,
    pub operator: Option<String>,
    pub sim_status: Option<PinStatus>,
}
