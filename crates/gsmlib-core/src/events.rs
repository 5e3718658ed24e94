//! Unsolicited modem event types.
//!
//! Cellular modems push Unsolicited Result Codes (URCs) on the same serial
//! line used for commands: new-SMS notifications, incoming calls, network
//! registration changes, USSD replies. gsmlib turns those lines into
//! [`ModemEvent`]s delivered through a bounded channel; events are dropped
//! (and counted) rather than ever blocking the reader.

use chrono::{DateTime, Utc};

use crate::types::NetworkStatus;

/// An event parsed from an unsolicited modem line.
#[derive(Debug, Clone)]
pub struct ModemEvent {
    /// Host wall-clock time at which the line was received.
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
}

impl ModemEvent {
    /// Wrap an [`EventKind`], stamping it with the current wall-clock time.
    pub fn new(kind: EventKind) -> Self {
        ModemEvent {
            timestamp: Utc::now(),
            kind,
        }
    }

    /// The type discriminator of this event, for filtering.
    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }
}

/// The payload of a [`ModemEvent`], one variant per URC family.
#[derive(Debug, Clone)]
pub enum EventKind {
    /// A new SMS was stored (`+CMTI`).
    NewSms {
        /// Storage area the message landed in ("SM", "ME", …).
        storage: String,
        /// Index of the message within that storage.
        index: u32,
    },

    /// An incoming call (`RING`, `+CRING:`, or `+CLIP:` with caller ID).
    IncomingCall {
        /// Caller number, when `AT+CLIP=1` is active and the network
        /// provided it.
        number: Option<String>,
    },

    /// A call ended (`NO CARRIER`, `BUSY`, `NO ANSWER`).
    CallEnded {
        /// The raw line, preserved as the reason.
        reason: String,
    },

    /// Network registration changed (`+CREG` in unsolicited form).
    NetworkChange {
        status: NetworkStatus,
        /// Location area code, when `AT+CREG=2` is active.
        lac: Option<String>,
        /// Cell identifier, when `AT+CREG=2` is active.
        cell_id: Option<String>,
    },

    /// A USSD network reply (`+CUSD:`).
    Ussd { message: String },

    /// An SMS delivery report arrived (`+CDS:`). The report body is not
    /// parsed.
    SmsDeliveryReport,

    /// The modem reported an error outside a command exchange
    /// (`+CME ERROR:` / `+CMS ERROR:`).
    ModemError {
        /// The raw error line.
        error: String,
    },
}

impl EventKind {
    /// The type discriminator of this payload.
    pub fn event_type(&self) -> EventType {
        match self {
            EventKind::NewSms { .. } => EventType::NewSms,
            EventKind::IncomingCall { .. } => EventType::IncomingCall,
            EventKind::CallEnded { .. } => EventType::CallEnded,
            EventKind::NetworkChange { .. } => EventType::NetworkChange,
            EventKind::Ussd { .. } => EventType::Ussd,
            EventKind::SmsDeliveryReport => EventType::SmsDeliveryReport,
            EventKind::ModemError { .. } => EventType::ModemError,
        }
    }
}

/// Discriminator for [`EventKind`], used with `wait_for_event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    NewSms,
    IncomingCall,
    CallEnded,
    NetworkChange,
    Ussd,
    SmsDeliveryReport,
    ModemError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_mapping() {
        let kinds = [
            (
                EventKind::NewSms {
                    storage: "SM".into(),
                    index: 3,
                },
                EventType::NewSms,
            ),
            (
                EventKind::IncomingCall { number: None },
                EventType::IncomingCall,
            ),
            (
                EventKind::CallEnded {
                    reason: "NO CARRIER".into(),
                },
                EventType::CallEnded,
            ),
            (
                EventKind::NetworkChange {
                    status: NetworkStatus::RegisteredHome,
                    lac: None,
                    cell_id: None,
                },
                EventType::NetworkChange,
            ),
            (
                EventKind::Ussd {
                    message: "Balance: 0".into(),
                },
                EventType::Ussd,
            ),
            (EventKind::SmsDeliveryReport, EventType::SmsDeliveryReport),
            (
                EventKind::ModemError {
                    error: "+CME ERROR: 10".into(),
                },
                EventType::ModemError,
            ),
        ];
        for (kind, expected) in kinds {
            assert_eq!(kind.event_type(), expected);
        }
    }

    #[test]
    fn event_stamps_reception_time() {
        let before = Utc::now();
        let event = ModemEvent::new(EventKind::SmsDeliveryReport);
        let after = Utc::now();
        assert!(event.timestamp >= before && event.timestamp <= after);
    }
}
