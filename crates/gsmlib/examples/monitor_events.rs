//! Monitor unsolicited modem events in real time.
//!
//! Starts the URC listener and prints every event as it arrives: new SMS
//! notifications, incoming calls, registration changes, USSD replies.
//! New messages are read and printed immediately.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p gsmlib --example monitor_events -- /dev/ttyUSB0
//! ```

use gsmlib::{EventKind, ModemBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let port = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/ttyUSB0".to_string());

    println!("Connecting to {port}...");
    let modem = ModemBuilder::new()
        .serial_port(&port)
        .baud_rate(115_200)
        .build()
        .await?;

    modem.start_event_listener().await?;
    let events = modem.event_channel().await?;
    println!("Listening for modem events. Ctrl-C to exit.\n");

    while let Some(event) = events.recv().await {
        let stamp = event.timestamp.format("%H:%M:%S");
        match event.kind {
            EventKind::NewSms { storage, index } => {
                println!("{stamp} new SMS in {storage} at index {index}");
                match modem.read_sms(index).await {
                    Ok(sms) => println!("        {}: {}", sms.sender, sms.text),
                    Err(e) => println!("        failed to read: {e}"),
                }
            }
            EventKind::IncomingCall { number } => {
                println!(
                    "{stamp} incoming call from {}",
                    number.as_deref().unwrap_or("unknown")
                );
            }
            EventKind::CallEnded { reason } => {
                println!("{stamp} call ended: {reason}");
            }
            EventKind::NetworkChange {
                status,
                lac,
                cell_id,
            } => {
                print!("{stamp} network: {status}");
                if let (Some(lac), Some(cell)) = (lac, cell_id) {
                    print!(" (LAC {lac}, cell {cell})");
                }
                println!();
            }
            EventKind::Ussd { message } => {
                println!("{stamp} USSD: {message}");
            }
            EventKind::SmsDeliveryReport => {
                println!("{stamp} SMS delivery report");
            }
            EventKind::ModemError { error } => {
                println!("{stamp} modem error: {error}");
            }
        }
    }

    Ok(())
}
