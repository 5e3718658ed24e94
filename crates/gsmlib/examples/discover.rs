//! Scan the system for AT-speaking modems.
//!
//! Probes the platform's usual serial device names and prints every device
//! that answers `AT` with `OK`.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p gsmlib --example discover
//! ```

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Scanning for modems...");
    let modems = gsmlib::available_modems().await;

    if modems.is_empty() {
        println!("No modems found.");
        return Ok(());
    }

    for modem in modems {
        println!(
            "{}: {} (IMEI {})",
            modem.port,
            if modem.description.is_empty() {
                "unidentified AT device"
            } else {
                modem.description.as_str()
            },
            if modem.imei.is_empty() {
                "?"
            } else {
                modem.imei.as_str()
            }
        );
    }

    Ok(())
}
