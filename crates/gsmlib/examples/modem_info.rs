//! Query a modem's identity and network state.
//!
//! Opens the modem, runs the init sequence, and prints manufacturer,
//! model, IMEI, SIM state, registration status, signal quality, and the
//! current operator.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p gsmlib --example modem_info -- /dev/ttyUSB0
//! ```

use gsmlib::ModemBuilder;

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

    let info = modem.extended_info().await;

    println!("Manufacturer: {}", info.manufacturer.as_deref().unwrap_or("?"));
    println!("Model:        {}", info.model.as_deref().unwrap_or("?"));
    println!("Revision:     {}", info.revision.as_deref().unwrap_or("?"));
    println!("IMEI:         {}", info.imei.as_deref().unwrap_or("?"));

    if let Some(sim) = &info.sim_status {
        println!("SIM:          {sim:?}");
    }
    if let Some(status) = info.network_status {
        println!("Network:      {status}");
    }
    if let Some(signal) = info.signal {
        match signal.rssi_dbm() {
            Some(dbm) => println!("Signal:       {dbm} dBm (BER {})", signal.ber),
            None => println!("Signal:       unknown"),
        }
    }
    if let Some(operator) = &info.operator {
        println!("Operator:     {operator}");
    }

    modem.close().await?;
    Ok(())
}
