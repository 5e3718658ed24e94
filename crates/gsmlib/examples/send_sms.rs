//! Send an SMS from the command line.
//!
//! The character set is selected automatically: ASCII text is sent in
//! GSM-7, anything else (Cyrillic, emoji) in UCS-2. Texts longer than one
//! message are split into `[i/N]`-prefixed chunks.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p gsmlib --example send_sms -- /dev/ttyUSB0 +79991234567 "Привет!"
//! ```

use gsmlib::ModemBuilder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(port), Some(number), Some(text)) = (args.next(), args.next(), args.next()) else {
        eprintln!("usage: send_sms <port> <number> <text>");
        std::process::exit(2);
    };

    let modem = ModemBuilder::new()
        .serial_port(&port)
        .baud_rate(115_200)
        .build()
        .await?;

    println!("Sending to {number}...");
    modem.send_long_sms(&number, &text).await?;
    println!("Sent.");

    modem.close().await?;
    Ok(())
}
