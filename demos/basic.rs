//! Basic example demonstrating the Telegram Bot API client.
//!
//! Run with:
//! ```
//! TELEGRAM_BOT_TOKEN=your-token cargo run --example basic
//! ```

use tgapi::{TelegramClient, TelegramConfig};

#[tokio::main]
async fn main() -> tgapi::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    // Token and timeouts from environment variables
    let config = TelegramConfig::from_env()?;
    let mut client = TelegramClient::new(None)?;
    println!("Client: {client:?}");

    // Who am I?
    println!("\n--- getMe ---");
    let me = client.send_request(&config.request("getMe")).await?;
    println!("Result: {:?}", me.result());

    // Pending updates, fired asynchronously and awaited later
    println!("\n--- getUpdates (async) ---");
    let pending = client
        .send_request(&config.request("getUpdates").with_query_param("limit", 5).with_async(true))
        .await?;
    let updates = pending.resolve().await?;
    println!("Updates: {:?}", updates.result());

    // Resolve a file id and download it
    if let Ok(file_id) = std::env::var("TELEGRAM_FILE_ID") {
        println!("\n--- getFile + download ---");
        let file = client
            .send_request(&config.request("getFile").with_query_param("file_id", file_id))
            .await?;
        if let Some(file_path) = file
            .result()
            .and_then(|r| r.get("file_path"))
            .and_then(|p| p.as_str())
        {
            let saved = client
                .download(file_path, format!("downloads/{file_path}"), &config.request("getFile"))
                .await?;
            println!("Saved to {}", saved.display());
        }
    }

    Ok(())
}
