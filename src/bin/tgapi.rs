//! Telegram Bot API CLI binary.
//!
//! A command-line interface for calling Bot API methods and downloading files.

use clap::Parser;
use std::process::ExitCode;
use tgapi::cli::{call_request, Cli, Command};
use tgapi::output::PrettyPrint;
use tgapi::{TelegramClient, TelegramError};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    let mut client = match TelegramClient::new(None) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&mut client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if matches!(e, TelegramError::ConfigMissing(_)) {
                eprintln!("Hint: Set TELEGRAM_BOT_TOKEN environment variable or pass --token");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &mut TelegramClient, cli: Cli) -> tgapi::Result<()> {
    let token = cli.token.clone().ok_or_else(|| {
        TelegramError::ConfigMissing("bot token not provided".to_string())
    })?;

    match &cli.command {
        Command::Call {
            endpoint,
            post,
            params,
            headers,
        } => {
            let request = call_request(cli.request(&token, endpoint), *post, params, headers);
            let response = client.send_request(&request).await?;
            if cli.json {
                let body = response
                    .decoded_body()
                    .cloned()
                    .unwrap_or(serde_json::Value::Null);
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{}", response.pretty_print());
            }
        }
        Command::Download {
            file_path,
            local_filename,
        } => {
            let request = cli.request(&token, "");
            let path = client.download(file_path, local_filename, &request).await?;
            if cli.json {
                println!("{}", serde_json::json!({ "path": path }));
            } else {
                println!("Saved to {}", path.display());
            }
        }
    }
    Ok(())
}
