//! Telegram Bot API client library.
//!
//! A thin client that builds Bot API URLs, hands them to a pluggable
//! [`Transport`] and wraps the answers. It does not model individual API
//! methods: callers name the endpoint and pass the parameters themselves.
//!
//! # Quick Start
//!
//! ```no_run
//! use tgapi::{TelegramClient, TelegramConfig};
//!
//! #[tokio::main]
//! async fn main() -> tgapi::Result<()> {
//!     // Token and timeouts from environment variables
//!     let config = TelegramConfig::from_env()?;
//!
//!     // Client with the default reqwest transport
//!     let mut client = TelegramClient::new(None)?;
//!
//!     // Call a method
//!     let me = client.send_request(&config.request("getMe")).await?;
//!     println!("Bot: {:?}", me.result());
//!
//!     // Send a message with a POST body
//!     let request = config
//!         .request("sendMessage")
//!         .with_method("POST")
//!         .with_post_param("chat_id", 12345)
//!         .with_post_param("text", "hello");
//!     client.send_request(&request).await?;
//!
//!     // Download a file returned by getFile
//!     client
//!         .download("photos/file_0.jpg", "downloads/file_0.jpg", &config.request("getFile"))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`Request`] - Immutable description of one call
//! - [`Transport`] - Sends requests; [`ReqwestTransport`] in production,
//!   [`MockTransport`] in tests
//! - [`TelegramClient`] - Builds URLs, selects query or body parameters,
//!   configures timeouts and interprets the result
//! - [`Response`] - The transport result plus the originating request
//!
//! # Configuration
//!
//! [`TelegramConfig::from_env`] reads:
//!
//! - `TELEGRAM_BOT_TOKEN` (required) - The bot token
//! - `TELEGRAM_TIMEOUT_SECS` (optional) - Response timeout, defaults to 60
//! - `TELEGRAM_CONNECT_TIMEOUT_SECS` (optional) - Connect timeout, defaults to 10

pub mod cli;
mod client;
mod config;
mod error;
pub mod output;
mod request;
mod response;
pub mod transport;

// Re-export core types
pub use client::{PreparedRequest, TelegramClient, BASE_API_URL};
pub use config::TelegramConfig;
pub use error::{Result, TelegramError};
pub use request::{Params, Request, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};
pub use response::Response;

// Re-export transport types
pub use transport::{
    MockTransport, Payload, PendingResponse, RawBody, RawResponse, RecordedCall,
    ReqwestTransport, ScriptedResponse, SendOptions, Transport, TransportResponse,
};
