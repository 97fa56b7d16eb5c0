//! Error types for Telegram Bot API operations.

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while talking to the Telegram Bot API.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Configuration is missing or incomplete.
    #[error("Telegram configuration required: {0}")]
    ConfigMissing(String),

    /// Configuration value could not be parsed.
    #[error("Invalid Telegram configuration: {0}")]
    InvalidConfig(String),

    /// The API answered, but reported the call as failed.
    #[error("Telegram API error: {message}")]
    ApiError {
        message: String,
        code: Option<i64>,
        url: Option<String>,
    },

    /// The API reported flood control (error code 429).
    #[error("Rate limited: {message} (retry after {retry_after_secs:?} seconds)")]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },

    /// A file download finished with a status other than 200.
    #[error("Failed to download {url}: {status} {reason}")]
    Download {
        reason: String,
        status: u16,
        url: String,
    },

    /// The download destination directory could not be created.
    #[error("Directory '{}' could not be created: {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// The request method is not a valid HTTP token.
    #[error("Invalid HTTP method '{0}'")]
    InvalidMethod(String),

    /// Local I/O error while writing a sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A pending request's task did not complete.
    #[error("Pending request failed: {0}")]
    TaskFailed(String),
}

impl TelegramError {
    /// Build the domain error for a failed API payload.
    ///
    /// Telegram error bodies look like
    /// `{"ok": false, "error_code": 400, "description": "...", "parameters": {...}}`.
    /// The `description` becomes the message; when it is absent the HTTP
    /// status is used instead. Flood-control answers (code 429) carrying
    /// `parameters.retry_after` become [`TelegramError::RateLimited`].
    pub fn from_api_body(body: &Value, status: u16) -> Self {
        let code = body.get("error_code").and_then(Value::as_i64);
        let message = body
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {status}"));

        let retry_after = body
            .get("parameters")
            .and_then(|p| p.get("retry_after"))
            .and_then(Value::as_u64);

        if code == Some(429) && retry_after.is_some() {
            return Self::RateLimited {
                message,
                retry_after_secs: retry_after,
            };
        }

        Self::ApiError {
            message,
            code,
            url: None,
        }
    }

    /// Numeric code associated with the error, if any.
    ///
    /// API errors report Telegram's `error_code`, downloads the HTTP status.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::ApiError { code, .. } => *code,
            Self::RateLimited { .. } => Some(429),
            Self::Download { status, .. } => Some(i64::from(*status)),
            Self::HttpError(e) => e.status().map(|s| i64::from(s.as_u16())),
            _ => None,
        }
    }

    /// URL associated with the error, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::ApiError { url, .. } => url.as_deref(),
            Self::Download { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Result type alias for Telegram operations.
pub type Result<T> = core::result::Result<T, TelegramError>;
