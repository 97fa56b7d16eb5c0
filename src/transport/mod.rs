//! Pluggable HTTP transport.
//!
//! The client never talks HTTP itself. It hands a fully resolved URL,
//! method, headers and [`SendOptions`] to a [`Transport`] and wraps
//! whatever comes back.

mod http;
mod mock;

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::error::{Result, TelegramError};
use crate::request::Params;

pub use http::ReqwestTransport;
pub use mock::{MockTransport, RecordedCall, ScriptedResponse};

/// Sends requests on behalf of a [`TelegramClient`](crate::TelegramClient).
///
/// Timeouts are pushed into the transport before every call, so an
/// implementation only needs to honour the most recent values.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Set the total response timeout for subsequent sends.
    fn set_timeout(&mut self, timeout: Duration);

    /// Set the connect timeout for subsequent sends.
    fn set_connect_timeout(&mut self, timeout: Duration);

    /// Send a request.
    ///
    /// When `is_async` is set the transport may return
    /// [`TransportResponse::Pending`] instead of waiting for the answer.
    /// When `options.sink` is set the body is written to that path rather
    /// than buffered.
    async fn send(
        &mut self,
        url: &str,
        method: &str,
        headers: &BTreeMap<String, String>,
        options: SendOptions,
        is_async: bool,
    ) -> Result<TransportResponse>;
}

/// Method-specific parameters of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Parameters sent as the request body.
    Body(Params),
    /// Parameters sent in the query string.
    Query(Params),
}

/// Everything a transport needs besides URL, method and headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendOptions {
    pub payload: Option<Payload>,
    /// Stream the response body into this file.
    pub sink: Option<PathBuf>,
}

impl SendOptions {
    pub fn with_payload(payload: Payload) -> Self {
        Self {
            payload: Some(payload),
            sink: None,
        }
    }

    pub fn with_sink(sink: impl Into<PathBuf>) -> Self {
        Self {
            payload: None,
            sink: Some(sink.into()),
        }
    }
}

/// Body of a completed response.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBody {
    /// Buffered body.
    Bytes(Vec<u8>),
    /// Body written to a sink.
    Streamed { path: PathBuf, bytes: u64 },
}

/// A completed HTTP exchange as seen by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub reason: String,
    pub headers: BTreeMap<String, String>,
    pub body: RawBody,
}

impl RawResponse {
    /// Build a buffered response with the canonical reason for `status`.
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            reason: reason_phrase(status),
            headers: BTreeMap::new(),
            body: RawBody::Bytes(body),
        }
    }

    /// Build a buffered JSON response.
    pub fn json(status: u16, body: &Value) -> Self {
        let mut response = Self::new(status, body.to_string().into_bytes());
        response
            .headers
            .insert("content-type".to_string(), "application/json".to_string());
        response
    }
}

/// Handle to a request still running on the tokio runtime.
#[derive(Debug)]
pub struct PendingResponse {
    handle: JoinHandle<Result<RawResponse>>,
}

impl PendingResponse {
    /// Run `future` on the current tokio runtime.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Result<RawResponse>> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the request to complete.
    pub async fn wait(self) -> Result<RawResponse> {
        self.handle
            .await
            .map_err(|e| TelegramError::TaskFailed(e.to_string()))?
    }
}

/// What a transport hands back from [`Transport::send`].
#[derive(Debug)]
pub enum TransportResponse {
    Ready(RawResponse),
    Pending(PendingResponse),
}

impl TransportResponse {
    /// Wait for a pending response, or return a ready one as-is.
    pub async fn into_raw(self) -> Result<RawResponse> {
        match self {
            Self::Ready(raw) => Ok(raw),
            Self::Pending(pending) => pending.wait().await,
        }
    }
}

/// Flatten parameters into string pairs for form and query encoding.
///
/// Strings are sent verbatim, `null` is dropped and everything else is
/// JSON-encoded, which is how the Bot API expects fields like
/// `reply_markup` on non-JSON requests.
pub fn encode_params(params: &Params) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(key, value)| {
            let encoded = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), encoded))
        })
        .collect()
}

/// Canonical reason phrase for a status code, or an empty string.
pub fn reason_phrase(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or_default()
        .to_string()
}
