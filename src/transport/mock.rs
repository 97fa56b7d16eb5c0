//! In-memory transport that records calls and replays scripted answers.
//!
//! Unlike wiremock, which mocks at the HTTP layer, this sits behind the
//! [`Transport`] trait so client behavior can be tested without sockets.
//! Clones share state: keep one clone in the test and hand the other to the
//! client.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{
    reason_phrase, PendingResponse, RawBody, RawResponse, SendOptions, Transport,
    TransportResponse,
};
use crate::error::{Result, TelegramError};

/// One call seen by a [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub url: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub options: SendOptions,
    pub is_async: bool,
    /// Timeout configured on the transport at send time.
    pub timeout: Option<Duration>,
    /// Connect timeout configured on the transport at send time.
    pub connect_timeout: Option<Duration>,
}

/// An answer queued on a [`MockTransport`].
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    /// Reply with a status, reason phrase and body.
    Reply {
        status: u16,
        reason: String,
        body: Vec<u8>,
    },
    /// Fail the send itself, as a network error would.
    Fail(String),
}

impl ScriptedResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self::Reply {
            status,
            reason: reason_phrase(status),
            body: body.to_string().into_bytes(),
        }
    }

    /// A successful Bot API answer wrapping `result`.
    pub fn ok(result: Value) -> Self {
        Self::json(200, json!({"ok": true, "result": result}))
    }

    /// A failed Bot API answer.
    pub fn api_error(status: u16, description: &str) -> Self {
        Self::json(
            status,
            json!({"ok": false, "error_code": status, "description": description}),
        )
    }

    pub fn bytes(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::Reply {
            status,
            reason: reason_phrase(status),
            body: body.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }
}

#[derive(Debug, Default)]
struct MockState {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    calls: Vec<RecordedCall>,
    script: VecDeque<ScriptedResponse>,
}

/// Test double for [`Transport`].
///
/// Answers are consumed in order. Once the script is exhausted every call
/// gets `{"ok": true, "result": true}`.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer.
    #[must_use]
    pub fn respond_with(self, response: ScriptedResponse) -> Self {
        self.state().script.push_back(response);
        self
    }

    /// All calls seen so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.state().calls.last().cloned()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.state().timeout
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.state().connect_timeout
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn set_timeout(&mut self, timeout: Duration) {
        self.state().timeout = Some(timeout);
    }

    fn set_connect_timeout(&mut self, timeout: Duration) {
        self.state().connect_timeout = Some(timeout);
    }

    async fn send(
        &mut self,
        url: &str,
        method: &str,
        headers: &BTreeMap<String, String>,
        options: SendOptions,
        is_async: bool,
    ) -> Result<TransportResponse> {
        let scripted = {
            let mut state = self.state();
            let call = RecordedCall {
                url: url.to_string(),
                method: method.to_string(),
                headers: headers.clone(),
                options: options.clone(),
                is_async,
                timeout: state.timeout,
                connect_timeout: state.connect_timeout,
            };
            state.calls.push(call);
            state
                .script
                .pop_front()
                .unwrap_or_else(|| ScriptedResponse::ok(Value::Bool(true)))
        };

        let (status, reason, body) = match scripted {
            ScriptedResponse::Reply {
                status,
                reason,
                body,
            } => (status, reason, body),
            ScriptedResponse::Fail(message) => {
                return Err(TelegramError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    message,
                )));
            }
        };

        let body = match options.sink {
            Some(path) => {
                tokio::fs::write(&path, &body).await?;
                RawBody::Streamed {
                    path,
                    bytes: body.len() as u64,
                }
            }
            None => RawBody::Bytes(body),
        };

        let raw = RawResponse {
            status,
            reason,
            headers: BTreeMap::new(),
            body,
        };

        if is_async {
            return Ok(TransportResponse::Pending(PendingResponse::spawn(
                async move { Ok(raw) },
            )));
        }
        Ok(TransportResponse::Ready(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_is_consumed_in_order() {
        let mut transport = MockTransport::new()
            .respond_with(ScriptedResponse::ok(json!(1)))
            .respond_with(ScriptedResponse::bytes(500, "boom"));
        let headers = BTreeMap::new();

        let first = transport
            .send("http://a", "GET", &headers, SendOptions::default(), false)
            .await
            .unwrap()
            .into_raw()
            .await
            .unwrap();
        let second = transport
            .send("http://b", "GET", &headers, SendOptions::default(), false)
            .await
            .unwrap()
            .into_raw()
            .await
            .unwrap();
        let third = transport
            .send("http://c", "GET", &headers, SendOptions::default(), false)
            .await
            .unwrap()
            .into_raw()
            .await
            .unwrap();

        assert_eq!(first.status, 200);
        assert_eq!(second.status, 500);
        assert_eq!(second.reason, "Internal Server Error");
        assert_eq!(third.body, RawBody::Bytes(br#"{"ok":true,"result":true}"#.to_vec()));
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_clones_share_recorded_calls() {
        let observer = MockTransport::new();
        let mut transport = observer.clone();
        transport.set_timeout(Duration::from_secs(3));

        transport
            .send("http://x", "POST", &BTreeMap::new(), SendOptions::default(), true)
            .await
            .unwrap();

        let call = observer.last_call().unwrap();
        assert_eq!(call.url, "http://x");
        assert!(call.is_async);
        assert_eq!(call.timeout, Some(Duration::from_secs(3)));
        assert_eq!(call.connect_timeout, None);
    }

    #[tokio::test]
    async fn test_fail_surfaces_as_error() {
        let mut transport = MockTransport::new().respond_with(ScriptedResponse::fail("down"));

        let err = transport
            .send("http://x", "GET", &BTreeMap::new(), SendOptions::default(), false)
            .await
            .unwrap_err();

        assert!(matches!(err, TelegramError::Io(_)));
        assert_eq!(transport.call_count(), 1);
    }
}
