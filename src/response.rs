//! Wrapper around a transport result and the request that produced it.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, TelegramError};
use crate::request::Request;
use crate::transport::{RawBody, RawResponse, TransportResponse};

/// The outcome of one Bot API call.
///
/// A buffered body is decoded as JSON once, when the response is built.
/// Bodies that are not JSON (or were streamed to a file) leave
/// [`decoded_body`](Self::decoded_body) empty.
#[derive(Debug)]
pub struct Response {
    request: Request,
    raw: TransportResponse,
    decoded: Option<Value>,
}

impl Response {
    pub fn new(request: Request, raw: TransportResponse) -> Self {
        let decoded = match &raw {
            TransportResponse::Ready(RawResponse {
                body: RawBody::Bytes(bytes),
                ..
            }) => serde_json::from_slice(bytes).ok(),
            _ => None,
        };
        Self {
            request,
            raw,
            decoded,
        }
    }

    /// The request this response answers.
    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn raw(&self) -> &TransportResponse {
        &self.raw
    }

    /// True while the transport result has not been awaited yet.
    pub fn is_pending(&self) -> bool {
        matches!(self.raw, TransportResponse::Pending(_))
    }

    /// HTTP status, or `None` while pending.
    pub fn status(&self) -> Option<u16> {
        self.ready().map(|r| r.status)
    }

    /// HTTP reason phrase, or `None` while pending.
    pub fn reason(&self) -> Option<&str> {
        self.ready().map(|r| r.reason.as_str())
    }

    /// Raw buffered body, if any.
    pub fn body(&self) -> Option<&[u8]> {
        match self.ready() {
            Some(RawResponse {
                body: RawBody::Bytes(bytes),
                ..
            }) => Some(bytes.as_slice()),
            _ => None,
        }
    }

    pub fn decoded_body(&self) -> Option<&Value> {
        self.decoded.as_ref()
    }

    /// The `result` field of a successful answer.
    pub fn result(&self) -> Option<&Value> {
        self.decoded.as_ref().and_then(|body| body.get("result"))
    }

    /// Deserialize the `result` field.
    ///
    /// # Errors
    ///
    /// Returns a parse error if `result` is missing or has a different shape.
    pub fn result_as<T: DeserializeOwned>(&self) -> Result<T> {
        let result = self.result().cloned().unwrap_or(Value::Null);
        Ok(serde_json::from_value(result)?)
    }

    /// Whether the API reported the call as failed (`"ok": false`).
    pub fn is_error(&self) -> bool {
        self.decoded
            .as_ref()
            .and_then(|body| body.get("ok"))
            .and_then(Value::as_bool)
            == Some(false)
    }

    /// The domain error for a failed call, or `None` on success.
    pub fn error(&self) -> Option<TelegramError> {
        if !self.is_error() {
            return None;
        }
        let body = self.decoded.as_ref()?;
        Some(TelegramError::from_api_body(
            body,
            self.status().unwrap_or_default(),
        ))
    }

    /// Await a pending transport result.
    ///
    /// Ready responses are returned unchanged. A resolved response that
    /// reports an API error is returned as `Err`.
    pub async fn resolve(self) -> Result<Self> {
        let Self { request, raw, .. } = self;
        let raw = raw.into_raw().await?;
        let response = Self::new(request, TransportResponse::Ready(raw));
        match response.error() {
            Some(err) => Err(err),
            None => Ok(response),
        }
    }

    fn ready(&self) -> Option<&RawResponse> {
        match &self.raw {
            TransportResponse::Ready(raw) => Some(raw),
            TransportResponse::Pending(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn ready(status: u16, body: Value) -> Response {
        Response::new(
            Request::new("token", "getMe"),
            TransportResponse::Ready(RawResponse::json(status, &body)),
        )
    }

    #[test]
    fn test_successful_answer() {
        let response = ready(200, json!({"ok": true, "result": {"id": 7, "is_bot": true}}));

        assert!(!response.is_error());
        assert!(response.error().is_none());
        assert_eq!(response.status(), Some(200));
        assert_eq!(response.result(), Some(&json!({"id": 7, "is_bot": true})));
    }

    #[test]
    fn test_failed_answer_builds_error() {
        let response = ready(
            401,
            json!({"ok": false, "error_code": 401, "description": "Unauthorized"}),
        );

        assert!(response.is_error());
        let err = response.error().unwrap();
        assert_eq!(err.code(), Some(401));
        assert_eq!(err.to_string(), "Telegram API error: Unauthorized");
    }

    #[test]
    fn test_non_json_body_is_not_an_api_error() {
        let response = Response::new(
            Request::new("token", "getMe"),
            TransportResponse::Ready(RawResponse::new(502, b"<html>Bad Gateway</html>".to_vec())),
        );

        assert!(response.decoded_body().is_none());
        assert!(!response.is_error());
        assert_eq!(response.body(), Some(&b"<html>Bad Gateway</html>"[..]));
        assert_eq!(response.reason(), Some("Bad Gateway"));
    }

    #[test]
    fn test_result_as_deserializes() {
        #[derive(Deserialize)]
        struct User {
            id: i64,
            username: String,
        }

        let response = ready(200, json!({"ok": true, "result": {"id": 1, "username": "bot"}}));
        let user: User = response.result_as().unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.username, "bot");
    }

    #[tokio::test]
    async fn test_resolve_pending() {
        let pending = crate::transport::PendingResponse::spawn(async {
            Ok(RawResponse::json(200, &json!({"ok": true, "result": "done"})))
        });
        let response = Response::new(
            Request::new("token", "getMe"),
            TransportResponse::Pending(pending),
        );

        assert!(response.is_pending());
        assert!(matches!(response.raw(), TransportResponse::Pending(_)));
        assert!(response.status().is_none());

        let resolved = response.resolve().await.unwrap();
        assert!(!resolved.is_pending());
        assert_eq!(resolved.result(), Some(&json!("done")));
    }

    #[tokio::test]
    async fn test_resolve_pending_api_error() {
        let pending = crate::transport::PendingResponse::spawn(async {
            Ok(RawResponse::json(
                400,
                &json!({"ok": false, "error_code": 400, "description": "Bad Request"}),
            ))
        });
        let response = Response::new(
            Request::new("token", "getMe"),
            TransportResponse::Pending(pending),
        );

        let err = response.resolve().await.unwrap_err();
        assert_eq!(err.code(), Some(400));
    }
}
