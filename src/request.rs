//! Request value object describing a single Bot API call.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;

/// Parameters sent with a request, keyed by Telegram field name.
pub type Params = BTreeMap<String, Value>;

/// Default response timeout for a request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default connect timeout for a request.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Description of one call to the Bot API.
///
/// A request is built by the caller, handed to
/// [`TelegramClient::send_request`](crate::TelegramClient::send_request) by
/// reference and never modified by the client.
///
/// # Example
///
/// ```
/// use tgapi::Request;
///
/// let request = Request::new("123:abc", "sendMessage")
///     .with_method("POST")
///     .with_post_param("chat_id", 42)
///     .with_post_param("text", "hello");
///
/// assert_eq!(request.endpoint(), "sendMessage");
/// assert_eq!(request.method(), "POST");
/// ```
#[derive(Clone, PartialEq)]
pub struct Request {
    token: String,
    endpoint: String,
    method: String,
    headers: BTreeMap<String, String>,
    query_params: Params,
    post_params: Params,
    timeout: Duration,
    connect_timeout: Duration,
    is_async: bool,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("endpoint", &self.endpoint)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("query_params", &self.query_params)
            .field("post_params", &self.post_params)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("is_async", &self.is_async)
            .finish_non_exhaustive()
    }
}

impl Request {
    /// Create a GET request for `endpoint` with default timeouts.
    pub fn new(token: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            endpoint: endpoint.into(),
            method: "GET".to_string(),
            headers: BTreeMap::new(),
            query_params: Params::new(),
            post_params: Params::new(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            is_async: false,
        }
    }

    /// Set the HTTP method. Only the exact string `"POST"` sends a body.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add a query-string parameter.
    ///
    /// Structured values are passed as [`Value`]; serialize them first with
    /// `serde_json::to_value` and handle its error.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    /// Replace all query-string parameters.
    #[must_use]
    pub fn with_query_params(mut self, params: Params) -> Self {
        self.query_params = params;
        self
    }

    /// Add a body parameter.
    #[must_use]
    pub fn with_post_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.post_params.insert(name.into(), value.into());
        self
    }

    /// Replace all body parameters.
    #[must_use]
    pub fn with_post_params(mut self, params: Params) -> Self {
        self.post_params = params;
        self
    }

    /// Set the response timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Ask the transport for a pending handle instead of a completed response.
    #[must_use]
    pub fn with_async(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn query_params(&self) -> &Params {
        &self.query_params
    }

    pub fn post_params(&self) -> &Params {
        &self.post_params
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }
}
