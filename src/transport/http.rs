//! Production transport backed by `reqwest`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use tokio::io::AsyncWriteExt;
use url::Url;

use super::{
    encode_params, Payload, PendingResponse, RawBody, RawResponse, SendOptions, Transport,
    TransportResponse,
};
use crate::error::{Result, TelegramError};
use crate::request::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};

const USER_AGENT: &str = concat!("tgapi/", env!("CARGO_PKG_VERSION"));

/// HTTP transport using a [`reqwest::Client`].
///
/// The response timeout is applied per request. The connect timeout is a
/// client-level setting in reqwest, so the inner client is rebuilt on the
/// next send whenever it changes.
///
/// Non-2xx answers are not errors here: the Bot API reports failures with
/// a JSON body, which [`Response`](crate::Response) interprets.
pub struct ReqwestTransport {
    http: Client,
    timeout: Duration,
    connect_timeout: Duration,
    built_with: Duration,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    /// Create a transport with the default timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: build_client(DEFAULT_CONNECT_TIMEOUT)?,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            built_with: DEFAULT_CONNECT_TIMEOUT,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    fn refresh_client(&mut self) -> Result<()> {
        if self.built_with != self.connect_timeout {
            tracing::debug!(connect_timeout = ?self.connect_timeout, "Rebuilding HTTP client");
            self.http = build_client(self.connect_timeout)?;
            self.built_with = self.connect_timeout;
        }
        Ok(())
    }
}

fn build_client(connect_timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .brotli(true)
        .gzip(true)
        .deflate(true)
        .connect_timeout(connect_timeout)
        .build()
        .map_err(TelegramError::HttpError)
}

#[async_trait]
impl Transport for ReqwestTransport {
    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    fn set_connect_timeout(&mut self, timeout: Duration) {
        self.connect_timeout = timeout;
    }

    #[tracing::instrument(skip_all, fields(method = %method, is_async = is_async))]
    async fn send(
        &mut self,
        url: &str,
        method: &str,
        headers: &BTreeMap<String, String>,
        options: SendOptions,
        is_async: bool,
    ) -> Result<TransportResponse> {
        self.refresh_client()?;

        let url = Url::parse(url)?;
        let http_method = Method::from_bytes(method.as_bytes())
            .map_err(|_| TelegramError::InvalidMethod(method.to_string()))?;

        let mut builder = self.http.request(http_method, url).timeout(self.timeout);
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &options.payload {
            Some(Payload::Body(params)) => builder.form(&encode_params(params)),
            Some(Payload::Query(params)) => builder.query(&encode_params(params)),
            None => builder,
        };

        let exchange = execute(builder, options.sink);
        if is_async {
            return Ok(TransportResponse::Pending(PendingResponse::spawn(exchange)));
        }
        Ok(TransportResponse::Ready(exchange.await?))
    }
}

async fn execute(builder: RequestBuilder, sink: Option<PathBuf>) -> Result<RawResponse> {
    let mut response = builder.send().await.map_err(TelegramError::HttpError)?;

    let status = response.status();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let body = match sink {
        Some(path) => {
            let mut file = tokio::fs::File::create(&path).await?;
            let mut bytes = 0u64;
            while let Some(chunk) = response.chunk().await? {
                file.write_all(&chunk).await?;
                bytes += chunk.len() as u64;
            }
            file.flush().await?;
            tracing::debug!(bytes, path = %path.display(), "Streamed response body");
            RawBody::Streamed { path, bytes }
        }
        None => RawBody::Bytes(response.bytes().await?.to_vec()),
    };

    tracing::debug!(status = status.as_u16(), "Received response");

    Ok(RawResponse {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or_default().to_string(),
        headers,
        body,
    })
}
