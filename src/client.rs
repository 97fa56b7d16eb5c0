//! Telegram Bot API client.
//!
//! Builds request URLs, hands them to the active [`Transport`] and turns
//! the answer into a [`Response`] or a [`TelegramError`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, TelegramError};
use crate::request::Request;
use crate::response::Response;
use crate::transport::{Payload, ReqwestTransport, SendOptions, Transport};

/// Base URL of the Bot API. Requests cannot override it.
pub const BASE_API_URL: &str = "https://api.telegram.org/bot";

/// Everything the transport needs to address a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub url: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub is_async: bool,
}

/// Low-level Telegram Bot API client.
///
/// Owns exactly one [`Transport`]. Calls take `&mut self`, so the transport
/// cannot be swapped while a call is in flight.
///
/// # Example
///
/// ```no_run
/// use tgapi::{Request, TelegramClient};
///
/// # async fn example() -> tgapi::Result<()> {
/// let mut client = TelegramClient::new(None)?;
///
/// let response = client.send_request(&Request::new("123:abc", "getMe")).await?;
/// println!("{:?}", response.result());
/// # Ok(())
/// # }
/// ```
pub struct TelegramClient {
    transport: Box<dyn Transport>,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &BASE_API_URL)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// Create a client, using a [`ReqwestTransport`] when `transport` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the default transport cannot be built.
    pub fn new(transport: Option<Box<dyn Transport>>) -> Result<Self> {
        let transport = match transport {
            Some(transport) => transport,
            None => Box::new(ReqwestTransport::new()?),
        };
        Ok(Self { transport })
    }

    /// Create a client around a concrete transport.
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
        }
    }

    /// Replace the active transport.
    pub fn set_transport(&mut self, transport: Box<dyn Transport>) {
        self.transport = transport;
    }

    /// Resolve URL, method, headers and async flag for a request.
    ///
    /// The URL is `BASE_API_URL + "/bot" + token + "/" + endpoint`. Neither
    /// token nor endpoint is validated; a bad endpoint surfaces as an API
    /// error.
    pub fn prepare_request(request: &Request) -> PreparedRequest {
        PreparedRequest {
            url: format!(
                "{BASE_API_URL}/bot{}/{}",
                request.token(),
                request.endpoint()
            ),
            method: request.method().to_string(),
            headers: request.headers().clone(),
            is_async: request.is_async(),
        }
    }

    /// Pick the parameters to send for `method`.
    ///
    /// Only the exact string `"POST"` sends the body parameters. Every other
    /// value, including `"post"` and unknown verbs, sends the query
    /// parameters.
    pub fn request_options(request: &Request, method: &str) -> Payload {
        if method == "POST" {
            Payload::Body(request.post_params().clone())
        } else {
            Payload::Query(request.query_params().clone())
        }
    }

    /// URL of a file on Telegram's file server.
    pub fn file_url(token: &str, file_path: &str) -> String {
        format!("{BASE_API_URL}/file/bot{token}/{file_path}")
    }

    /// Send a request through the active transport.
    ///
    /// Async requests come back pending; call [`Response::resolve`] to wait
    /// for them.
    ///
    /// # Errors
    ///
    /// Returns the transport's error if the send fails, or the error built
    /// by [`Response::error`] if the API reports the call as failed.
    #[tracing::instrument(skip_all, fields(endpoint = %request.endpoint(), method = %request.method()))]
    pub async fn send_request(&mut self, request: &Request) -> Result<Response> {
        let prepared = Self::prepare_request(request);
        let options = SendOptions::with_payload(Self::request_options(request, &prepared.method));

        self.configure_timeouts(request);

        let raw = self
            .transport
            .send(
                &prepared.url,
                &prepared.method,
                &prepared.headers,
                options,
                prepared.is_async,
            )
            .await?;

        let response = Response::new(request.clone(), raw);
        if let Some(err) = response.error() {
            tracing::debug!(error = %err, "API reported failure");
            return Err(err);
        }

        Ok(response)
    }

    /// Download `file_path` from the file server into `local_filename`.
    ///
    /// Missing parent directories are created first. The transport streams
    /// the body straight to disk. On a non-200 answer the partially written
    /// file is left in place.
    ///
    /// Only the token, headers and timeouts of `request` are used. The file
    /// is always fetched with `GET`, and an async request is still awaited
    /// before this returns.
    ///
    /// # Errors
    ///
    /// - [`TelegramError::Directory`] if the destination directory cannot be
    ///   created; the transport is not called.
    /// - [`TelegramError::Download`] if the server answers with a status
    ///   other than 200.
    #[tracing::instrument(skip_all, fields(file_path = %file_path))]
    pub async fn download(
        &mut self,
        file_path: &str,
        local_filename: impl AsRef<Path>,
        request: &Request,
    ) -> Result<PathBuf> {
        let local_filename = local_filename.as_ref().to_path_buf();
        if let Some(dir) = local_filename.parent() {
            ensure_directory(dir).await?;
        }

        let url = Self::file_url(request.token(), file_path);
        self.configure_timeouts(request);

        let raw = self
            .transport
            .send(
                &url,
                "GET",
                request.headers(),
                SendOptions::with_sink(&local_filename),
                false,
            )
            .await?
            .into_raw()
            .await?;

        if raw.status != 200 {
            tracing::warn!(status = raw.status, "File download failed");
            return Err(TelegramError::Download {
                reason: raw.reason,
                status: raw.status,
                url,
            });
        }

        tracing::debug!(path = %local_filename.display(), "File downloaded");
        Ok(local_filename)
    }

    fn configure_timeouts(&mut self, request: &Request) {
        self.transport.set_timeout(request.timeout());
        self.transport.set_connect_timeout(request.connect_timeout());
    }
}

/// Create `dir` and its parents.
///
/// Losing a race against another creator is fine: the call only fails if
/// the directory still does not exist afterwards.
async fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }

    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o755);

    if let Err(source) = builder.create(dir).await {
        let exists = tokio::fs::metadata(dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !exists {
            return Err(TelegramError::Directory {
                path: dir.to_path_buf(),
                source,
            });
        }
    }
    Ok(())
}
