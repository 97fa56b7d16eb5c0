//! Environment-based configuration.

use std::env;
use std::time::Duration;

use crate::error::{Result, TelegramError};
use crate::request::{Request, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};

/// Token and timeouts shared by the requests of one bot.
///
/// # Example
///
/// ```no_run
/// use tgapi::TelegramConfig;
///
/// # fn example() -> tgapi::Result<()> {
/// let config = TelegramConfig::from_env()?;
/// let request = config.request("getMe");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub token: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

impl TelegramConfig {
    /// Config with the default timeouts.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Read configuration from environment variables.
    ///
    /// - `TELEGRAM_BOT_TOKEN` (required)
    /// - `TELEGRAM_TIMEOUT_SECS` (optional, defaults to 60)
    /// - `TELEGRAM_CONNECT_TIMEOUT_SECS` (optional, defaults to 10)
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not set or a timeout is not an integer.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("TELEGRAM_BOT_TOKEN").ok_or_else(|| {
            TelegramError::ConfigMissing("TELEGRAM_BOT_TOKEN environment variable not set".to_string())
        })?;

        let mut config = Self::new(token);
        if let Some(secs) = parse_secs(&lookup, "TELEGRAM_TIMEOUT_SECS")? {
            config.timeout = secs;
        }
        if let Some(secs) = parse_secs(&lookup, "TELEGRAM_CONNECT_TIMEOUT_SECS")? {
            config.connect_timeout = secs;
        }
        Ok(config)
    }

    /// Start a request for `endpoint` carrying this token and these timeouts.
    pub fn request(&self, endpoint: impl Into<String>) -> Request {
        Request::new(self.token.clone(), endpoint)
            .with_timeout(self.timeout)
            .with_connect_timeout(self.connect_timeout)
    }
}

fn parse_secs<F>(lookup: &F, key: &str) -> Result<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| TelegramError::InvalidConfig(format!("{key} must be whole seconds, got '{raw}'"))),
    }
}
