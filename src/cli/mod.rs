//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the tgapi binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::request::{Request, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};

/// Telegram Bot API command-line interface.
#[derive(Parser, Debug)]
#[command(name = "tgapi", about = "Telegram Bot API CLI", version)]
pub struct Cli {
    /// Bot token.
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Response timeout in seconds.
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Connect timeout in seconds.
    #[arg(long, global = true, default_value_t = DEFAULT_CONNECT_TIMEOUT.as_secs())]
    pub connect_timeout: u64,

    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Log requests to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Call a Bot API method.
    Call {
        /// Method name, e.g. getMe or sendMessage.
        endpoint: String,

        /// Send parameters as a POST body instead of the query string.
        #[arg(long)]
        post: bool,

        /// Request parameter as KEY=VALUE. Repeatable.
        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Extra header as NAME=VALUE. Repeatable.
        #[arg(long = "header", value_parser = parse_key_val)]
        headers: Vec<(String, String)>,
    },

    /// Download a file from Telegram's file server.
    Download {
        /// Remote path as returned by getFile.
        file_path: String,

        /// Where to write the file.
        local_filename: PathBuf,
    },
}

impl Cli {
    /// Build the request for `token` from the global flags.
    pub fn request(&self, token: &str, endpoint: &str) -> Request {
        Request::new(token, endpoint)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_connect_timeout(Duration::from_secs(self.connect_timeout))
    }
}

/// Build the request for a `call` subcommand.
pub fn call_request(
    base: Request,
    post: bool,
    params: &[(String, String)],
    headers: &[(String, String)],
) -> Request {
    let params = params
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    let mut request = if post {
        base.with_method("POST").with_post_params(params)
    } else {
        base.with_query_params(params)
    };
    for (name, value) in headers {
        request = request.with_header(name.clone(), value.clone());
    }
    request
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
