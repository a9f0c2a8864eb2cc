use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::service_client::DEFAULT_SERVICE_URL;
use crate::session::controller::UploadOrdering;

const DEFAULT_MAX_UPLOAD_MB: usize = 25;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub service_url: String,
    pub port: u16,
    pub rust_log: String,
    pub upload_ordering: UploadOrdering,
    pub request_timeout: Option<Duration>,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            service_url: env_or("SERVICE_URL", DEFAULT_SERVICE_URL),
            port: env_or("PORT", "3000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            upload_ordering: env_or("UPLOAD_ORDERING", "last-resolved")
                .parse()
                .map_err(|e: String| anyhow!("UPLOAD_ORDERING is invalid: {e}"))?,
            request_timeout: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .map(|v| v.parse::<u64>().map(Duration::from_secs))
                .transpose()
                .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?,
            max_upload_bytes: megabytes_to_bytes(
                env_or("MAX_UPLOAD_MB", &DEFAULT_MAX_UPLOAD_MB.to_string())
                    .parse::<usize>()
                    .context("MAX_UPLOAD_MB must be a whole number")?,
            )?,
        })
    }
}

fn megabytes_to_bytes(megabytes: usize) -> Result<usize> {
    megabytes
        .checked_mul(1024 * 1024)
        .with_context(|| format!("MAX_UPLOAD_MB={megabytes} is too large"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
