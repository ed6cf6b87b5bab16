//! Platform API client
//!
//! One shared HTTP client plus the base URL and token, opened explicitly at
//! process entry and closed on every exit path. The bracketing is logging
//! only - the platform holds no server-side session - but it keeps the
//! lifecycle visible instead of ambient.

use tracing::{debug, info};

use crate::config::PlatformConfig;
use crate::{Error, Result};

/// Authenticated platform API client
pub struct PlatformClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl PlatformClient {
    /// Open a platform session. Fails when the token is missing - callers
    /// that can work without the platform (local dataset) never call this.
    pub fn init(config: &PlatformConfig) -> Result<Self> {
        let token = config.require_token()?.to_string();
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Config(format!("failed to build platform client: {e}")))?;

        info!(base_url = %config.base_url, "Platform session opened");

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Close the platform session, recording the run outcome
    pub fn exit(&self, outcome: &str) {
        info!(outcome = %outcome, "Platform session closed");
    }

    /// The underlying HTTP client
    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Absolute URL for an API path
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// The API token
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Drop for PlatformClient {
    fn drop(&mut self) {
        debug!("Platform session released");
    }
}
