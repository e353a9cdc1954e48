use std::{env, time::Duration};

use crate::error::{ClientErr, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const BASE_URL_VAR: &str = "DASHBOARD_API_URL";
const TIMEOUT_VAR: &str = "DASHBOARD_TIMEOUT_SECS";

/// Where the backend lives and how long a request may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    base_url: String,
    request_timeout: Option<Duration>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, None)
    }
}

impl DashboardConfig {
    /// Creates a new dashboard configuration.
    ///
    /// # Args
    /// * `base_url` - Root url of the backend, e.g. `http://localhost:8000`.
    /// * `request_timeout` - Per request limit, `None` waits forever.
    ///
    /// # Returns
    /// A `DashboardConfig` instance.
    pub fn new(base_url: impl Into<String>, request_timeout: Option<Duration>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout,
        }
    }

    /// Reads the configuration from `DASHBOARD_API_URL` and
    /// `DASHBOARD_TIMEOUT_SECS`, falling back to the defaults when unset.
    ///
    /// # Errors
    /// Returns `ClientErr::Config` if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = match lookup(BASE_URL_VAR) {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => url,
            Some(url) => {
                return Err(ClientErr::Config(format!(
                    "{BASE_URL_VAR} must be an http(s) url, got '{url}'"
                )));
            }
            None => DEFAULT_BASE_URL.to_string(),
        };

        let request_timeout = match lookup(TIMEOUT_VAR) {
            Some(secs) => {
                let secs = secs.trim().parse::<u64>().map_err(|e| {
                    ClientErr::Config(format!("{TIMEOUT_VAR} must be whole seconds: {e}"))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self::new(base_url, request_timeout))
    }

    /// Returns the backend's root url.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the per request time limit, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }
}
