use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::{CollectorError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "apigee-metrics-settings.yml";

/// Longest accepted aggregation span: one year, in minutes.
pub const MAX_TIME_RANGE_MINUTES: i64 = 365 * 24 * 60;

/// Settings file contents. Key names follow the historical settings file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "proxyURL", alias = "proxyurl", default)]
    pub proxy_url: String,
    /// Aggregation span in minutes.
    #[serde(rename = "timeRange", alias = "timerange")]
    pub time_range: i64,
    pub dimension: String,
    pub queries: Vec<String>,
    /// Request timeout in seconds. Absent means the transport default.
    #[serde(default)]
    pub timeout: Option<u64>,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY` when `proxyURL` is empty.
    #[serde(rename = "systemProxy", alias = "systemproxy", default = "default_system_proxy")]
    pub system_proxy: bool,
    pub apigee: ApigeeSection,
}

fn default_system_proxy() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApigeeSection {
    pub orgs: Vec<Organization>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    pub org: String,
    #[serde(rename = "baseurl", alias = "baseURL")]
    pub base_url: String,
    #[serde(rename = "userID", alias = "userid")]
    pub user_id: String,
    pub password: String,
    /// Static environment list; discovery is skipped when non-empty.
    #[serde(default)]
    pub envs: Vec<String>,
}

impl Organization {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            user: self.user_id.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// Explicit transport settings handed to the HTTP client at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub proxy_url: Option<String>,
    pub timeout: Option<Duration>,
    /// Only consulted when `proxy_url` is `None`.
    pub system_proxy: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            proxy_url: None,
            timeout: None,
            system_proxy: true,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            CollectorError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_yaml_str(&text)?;
        debug!("Configuration has been read in from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_TIME_RANGE_MINUTES).contains(&self.time_range) {
            return Err(CollectorError::Config(format!(
                "timeRange must be between 1 and {} minutes, got {}",
                MAX_TIME_RANGE_MINUTES, self.time_range
            )));
        }
        if self.dimension.trim().is_empty() {
            return Err(CollectorError::Config("dimension must not be empty".to_string()));
        }
        if self.queries.is_empty() {
            return Err(CollectorError::Config("queries must list at least one measure".to_string()));
        }
        for org in &self.apigee.orgs {
            if org.org.is_empty() || org.base_url.is_empty() {
                return Err(CollectorError::Config(format!(
                    "organization entry {:?} needs both org and baseurl",
                    org.org
                )));
            }
        }
        Ok(())
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            proxy_url: Some(self.proxy_url.trim())
                .filter(|url| !url.is_empty())
                .map(str::to_string),
            timeout: self.timeout.map(Duration::from_secs),
            system_proxy: self.system_proxy,
        }
    }

    /// The `select=` clause shared by every stats query of the run.
    pub fn select_clause(&self) -> String {
        format!("select={}", self.queries.join(","))
    }

    pub fn aggregation_span(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.time_range)
    }
}
