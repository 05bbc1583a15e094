use crate::{consistency::ConsistencyLevel, error::ConfigError, retry::RetryPolicy};
use model::pagination::page_size::PageSize;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path, str::FromStr, time::Duration};
use tracing::debug;

pub const ENV_PREFIX: &str = "CQLPAGE_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub query: QueryConfig,
    pub request_timeout_ms: u64,
    pub schema_agreement_timeout_ms: u64,
    pub retry: RetryConfig,
}

/// Defaults applied to statements that do not set their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Signed like the page size callers pass to `execute_paged`:
    /// `i32::MAX` or a non-positive value disables paging.
    pub page_size: i32,
    pub consistency: ConsistencyLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            query: QueryConfig::default(),
            request_timeout_ms: 12_000,
            schema_agreement_timeout_ms: 10_000,
            retry: RetryConfig::default(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            page_size: 5000,
            consistency: ConsistencyLevel::One,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_attempts: 3,
            base_delay_ms: 50,
            max_delay_ms: 1000,
        }
    }
}

impl QueryConfig {
    pub fn page_size(&self) -> PageSize {
        PageSize::from_i32(self.page_size)
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }
}

impl DriverConfig {
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Defaults overridden by `CQLPAGE_*` variables of the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        let mut config = DriverConfig::default();
        config.apply_env(&vars)?;
        Ok(config)
    }

    /// Overrides fields from `CQLPAGE_*` entries of `vars`. Unknown keys are ignored.
    pub fn apply_env(&mut self, vars: &HashMap<String, String>) -> Result<(), ConfigError> {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };

            match name {
                "PAGE_SIZE" => self.query.page_size = parse_var(key, value)?,
                "CONSISTENCY" => self.query.consistency = parse_var(key, value)?,
                "REQUEST_TIMEOUT_MS" => self.request_timeout_ms = parse_var(key, value)?,
                "SCHEMA_AGREEMENT_TIMEOUT_MS" => {
                    self.schema_agreement_timeout_ms = parse_var(key, value)?
                }
                "RETRY_MAX_ATTEMPTS" => self.retry.max_attempts = parse_var(key, value)?,
                "RETRY_BASE_DELAY_MS" => self.retry.base_delay_ms = parse_var(key, value)?,
                "RETRY_MAX_DELAY_MS" => self.retry.max_delay_ms = parse_var(key, value)?,
                _ => continue,
            }
            debug!(key = %key, value = %value, "Applied config override");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn schema_agreement_timeout(&self) -> Duration {
        Duration::from_millis(self.schema_agreement_timeout_ms)
    }

    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.query.page_size = page_size;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidVar {
        key: key.to_string(),
        value: value.to_string(),
    })
}
