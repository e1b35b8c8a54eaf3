use crate::adapters::http::DEFAULT_SOURCE_URL;
use crate::core::extractor::DEFAULT_BLOCK_SELECTOR;
use crate::core::{ConfigProvider, FailurePolicy};
use crate::utils::error::{PollenError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub source: SourceConfig,
    pub refresh: RefreshConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
}

impl Default for ServerConfig {
    /// A file without `listen_addr` still honours `LISTEN_ADDR`.
    fn default() -> Self {
        Self {
            listen_addr: super::default_listen_addr(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub timeout_seconds: u64,
    pub block_selector: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            timeout_seconds: 30,
            block_selector: DEFAULT_BLOCK_SELECTOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub interval_seconds: u64,
    pub on_failure: FailurePolicy,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 600,
            on_failure: FailurePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub verbose: bool,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PollenError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PollenError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl ConfigProvider for TomlConfig {
    fn listen_addr(&self) -> &str {
        &self.server.listen_addr
    }

    fn source_url(&self) -> &str {
        &self.source.url
    }

    fn block_selector(&self) -> &str {
        &self.source.block_selector
    }

    fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_seconds)
    }

    fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds)
    }

    fn failure_policy(&self) -> FailurePolicy {
        self.refresh.on_failure
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        super::validate_provider(self)
    }
}
