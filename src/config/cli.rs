use crate::adapters::http::DEFAULT_SOURCE_URL;
use crate::core::extractor::DEFAULT_BLOCK_SELECTOR;
use crate::core::{ConfigProvider, FailurePolicy};
use crate::utils::error::Result;
use crate::utils::logger::LogFormat;
use crate::utils::validation::Validate;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "pollen-api")]
#[command(about = "Serves a cached copy of the pollen forecast as JSON")]
pub struct CliConfig {
    /// Address to listen on; `:8080` listens on every interface
    #[arg(long, env = "LISTEN_ADDR", default_value = super::DEFAULT_LISTEN_ADDR)]
    pub listen_addr: String,

    #[arg(long, env = "POLLEN_SOURCE_URL", default_value = DEFAULT_SOURCE_URL)]
    pub source_url: String,

    /// CSS selector matching one table per region
    #[arg(long, default_value = DEFAULT_BLOCK_SELECTOR)]
    pub block_selector: String,

    #[arg(long, default_value_t = 600)]
    pub refresh_interval_secs: u64,

    #[arg(long, default_value_t = 30)]
    pub fetch_timeout_secs: u64,

    /// What a failed periodic refresh does
    #[arg(long, value_enum, default_value_t = FailurePolicy::LogAndContinue)]
    pub on_refresh_failure: FailurePolicy,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Read settings from a TOML file instead of the flags above; `LISTEN_ADDR`
    /// still applies when the file has no `[server] listen_addr`
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn listen_addr(&self) -> &str {
        &self.listen_addr
    }

    fn source_url(&self) -> &str {
        &self.source_url
    }

    fn block_selector(&self) -> &str {
        &self.block_selector
    }

    fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    fn failure_policy(&self) -> FailurePolicy {
        self.on_refresh_failure
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        super::validate_provider(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::try_parse_from(["pollen-api"]).unwrap();

        assert_eq!(config.source_url(), DEFAULT_SOURCE_URL);
        assert_eq!(config.block_selector(), DEFAULT_BLOCK_SELECTOR);
        assert_eq!(config.refresh_interval(), Duration::from_secs(600));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(config.failure_policy(), FailurePolicy::LogAndContinue);
        assert!(config.config.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = CliConfig::try_parse_from([
            "pollen-api",
            "--listen-addr",
            "127.0.0.1:3000",
            "--refresh-interval-secs",
            "60",
            "--on-refresh-failure",
            "exit",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(config.listen_addr(), "127.0.0.1:3000");
        assert_eq!(config.refresh_interval(), Duration::from_secs(60));
        assert_eq!(config.failure_policy(), FailurePolicy::Exit);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let config =
            CliConfig::try_parse_from(["pollen-api", "--refresh-interval-secs", "0"]).unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        assert!(CliConfig::try_parse_from(["pollen-api", "--on-refresh-failure", "panic"]).is_err());
    }
}
