#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_listen_addr, validate_positive_number, validate_selector, validate_url,
};

/// Every interface, port 8080.
pub const DEFAULT_LISTEN_ADDR: &str = ":8080";

/// Environment variable that sets the listen address for every config source.
pub const LISTEN_ADDR_ENV: &str = "LISTEN_ADDR";

/// `LISTEN_ADDR` when set and non-empty, else [`DEFAULT_LISTEN_ADDR`].
pub fn default_listen_addr() -> String {
    listen_addr_or_default(std::env::var(LISTEN_ADDR_ENV).ok())
}

fn listen_addr_or_default(from_env: Option<String>) -> String {
    from_env
        .filter(|addr| !addr.is_empty())
        .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
}

/// Checks shared by every configuration source.
pub fn validate_provider(config: &dyn ConfigProvider) -> Result<()> {
    validate_listen_addr("listen_addr", config.listen_addr())?;
    validate_url("source_url", config.source_url())?;
    validate_selector("block_selector", config.block_selector())?;
    validate_positive_number("refresh_interval", config.refresh_interval().as_secs(), 1)?;
    validate_positive_number(
        "fetch_timeout",
        u64::try_from(config.fetch_timeout().as_millis()).unwrap_or(u64::MAX),
        1,
    )?;
    Ok(())
}
