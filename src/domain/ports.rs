use crate::domain::model::FailurePolicy;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use async_trait::async_trait;
use std::time::Duration;

/// Where the raw forecast page comes from.
#[async_trait]
pub trait MarkupSource: Send + Sync {
    async fn fetch(&self) -> Result<String>;

    /// Human-readable origin, used in log lines.
    fn origin(&self) -> &str;
}

/// Every configuration source checks itself before the service is built.
pub trait ConfigProvider: Validate + Send + Sync {
    fn listen_addr(&self) -> &str;
    fn source_url(&self) -> &str;
    fn block_selector(&self) -> &str;
    fn refresh_interval(&self) -> Duration;
    fn fetch_timeout(&self) -> Duration;
    fn failure_policy(&self) -> FailurePolicy;
}
