use crate::domain::ports::MarkupSource;
use crate::utils::error::{PollenError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_SOURCE_URL: &str = "https://www.dmi.dk/vejr/sundhedsvejr/pollen/";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("pollen-api/", env!("CARGO_PKG_VERSION"));

/// Fetches the forecast page over HTTP.
#[derive(Debug, Clone)]
pub struct HttpMarkupSource {
    client: Client,
    url: String,
}

impl HttpMarkupSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PollenError::ConfigError {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, url })
    }

    fn fetch_error(&self, e: reqwest::Error) -> PollenError {
        PollenError::FetchError {
            url: self.url.clone(),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl MarkupSource for HttpMarkupSource {
    async fn fetch(&self) -> Result<String> {
        tracing::debug!("Making request to: {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.fetch_error(e))?;

        let status = response.status();
        tracing::debug!("Upstream response status: {}", status);
        if !status.is_success() {
            return Err(PollenError::UpstreamStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| self.fetch_error(e))
    }

    fn origin(&self) -> &str {
        &self.url
    }
}
