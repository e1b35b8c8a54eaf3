use crate::adapters::api;
use crate::adapters::http::HttpMarkupSource;
use crate::core::cache::CacheStore;
use crate::core::etl::RebuildEngine;
use crate::core::extractor::ForecastExtractor;
use crate::core::scheduler::RefreshScheduler;
use crate::core::{ConfigProvider, MarkupSource};
use crate::utils::error::Result;
use crate::utils::validation::normalize_listen_addr;
use axum::Router;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// The cache, its refresher and the HTTP API, wired from one configuration.
pub struct PollenService {
    store: Arc<CacheStore>,
    scheduler: RefreshScheduler<HttpMarkupSource>,
    listen_addr: String,
}

impl PollenService {
    pub fn from_config(config: &dyn ConfigProvider) -> Result<Self> {
        let source = HttpMarkupSource::new(config.source_url(), config.fetch_timeout())?;
        let extractor = ForecastExtractor::new(config.block_selector())?;
        tracing::debug!(
            source = source.origin(),
            block_selector = extractor.block_selector(),
            "Rebuild pipeline configured"
        );

        let (store, requests) = CacheStore::new();
        let store = Arc::new(store);
        let engine = Arc::new(RebuildEngine::new(source, extractor, Arc::clone(&store)));
        let scheduler = RefreshScheduler::new(
            engine,
            requests,
            config.refresh_interval(),
            config.failure_policy(),
        );

        Ok(Self {
            store,
            scheduler,
            listen_addr: normalize_listen_addr(config.listen_addr()),
        })
    }

    pub fn store(&self) -> Arc<CacheStore> {
        Arc::clone(&self.store)
    }

    pub fn router(&self) -> Router {
        api::router(self.store())
    }

    /// Binds the listener and serves until `shutdown` is cancelled or the
    /// scheduler stops with an error.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let listener = TcpListener::bind(&self.listen_addr).await?;
        let local_addr = listener.local_addr()?;
        self.serve(listener, shutdown).await?;
        tracing::info!(%local_addr, "Server stopped");
        Ok(())
    }

    pub async fn serve(self, listener: TcpListener, shutdown: CancellationToken) -> Result<()> {
        tracing::info!(addr = %listener.local_addr()?, "Serving pollen forecasts");

        let router = self.router();
        let mut scheduler = tokio::spawn(self.scheduler.run(shutdown.clone()));

        let server_token = shutdown.clone();
        let server = axum::serve(listener, router)
            .with_graceful_shutdown(async move { server_token.cancelled().await })
            .into_future();

        tokio::select! {
            served = server => {
                shutdown.cancel();
                served?;
                scheduler.await??;
                Ok(())
            }
            scheduled = &mut scheduler => {
                shutdown.cancel();
                scheduled?
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TomlConfig;
    use crate::utils::error::PollenError;

    #[test]
    fn test_bad_selector_is_rejected_at_startup() {
        let config =
            TomlConfig::from_toml_str("[source]\nblock_selector = \"table[\"\n").unwrap();

        let err = PollenService::from_config(&config).err().unwrap();

        assert!(matches!(err, PollenError::InvalidConfigValueError { .. }));
    }

    #[tokio::test]
    async fn test_shutdown_before_first_request() {
        let config = TomlConfig::from_toml_str("[server]\nlisten_addr = \":0\"\n").unwrap();
        let service = PollenService::from_config(&config).unwrap();
        assert!(service.store().peek().await.is_none());

        let shutdown = CancellationToken::new();
        shutdown.cancel();

        service.run(shutdown).await.unwrap();
    }
}
