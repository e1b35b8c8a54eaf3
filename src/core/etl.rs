use crate::core::cache::CacheStore;
use crate::core::extractor::ForecastExtractor;
use crate::domain::model::Snapshot;
use crate::domain::ports::MarkupSource;
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Instant;

/// One fetch, extract and publish cycle against a [`CacheStore`].
pub struct RebuildEngine<S: MarkupSource> {
    source: S,
    extractor: ForecastExtractor,
    store: Arc<CacheStore>,
}

impl<S: MarkupSource> RebuildEngine<S> {
    pub fn new(source: S, extractor: ForecastExtractor, store: Arc<CacheStore>) -> Self {
        Self {
            source,
            extractor,
            store,
        }
    }

    pub fn store(&self) -> Arc<CacheStore> {
        Arc::clone(&self.store)
    }

    /// Unconditional rebuild, used by the periodic refresh.
    pub async fn run(&self) -> Result<Arc<Snapshot>> {
        tracing::info!(origin = self.source.origin(), "Starting cache rebuild");
        let started = Instant::now();

        let snapshot = self.store.rebuild(self.fetch_and_extract()).await?;

        tracing::info!(
            records = snapshot.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Cache rebuild successful"
        );
        Ok(snapshot)
    }

    /// Rebuild only if nothing has been published yet, used on cache misses.
    pub async fn warm(&self) -> Result<Arc<Snapshot>> {
        let started = Instant::now();
        let snapshot = self.store.populate(self.fetch_and_extract()).await?;

        tracing::info!(
            records = snapshot.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Cache populated"
        );
        Ok(snapshot)
    }

    async fn fetch_and_extract(&self) -> Result<Snapshot> {
        // Extract
        tracing::debug!("Fetching forecast page from {}", self.source.origin());
        let markup = self.source.fetch().await?;
        tracing::debug!("Fetched {} bytes", markup.len());

        // Transform
        let snapshot = self.extractor.extract(&markup)?;
        tracing::debug!("Extracted {} forecast records", snapshot.len());

        // Load happens in the store once this returns Ok
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::PollenError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MockSource {
        pages: Mutex<Vec<Result<String>>>,
        fetches: AtomicUsize,
    }

    impl MockSource {
        fn new(pages: Vec<Result<String>>) -> Self {
            Self {
                pages: Mutex::new(pages),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MarkupSource for MockSource {
        async fn fetch(&self) -> Result<String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.pages.lock().unwrap().remove(0)
        }

        fn origin(&self) -> &str {
            "mock://pollen"
        }
    }

    const GOOD_PAGE: &str = r#"<div class="tx-dmi-data-store"><table><tr><td><table><tr><th>Aarhus</th></tr><tr><td>Birk</td><td>12</td></tr><tr><td>El</td><td>-</td></tr><tr><td>Low</td></tr></table></td></tr></table></div>"#;
    const BAD_PAGE: &str = r#"<div class="tx-dmi-data-store"><table><tr><td><table><tr><th>Aarhus</th></tr><tr><td>Birk</td><td>abc</td></tr></table></td></tr></table></div>"#;

    fn engine(pages: Vec<Result<String>>) -> RebuildEngine<MockSource> {
        let (store, _requests) = CacheStore::new();
        RebuildEngine::new(
            MockSource::new(pages),
            ForecastExtractor::default(),
            Arc::new(store),
        )
    }

    #[tokio::test]
    async fn test_run_publishes_extracted_snapshot() {
        let engine = engine(vec![Ok(GOOD_PAGE.to_string())]);

        let snapshot = engine.run().await.unwrap();

        assert_eq!(snapshot.records()[0].location_name, "Aarhus");
        assert_eq!(snapshot.records()[0].measurements.len(), 2);
        assert_eq!(snapshot.records()[0].summary_text, "Low");
        assert!(engine.store().peek().await.is_some());
    }

    #[tokio::test]
    async fn test_parse_failure_keeps_previous_snapshot() {
        let engine = engine(vec![Ok(GOOD_PAGE.to_string()), Ok(BAD_PAGE.to_string())]);
        let good = engine.run().await.unwrap();

        let err = engine.run().await.unwrap_err();

        assert!(matches!(err, PollenError::ParseError { ref value, .. } if value == "abc"));
        let current = engine.store().read().await.unwrap();
        assert_eq!(*current, *good);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_propagated() {
        let engine = engine(vec![Err(PollenError::UpstreamStatus {
            url: "mock://pollen".to_string(),
            status: 502,
        })]);

        let err = engine.run().await.unwrap_err();

        assert!(matches!(err, PollenError::UpstreamStatus { status: 502, .. }));
        assert!(engine.store().peek().await.is_none());
    }

    #[tokio::test]
    async fn test_warm_fetches_only_once() {
        let engine = engine(vec![Ok(GOOD_PAGE.to_string())]);

        engine.warm().await.unwrap();
        engine.warm().await.unwrap();

        assert_eq!(engine.source.fetches.load(Ordering::SeqCst), 1);
    }
}
