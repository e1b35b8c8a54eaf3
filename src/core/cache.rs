//! The single snapshot slot shared by request handlers and the refresher.
//!
//! Readers take the shared lock. Rebuilds take the exclusive lock for the
//! whole fetch and parse, so concurrent rebuilds run one after another and a
//! failed rebuild leaves the previous snapshot in place.

use crate::domain::model::Snapshot;
use crate::utils::error::{PollenError, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Posted by a reader that found the cache empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildRequest;

/// Receiving end of the cache-miss channel, owned by the scheduler.
#[derive(Debug)]
pub struct RebuildRequests {
    rx: mpsc::Receiver<RebuildRequest>,
}

impl RebuildRequests {
    pub async fn recv(&mut self) -> Option<RebuildRequest> {
        self.rx.recv().await
    }

    #[cfg(test)]
    pub(crate) fn try_recv(&mut self) -> Option<RebuildRequest> {
        self.rx.try_recv().ok()
    }
}

#[derive(Debug)]
pub struct CacheStore {
    slot: RwLock<Option<Arc<Snapshot>>>,
    rebuild_tx: mpsc::Sender<RebuildRequest>,
}

impl CacheStore {
    /// Creates an empty store and the channel its cache misses are posted to.
    ///
    /// The channel holds one pending request; misses that arrive while one is
    /// already queued are folded into it.
    pub fn new() -> (Self, RebuildRequests) {
        let (rebuild_tx, rx) = mpsc::channel(1);
        let store = Self {
            slot: RwLock::new(None),
            rebuild_tx,
        };
        (store, RebuildRequests { rx })
    }

    /// Returns the current snapshot, or requests a rebuild and fails with
    /// [`PollenError::CacheEmpty`] without waiting for it.
    pub async fn read(&self) -> Result<Arc<Snapshot>> {
        let slot = self.slot.read().await;
        if let Some(snapshot) = slot.as_ref() {
            return Ok(Arc::clone(snapshot));
        }
        drop(slot);

        self.request_rebuild();
        Err(PollenError::CacheEmpty)
    }

    /// Like [`read`](Self::read) but never requests a rebuild.
    pub async fn peek(&self) -> Option<Arc<Snapshot>> {
        self.slot.read().await.clone()
    }

    /// Runs `build` under the exclusive lock and publishes its snapshot.
    ///
    /// `build` is not polled until the lock is held. On error the slot is
    /// left untouched and the error is returned.
    pub async fn rebuild<F>(&self, build: F) -> Result<Arc<Snapshot>>
    where
        F: Future<Output = Result<Snapshot>>,
    {
        let mut slot = self.slot.write().await;
        let snapshot = Arc::new(build.await?);
        *slot = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Single-flight variant of [`rebuild`](Self::rebuild) for cache misses:
    /// if an earlier rebuild already filled the slot, `build` is dropped
    /// without running.
    pub async fn populate<F>(&self, build: F) -> Result<Arc<Snapshot>>
    where
        F: Future<Output = Result<Snapshot>>,
    {
        let mut slot = self.slot.write().await;
        if let Some(existing) = slot.as_ref() {
            tracing::debug!("Cache already populated, skipping rebuild");
            return Ok(Arc::clone(existing));
        }
        let snapshot = Arc::new(build.await?);
        *slot = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    fn request_rebuild(&self) {
        match self.rebuild_tx.try_send(RebuildRequest) {
            Ok(()) => tracing::info!("Cache is empty, rebuild requested"),
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::debug!("Cache is empty, rebuild already pending")
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("Cache is empty and no refresher is listening")
            }
        }
    }
}
