use crate::core::cache::RebuildRequests;
use crate::core::etl::RebuildEngine;
use crate::domain::model::FailurePolicy;
use crate::domain::ports::MarkupSource;
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Drives rebuilds from a fixed-interval timer and from cache-miss requests.
pub struct RefreshScheduler<S: MarkupSource + 'static> {
    engine: Arc<RebuildEngine<S>>,
    requests: RebuildRequests,
    interval: Duration,
    policy: FailurePolicy,
}

impl<S: MarkupSource + 'static> RefreshScheduler<S> {
    pub fn new(
        engine: Arc<RebuildEngine<S>>,
        requests: RebuildRequests,
        interval: Duration,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            engine,
            requests,
            interval,
            policy,
        }
    }

    /// Runs until `shutdown` is cancelled.
    ///
    /// Returns an error only under [`FailurePolicy::Exit`], when a periodic
    /// rebuild fails. Cache-miss rebuilds run on their own tasks and their
    /// failures are only logged.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<()> {
        info!(
            interval_secs = self.interval.as_secs(),
            policy = ?self.policy,
            "Refresh scheduler started"
        );

        // First periodic refresh fires one full interval after start.
        let mut ticker = time::interval_at(time::Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Refresh scheduler stopping");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    // Dropping an in-flight rebuild releases the lock and leaves the slot as it was.
                    let outcome = tokio::select! {
                        _ = shutdown.cancelled() => {
                            info!("Refresh scheduler stopping, abandoning in-flight rebuild");
                            return Ok(());
                        }
                        outcome = self.engine.run() => outcome,
                    };
                    if let Err(e) = outcome {
                        match self.policy {
                            FailurePolicy::LogAndContinue => {
                                error!(error = %e, "Error rebuilding cache, keeping previous snapshot");
                            }
                            FailurePolicy::Exit => {
                                error!(error = %e, "Error rebuilding cache, stopping");
                                return Err(e);
                            }
                        }
                    }
                }
                Some(_) = self.requests.recv() => {
                    self.spawn_warm();
                }
            }
        }
    }

    fn spawn_warm(&self) {
        let engine = Arc::clone(&self.engine);
        tokio::spawn(async move {
            if let Err(e) = engine.warm().await {
                warn!(error = %e, "Cache-miss rebuild failed");
            }
        });
    }
}
