//! Periodic pruning of expired rate-limit counter rows

use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use pv_shared::RateLimitConfig;

use crate::errors::DomainResult;
use crate::repositories::RateLimitCounterRepository;

/// Configuration for the counter cleanup task
#[derive(Debug, Clone)]
pub struct CounterCleanupConfig {
    /// How often to prune
    pub interval: std::time::Duration,
    /// Rows older than this are deleted
    pub retention: Duration,
}

impl Default for CounterCleanupConfig {
    fn default() -> Self {
        Self {
            interval: std::time::Duration::from_secs(3600),
            retention: Duration::hours(24),
        }
    }
}

impl From<&RateLimitConfig> for CounterCleanupConfig {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            interval: std::time::Duration::from_secs(config.cleanup_interval_seconds.max(1)),
            retention: Duration::hours(config.counter_retention_hours),
        }
    }
}

/// Run one pruning pass
pub async fn prune_counters<R>(repository: &R, retention: Duration) -> DomainResult<u64>
where
    R: RateLimitCounterRepository + ?Sized,
{
    let cutoff = Utc::now() - retention;
    let deleted = repository.prune_older_than(cutoff).await?;
    if deleted > 0 {
        info!(deleted, event = "counter_cleanup", "Pruned expired rate limit counters");
    }
    Ok(deleted)
}

/// Spawn a background task pruning counters every `config.interval`
///
/// Best effort: a failed pass is logged and retried on the next tick.
pub fn spawn_counter_cleanup<R>(repository: Arc<R>, config: CounterCleanupConfig) -> JoinHandle<()>
where
    R: RateLimitCounterRepository + ?Sized + 'static,
{
    tokio::spawn(async move {
        info!(
            interval_seconds = config.interval.as_secs(),
            retention_hours = config.retention.num_hours(),
            "Counter cleanup task started"
        );
        let mut ticker = tokio::time::interval(config.interval);
        loop {
            ticker.tick().await;
            if let Err(e) = prune_counters(repository.as_ref(), config.retention).await {
                warn!(error = %e, event = "counter_cleanup_failed", "Counter cleanup pass failed");
            }
        }
    })
}
