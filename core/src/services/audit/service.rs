//! Audit service recording every send and verify attempt.
//!
//! Writes never fail the calling flow: a failed append is logged and the
//! request carries on with its own outcome.

use std::sync::Arc;
use tokio::task;

use crate::domain::entities::{hash_phone, AuditEntry};
use crate::errors::DomainResult;
use crate::repositories::AuditLogRepository;

/// Configuration for the audit service
#[derive(Debug, Clone)]
pub struct AuditServiceConfig {
    /// Write in a background task instead of awaiting the append
    pub async_writes: bool,
    /// Upper bound for history queries
    pub max_query_limit: usize,
}

impl Default for AuditServiceConfig {
    fn default() -> Self {
        Self {
            async_writes: false,
            max_query_limit: 100,
        }
    }
}

/// Service appending audit entries and reading them back per phone
pub struct AuditService<R>
where
    R: AuditLogRepository,
{
    repository: Arc<R>,
    config: AuditServiceConfig,
}

impl<R> AuditService<R>
where
    R: AuditLogRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: AuditServiceConfig) -> Self {
        Self { repository, config }
    }

    /// Append an entry, logging instead of failing when the store is down
    pub async fn record(&self, entry: AuditEntry) {
        if self.config.async_writes {
            let repository = Arc::clone(&self.repository);
            task::spawn(async move {
                if let Err(e) = repository.append(&entry).await {
                    log_write_failure(&entry, &e.to_string());
                }
            });
            return;
        }

        if let Err(e) = self.repository.append(&entry).await {
            log_write_failure(&entry, &e.to_string());
        }
    }

    /// Recent entries for a canonical phone, newest first
    pub async fn history_for_phone(&self, phone: &str, limit: usize) -> DomainResult<Vec<AuditEntry>> {
        self.repository
            .find_by_phone_hash(&hash_phone(phone), limit.min(self.config.max_query_limit))
            .await
    }
}

fn log_write_failure(entry: &AuditEntry, error: &str) {
    tracing::error!(
        attempt_type = entry.attempt_type.as_str(),
        status = entry.status.as_str(),
        phone = entry.phone_masked.as_deref().unwrap_or("-"),
        error = %error,
        event = "audit_write_failed",
        "Failed to write audit entry"
    );
}
