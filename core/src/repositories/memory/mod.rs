//! In-memory implementation of every repository.
//!
//! Used by tests and by local development when no database is configured.
//! All tables live behind one mutex, which makes each trait method atomic.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::domain::entities::{
    AuditEntry, IdentifierKind, PhoneIntelligenceRecord, RateLimitCounter, UserIdentity,
    VerificationRecord,
};
use crate::errors::{DomainError, DomainResult};

use super::{
    AuditLogRepository, PhoneIntelligenceRepository, RateLimitCounterRepository,
    UserIdentityRepository, VerificationRecordRepository,
};

#[derive(Default)]
struct Tables {
    records: Vec<VerificationRecord>,
    counters: Vec<RateLimitCounter>,
    intelligence: HashMap<String, PhoneIntelligenceRecord>,
    identities: HashMap<String, UserIdentity>,
    audit: Vec<AuditEntry>,
}

/// Mutex-guarded store implementing [`PersistentStore`](super::PersistentStore)
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    should_fail: AtomicBool,
    counters_unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with an internal error
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Make only rate-limit counter operations fail
    pub fn set_counters_unavailable(&self, unavailable: bool) {
        self.counters_unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// All records for a phone, verified or not
    pub fn records_for(&self, phone: &str) -> Vec<VerificationRecord> {
        self.lock()
            .records
            .iter()
            .filter(|r| r.phone == phone)
            .cloned()
            .collect()
    }

    /// Number of unverified records for a phone
    pub fn pending_count(&self, phone: &str) -> usize {
        self.lock()
            .records
            .iter()
            .filter(|r| r.phone == phone && !r.verified)
            .count()
    }

    /// Shift a phone's unverified records into the past by `by`
    pub fn age_pending(&self, phone: &str, by: Duration) {
        for record in self
            .lock()
            .records
            .iter_mut()
            .filter(|r| r.phone == phone && !r.verified)
        {
            record.created_at -= by;
            record.expires_at -= by;
        }
    }

    /// Shift every counter row into the past by `by`
    pub fn age_counters(&self, by: Duration) {
        for counter in self.lock().counters.iter_mut() {
            counter.created_at -= by;
        }
    }

    pub fn counter_rows(&self) -> Vec<RateLimitCounter> {
        self.lock().counters.clone()
    }

    pub fn insert_identity(&self, identity: UserIdentity) {
        self.lock()
            .identities
            .insert(identity.phone.clone(), identity);
    }

    pub fn identity(&self, phone: &str) -> Option<UserIdentity> {
        self.lock().identities.get(phone).cloned()
    }

    pub fn intelligence(&self, phone: &str) -> Option<PhoneIntelligenceRecord> {
        self.lock().intelligence.get(phone).cloned()
    }

    /// Every audit entry in insertion order
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.lock().audit.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self) -> DomainResult<()> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::internal("In-memory store unavailable"));
        }
        Ok(())
    }

    fn check_counters(&self) -> DomainResult<()> {
        self.check()?;
        if self.counters_unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::internal("Counter table unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl VerificationRecordRepository for InMemoryStore {
    async fn replace_pending(&self, record: &VerificationRecord) -> DomainResult<()> {
        self.check()?;
        let mut tables = self.lock();
        tables
            .records
            .retain(|r| r.verified || r.phone != record.phone);
        tables.records.push(record.clone());
        Ok(())
    }

    async fn find_latest_pending(&self, phone: &str) -> DomainResult<Option<VerificationRecord>> {
        self.check()?;
        Ok(self
            .lock()
            .records
            .iter()
            .filter(|r| r.phone == phone && !r.verified)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn consume_attempt(&self, id: Uuid, max_attempts: i32) -> DomainResult<Option<i32>> {
        self.check()?;
        let mut tables = self.lock();
        let updated = tables
            .records
            .iter_mut()
            .find(|r| r.id == id && !r.verified && r.attempts < max_attempts)
            .map(|r| {
                r.attempts += 1;
                r.attempts
            });
        Ok(updated)
    }

    async fn mark_verified(&self, id: Uuid, verified_at: DateTime<Utc>) -> DomainResult<bool> {
        self.check()?;
        let mut tables = self.lock();
        match tables.records.iter_mut().find(|r| r.id == id && !r.verified) {
            Some(record) => {
                record.verified = true;
                record.verified_at = Some(verified_at);
                record.attempts = (record.attempts - 1).max(0);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl RateLimitCounterRepository for InMemoryStore {
    async fn count_since(
        &self,
        kind: IdentifierKind,
        value: &str,
        since: DateTime<Utc>,
    ) -> DomainResult<u64> {
        self.check_counters()?;
        Ok(self
            .lock()
            .counters
            .iter()
            .filter(|c| c.kind == kind && c.value == value && c.created_at >= since)
            .count() as u64)
    }

    async fn count_distinct_phones_for_ip(
        &self,
        ip: &str,
        since: DateTime<Utc>,
        exclude_phone: &str,
    ) -> DomainResult<u64> {
        self.check_counters()?;
        let tables = self.lock();
        let phones: HashSet<&str> = tables
            .counters
            .iter()
            .filter(|c| c.kind == IdentifierKind::Ip && c.value == ip && c.created_at >= since)
            .map(|c| c.phone.as_str())
            .filter(|phone| *phone != exclude_phone)
            .collect();
        Ok(phones.len() as u64)
    }

    async fn count_distinct_ips_for_phone(
        &self,
        phone: &str,
        since: DateTime<Utc>,
        exclude_ip: &str,
    ) -> DomainResult<u64> {
        self.check_counters()?;
        let tables = self.lock();
        let ips: HashSet<&str> = tables
            .counters
            .iter()
            .filter(|c| {
                c.kind == IdentifierKind::Phone && c.value == phone && c.created_at >= since
            })
            .filter_map(|c| c.ip.as_deref())
            .filter(|ip| *ip != exclude_ip)
            .collect();
        Ok(ips.len() as u64)
    }

    async fn record(&self, counters: &[RateLimitCounter]) -> DomainResult<()> {
        self.check_counters()?;
        self.lock().counters.extend_from_slice(counters);
        Ok(())
    }

    async fn release(&self, ids: &[Uuid]) -> DomainResult<()> {
        self.check_counters()?;
        self.lock().counters.retain(|c| !ids.contains(&c.id));
        Ok(())
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> DomainResult<u64> {
        self.check_counters()?;
        let mut tables = self.lock();
        let before = tables.counters.len();
        tables.counters.retain(|c| c.created_at >= cutoff);
        Ok((before - tables.counters.len()) as u64)
    }
}

#[async_trait]
impl PhoneIntelligenceRepository for InMemoryStore {
    async fn find_intelligence(&self, phone: &str) -> DomainResult<Option<PhoneIntelligenceRecord>> {
        self.check()?;
        Ok(self.lock().intelligence.get(phone).cloned())
    }

    async fn upsert_intelligence(&self, record: &PhoneIntelligenceRecord) -> DomainResult<()> {
        self.check()?;
        self.lock()
            .intelligence
            .insert(record.phone.clone(), record.clone());
        Ok(())
    }

    async fn decrement_risk_score(&self, phone: &str, amount: u8) -> DomainResult<Option<u8>> {
        self.check()?;
        let mut tables = self.lock();
        Ok(tables.intelligence.get_mut(phone).map(|record| {
            record.risk_score = record.risk_score.saturating_sub(amount);
            record.last_verification = Some(Utc::now());
            record.risk_score
        }))
    }
}

#[async_trait]
impl UserIdentityRepository for InMemoryStore {
    async fn find_identity(&self, phone: &str) -> DomainResult<Option<UserIdentity>> {
        self.check()?;
        Ok(self.lock().identities.get(phone).cloned())
    }

    async fn record_verification(
        &self,
        phone: &str,
        verified_at: DateTime<Utc>,
    ) -> DomainResult<UserIdentity> {
        self.check()?;
        let mut tables = self.lock();
        let identity = tables
            .identities
            .entry(phone.to_string())
            .and_modify(|identity| identity.record_verification(verified_at))
            .or_insert_with(|| UserIdentity::first_verification(phone, verified_at));
        Ok(identity.clone())
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryStore {
    async fn append(&self, entry: &AuditEntry) -> DomainResult<()> {
        self.check()?;
        self.lock().audit.push(entry.clone());
        Ok(())
    }

    async fn find_by_phone_hash(&self, phone_hash: &str, limit: usize) -> DomainResult<Vec<AuditEntry>> {
        self.check()?;
        let mut result: Vec<AuditEntry> = self
            .lock()
            .audit
            .iter()
            .filter(|entry| entry.phone_hash.as_deref() == Some(phone_hash))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result.truncate(limit);
        Ok(result)
    }
}

#[cfg(test)]
mod tests;
