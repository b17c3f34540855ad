//! Bounded in-process cache and call throttle for phone lookups

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use super::types::PhoneValidation;

struct CacheEntry {
    validation: PhoneValidation,
    inserted_at: DateTime<Utc>,
}

/// TTL cache that evicts the oldest entry when full
pub struct IntelligenceCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    capacity: usize,
    ttl: Duration,
}

impl IntelligenceCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Fresh entry for `phone` at `now`; stale entries are dropped
    pub fn get(&self, phone: &str, now: DateTime<Utc>) -> Option<PhoneValidation> {
        let mut entries = self.lock();
        match entries.get(phone) {
            Some(entry) if now - entry.inserted_at < self.ttl => Some(entry.validation.clone()),
            Some(_) => {
                entries.remove(phone);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, validation: PhoneValidation, now: DateTime<Utc>) {
        let mut entries = self.lock();
        if !entries.contains_key(&validation.phone) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(phone, _)| phone.clone());
            if let Some(phone) = oldest {
                entries.remove(&phone);
            }
        }
        entries.insert(
            validation.phone.clone(),
            CacheEntry {
                validation,
                inserted_at: now,
            },
        );
    }

    /// Apply `f` to a cached entry in place, keeping its insertion time
    pub fn update<F>(&self, phone: &str, f: F) -> bool
    where
        F: FnOnce(&mut PhoneValidation),
    {
        match self.lock().get_mut(phone) {
            Some(entry) => {
                f(&mut entry.validation);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Rolling one-minute ceiling on outbound lookups
pub struct LookupThrottle {
    calls: Mutex<VecDeque<Instant>>,
    limit: usize,
    window: std::time::Duration,
}

impl LookupThrottle {
    pub fn per_minute(limit: u32) -> Self {
        Self {
            calls: Mutex::new(VecDeque::new()),
            limit: limit as usize,
            window: std::time::Duration::from_secs(60),
        }
    }

    /// Reserve a slot at `now`, returning false when the window is full
    pub fn try_acquire(&self, now: Instant) -> bool {
        let mut calls = self
            .calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        while let Some(front) = calls.front() {
            if now.duration_since(*front) >= self.window {
                calls.pop_front();
            } else {
                break;
            }
        }
        if calls.len() >= self.limit {
            return false;
        }
        calls.push_back(now);
        true
    }
}
