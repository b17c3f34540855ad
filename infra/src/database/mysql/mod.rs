//! MySQL implementations of the repository traits.
//!
//! One [`MySqlStore`] implements all five repositories so it satisfies
//! `PersistentStore` directly. Each repository lives in its own file.

mod audit_repository_impl;
mod counter_repository_impl;
mod identity_repository_impl;
mod intelligence_repository_impl;
mod verification_repository_impl;

use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, Row};
use uuid::Uuid;

use pv_core::errors::{DomainError, DomainResult};

use crate::database::DatabasePool;

/// MySQL-backed store for records, counters, intelligence, identities and audit
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn from_database(database: &DatabasePool) -> Self {
        Self::new(database.get_pool().clone())
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

/// Wrap a SQLx failure as an internal domain error
pub(crate) fn db_error(action: &str, e: sqlx::Error) -> DomainError {
    tracing::error!(error = %e, action, "Database operation failed");
    DomainError::Internal {
        message: format!("Failed to {}: {}", action, e),
    }
}

/// Read one column, mapping decode failures to [`DomainError::Internal`]
pub(crate) fn column<'r, T>(row: &'r MySqlRow, name: &str) -> DomainResult<T>
where
    T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    row.try_get(name).map_err(|e| DomainError::Internal {
        message: format!("Failed to get {}: {}", name, e),
    })
}

pub(crate) fn uuid_column(row: &MySqlRow, name: &str) -> DomainResult<Uuid> {
    let raw: String = column(row, name)?;
    Uuid::parse_str(&raw).map_err(|e| DomainError::Internal {
        message: format!("Invalid UUID in {}: {}", name, e),
    })
}

/// Scores are stored as signed INT so `GREATEST(score - n, 0)` cannot underflow
pub(crate) fn score_column(row: &MySqlRow, name: &str) -> DomainResult<u8> {
    let raw: i32 = column(row, name)?;
    Ok(raw.clamp(0, 100) as u8)
}

pub(crate) fn timestamp_column(row: &MySqlRow, name: &str) -> DomainResult<DateTime<Utc>> {
    column(row, name)
}

pub(crate) fn optional_timestamp_column(
    row: &MySqlRow,
    name: &str,
) -> DomainResult<Option<DateTime<Utc>>> {
    column(row, name)
}

/// Deadlocks and unique-key races that a retry resolves
pub(crate) fn is_write_conflict(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => matches!(db.code().as_deref(), Some("40001") | Some("23000")),
        _ => false,
    }
}
