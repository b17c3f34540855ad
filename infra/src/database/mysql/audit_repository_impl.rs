//! MySQL implementation of the AuditLogRepository trait.
//!
//! Entries go to the append-only `verification_audit_log` table. Phone
//! numbers are stored masked and hashed only.

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;

use pv_core::domain::entities::{join_flags, split_flags, AttemptType, AuditEntry, AuditStatus};
use pv_core::errors::{DomainError, DomainResult};
use pv_core::repositories::AuditLogRepository;

use super::{column, db_error, score_column, timestamp_column, uuid_column, MySqlStore};

impl MySqlStore {
    /// Convert database row to AuditEntry entity
    fn row_to_audit_entry(row: &MySqlRow) -> DomainResult<AuditEntry> {
        let attempt_type: String = column(row, "attempt_type")?;
        let attempt_type =
            AttemptType::parse(&attempt_type).ok_or_else(|| DomainError::Internal {
                message: format!("Unknown attempt type: {}", attempt_type),
            })?;

        let status: String = column(row, "status")?;
        let status = AuditStatus::parse(&status).ok_or_else(|| DomainError::Internal {
            message: format!("Unknown audit status: {}", status),
        })?;

        let risk_flags: String = column(row, "risk_flags")?;

        Ok(AuditEntry {
            id: uuid_column(row, "id")?,
            attempt_type,
            status,
            phone_masked: column(row, "phone_masked")?,
            phone_hash: column(row, "phone_hash")?,
            ip_address: column(row, "ip_address")?,
            fingerprint_hash: column(row, "fingerprint_hash")?,
            session_id: column(row, "session_id")?,
            user_agent: column(row, "user_agent")?,
            risk_score: score_column(row, "risk_score")?,
            risk_flags: split_flags(&risk_flags),
            detail: column(row, "detail")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }
}

#[async_trait]
impl AuditLogRepository for MySqlStore {
    async fn append(&self, entry: &AuditEntry) -> DomainResult<()> {
        let query = r#"
            INSERT INTO verification_audit_log (
                id, attempt_type, status, phone_masked, phone_hash,
                ip_address, fingerprint_hash, session_id, user_agent,
                risk_score, risk_flags, detail, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(entry.id.to_string())
            .bind(entry.attempt_type.as_str())
            .bind(entry.status.as_str())
            .bind(&entry.phone_masked)
            .bind(&entry.phone_hash)
            .bind(&entry.ip_address)
            .bind(&entry.fingerprint_hash)
            .bind(&entry.session_id)
            .bind(&entry.user_agent)
            .bind(i32::from(entry.risk_score))
            .bind(join_flags(&entry.risk_flags))
            .bind(&entry.detail)
            .bind(entry.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("append audit entry", e))?;

        Ok(())
    }

    async fn find_by_phone_hash(&self, phone_hash: &str, limit: usize) -> DomainResult<Vec<AuditEntry>> {
        let query = r#"
            SELECT id, attempt_type, status, phone_masked, phone_hash,
                   ip_address, fingerprint_hash, session_id, user_agent,
                   risk_score, risk_flags, detail, created_at
            FROM verification_audit_log
            WHERE phone_hash = ?
            ORDER BY created_at DESC
            LIMIT ?
        "#;

        let rows = sqlx::query(query)
            .bind(phone_hash)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("find audit entries", e))?;

        rows.iter().map(Self::row_to_audit_entry).collect()
    }
}
