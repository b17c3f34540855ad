//! MySQL implementation of the VerificationRecordRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use uuid::Uuid;

use pv_core::domain::entities::{split_flags, join_flags, VerificationRecord};
use pv_core::errors::DomainResult;
use pv_core::repositories::VerificationRecordRepository;
use pv_shared::phone::mask_phone_number;

use super::{
    column, db_error, is_write_conflict, optional_timestamp_column, score_column,
    timestamp_column, uuid_column, MySqlStore,
};

/// Retries for `replace_pending` when two sends for one phone race
const REPLACE_RETRIES: usize = 3;

const SELECT_COLUMNS: &str = r#"
    SELECT id, phone, code, created_at, expires_at, attempts, verified,
           verified_at, request_ip, fingerprint_hash, session_id,
           risk_score, risk_flags, required_captcha
    FROM verification_records
"#;

impl MySqlStore {
    fn row_to_record(row: &MySqlRow) -> DomainResult<VerificationRecord> {
        let risk_flags: String = column(row, "risk_flags")?;
        Ok(VerificationRecord {
            id: uuid_column(row, "id")?,
            phone: column(row, "phone")?,
            code: column(row, "code")?,
            created_at: timestamp_column(row, "created_at")?,
            expires_at: timestamp_column(row, "expires_at")?,
            attempts: column(row, "attempts")?,
            verified: column(row, "verified")?,
            verified_at: optional_timestamp_column(row, "verified_at")?,
            request_ip: column(row, "request_ip")?,
            fingerprint_hash: column(row, "fingerprint_hash")?,
            session_id: column(row, "session_id")?,
            risk_score: score_column(row, "risk_score")?,
            risk_flags: split_flags(&risk_flags),
            required_captcha: column(row, "required_captcha")?,
        })
    }

    async fn try_replace_pending(&self, record: &VerificationRecord) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM verification_records WHERE phone = ? AND verified = FALSE")
            .bind(&record.phone)
            .execute(&mut *tx)
            .await?;

        let query = r#"
            INSERT INTO verification_records (
                id, phone, code, created_at, expires_at, attempts, verified,
                verified_at, request_ip, fingerprint_hash, session_id,
                risk_score, risk_flags, required_captcha
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(record.id.to_string())
            .bind(&record.phone)
            .bind(&record.code)
            .bind(record.created_at)
            .bind(record.expires_at)
            .bind(record.attempts)
            .bind(record.verified)
            .bind(record.verified_at)
            .bind(&record.request_ip)
            .bind(&record.fingerprint_hash)
            .bind(&record.session_id)
            .bind(i32::from(record.risk_score))
            .bind(join_flags(&record.risk_flags))
            .bind(record.required_captcha)
            .execute(&mut *tx)
            .await?;

        tx.commit().await
    }
}

#[async_trait]
impl VerificationRecordRepository for MySqlStore {
    async fn replace_pending(&self, record: &VerificationRecord) -> DomainResult<()> {
        let mut attempt = 1;
        loop {
            match self.try_replace_pending(record).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < REPLACE_RETRIES && is_write_conflict(&e) => {
                    tracing::debug!(
                        phone = %mask_phone_number(&record.phone),
                        attempt,
                        "Concurrent send for phone, retrying pending replacement"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(db_error("replace pending verification", e)),
            }
        }
    }

    async fn find_latest_pending(&self, phone: &str) -> DomainResult<Option<VerificationRecord>> {
        let query = format!(
            "{} WHERE phone = ? AND verified = FALSE ORDER BY created_at DESC LIMIT 1",
            SELECT_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(phone)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("find pending verification", e))?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn consume_attempt(&self, id: Uuid, max_attempts: i32) -> DomainResult<Option<i32>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin attempt transaction", e))?;

        let result = sqlx::query(
            r#"
            UPDATE verification_records
            SET attempts = attempts + 1
            WHERE id = ? AND verified = FALSE AND attempts < ?
            "#,
        )
        .bind(id.to_string())
        .bind(max_attempts)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("consume attempt", e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        // The row lock from the UPDATE is held until commit
        let attempts: i32 = sqlx::query_scalar("SELECT attempts FROM verification_records WHERE id = ?")
            .bind(id.to_string())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| db_error("read attempts", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("commit attempt", e))?;

        Ok(Some(attempts))
    }

    async fn mark_verified(&self, id: Uuid, verified_at: DateTime<Utc>) -> DomainResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE verification_records
            SET verified = TRUE, verified_at = ?, attempts = GREATEST(attempts - 1, 0)
            WHERE id = ? AND verified = FALSE
            "#,
        )
        .bind(verified_at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("mark verification verified", e))?;

        Ok(result.rows_affected() > 0)
    }
}
