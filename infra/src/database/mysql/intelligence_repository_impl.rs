//! MySQL implementation of the PhoneIntelligenceRepository trait.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::mysql::MySqlRow;

use pv_core::domain::entities::{LineType, PhoneIntelligenceRecord};
use pv_core::errors::DomainResult;
use pv_core::repositories::PhoneIntelligenceRepository;

use super::{
    column, db_error, optional_timestamp_column, score_column, timestamp_column, MySqlStore,
};

impl MySqlStore {
    fn row_to_intelligence(row: &MySqlRow) -> DomainResult<PhoneIntelligenceRecord> {
        let line_type: String = column(row, "line_type")?;
        Ok(PhoneIntelligenceRecord {
            phone: column(row, "phone")?,
            is_valid: column(row, "is_valid")?,
            carrier: column(row, "carrier")?,
            line_type: LineType::parse(&line_type),
            country_code: column(row, "country_code")?,
            risk_score: score_column(row, "risk_score")?,
            last_verification: optional_timestamp_column(row, "last_verification")?,
            updated_at: timestamp_column(row, "updated_at")?,
        })
    }
}

#[async_trait]
impl PhoneIntelligenceRepository for MySqlStore {
    async fn find_intelligence(&self, phone: &str) -> DomainResult<Option<PhoneIntelligenceRecord>> {
        let row = sqlx::query(
            r#"
            SELECT phone, is_valid, carrier, line_type, country_code,
                   risk_score, last_verification, updated_at
            FROM phone_intelligence
            WHERE phone = ?
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find phone intelligence", e))?;

        row.as_ref().map(Self::row_to_intelligence).transpose()
    }

    async fn upsert_intelligence(&self, record: &PhoneIntelligenceRecord) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO phone_intelligence (
                phone, is_valid, carrier, line_type, country_code,
                risk_score, last_verification, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                is_valid = VALUES(is_valid),
                carrier = VALUES(carrier),
                line_type = VALUES(line_type),
                country_code = VALUES(country_code),
                risk_score = VALUES(risk_score),
                last_verification = VALUES(last_verification),
                updated_at = VALUES(updated_at)
            "#,
        )
        .bind(&record.phone)
        .bind(record.is_valid)
        .bind(&record.carrier)
        .bind(record.line_type.as_str())
        .bind(&record.country_code)
        .bind(i32::from(record.risk_score))
        .bind(record.last_verification)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("upsert phone intelligence", e))?;

        Ok(())
    }

    async fn decrement_risk_score(&self, phone: &str, amount: u8) -> DomainResult<Option<u8>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin intelligence transaction", e))?;

        sqlx::query(
            r#"
            UPDATE phone_intelligence
            SET risk_score = GREATEST(risk_score - ?, 0), last_verification = ?
            WHERE phone = ?
            "#,
        )
        .bind(i32::from(amount))
        .bind(Utc::now())
        .bind(phone)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("decrement risk score", e))?;

        let score: Option<i32> =
            sqlx::query_scalar("SELECT risk_score FROM phone_intelligence WHERE phone = ?")
                .bind(phone)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| db_error("read risk score", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("commit risk score", e))?;

        Ok(score.map(|s| s.clamp(0, 100) as u8))
    }
}
