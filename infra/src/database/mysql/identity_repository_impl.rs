//! MySQL implementation of the UserIdentityRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;

use pv_core::domain::entities::UserIdentity;
use pv_core::errors::{DomainError, DomainResult};
use pv_core::repositories::UserIdentityRepository;

use super::{column, db_error, timestamp_column, MySqlStore};

const SELECT_IDENTITY: &str = r#"
    SELECT phone, last_verified_at, verification_count
    FROM user_identities
    WHERE phone = ?
"#;

impl MySqlStore {
    fn row_to_identity(row: &MySqlRow) -> DomainResult<UserIdentity> {
        Ok(UserIdentity {
            phone: column(row, "phone")?,
            last_verified_at: timestamp_column(row, "last_verified_at")?,
            verification_count: column(row, "verification_count")?,
        })
    }
}

#[async_trait]
impl UserIdentityRepository for MySqlStore {
    async fn find_identity(&self, phone: &str) -> DomainResult<Option<UserIdentity>> {
        let row = sqlx::query(SELECT_IDENTITY)
            .bind(phone)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("find user identity", e))?;

        row.as_ref().map(Self::row_to_identity).transpose()
    }

    async fn record_verification(
        &self,
        phone: &str,
        verified_at: DateTime<Utc>,
    ) -> DomainResult<UserIdentity> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin identity transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO user_identities (phone, last_verified_at, verification_count)
            VALUES (?, ?, 1)
            ON DUPLICATE KEY UPDATE
                last_verified_at = VALUES(last_verified_at),
                verification_count = verification_count + 1
            "#,
        )
        .bind(phone)
        .bind(verified_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("upsert user identity", e))?;

        let row = sqlx::query(SELECT_IDENTITY)
            .bind(phone)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| db_error("read user identity", e))?
            .ok_or_else(|| DomainError::internal("User identity missing after upsert"))?;
        let identity = Self::row_to_identity(&row)?;

        tx.commit()
            .await
            .map_err(|e| db_error("commit user identity", e))?;

        Ok(identity)
    }
}
