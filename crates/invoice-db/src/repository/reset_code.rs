//! # Password Reset Code Repository
//!
//! Storage for pending 6-digit password-reset codes.
//!
//! The `email` primary key means a new request for the same address
//! replaces the prior code rather than accumulating alongside it, so at
//! most one code is live per email at any time.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use invoice_core::types::PasswordResetCode;

use crate::error::DbResult;

#[derive(Debug, sqlx::FromRow)]
struct ResetCodeRow {
    email: String,
    code: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<ResetCodeRow> for PasswordResetCode {
    fn from(row: ResetCodeRow) -> Self {
        PasswordResetCode {
            email: row.email,
            code: row.code,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

/// Repository for password-reset codes.
#[derive(Debug, Clone)]
pub struct ResetCodeRepository {
    pool: SqlitePool,
}

impl ResetCodeRepository {
    /// Creates a new reset-code repository.
    pub fn new(pool: SqlitePool) -> Self {
        ResetCodeRepository { pool }
    }

    /// Stores a code, replacing any prior code for the same email.
    pub async fn put(&self, code: &PasswordResetCode) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO password_reset_codes (email, code, expires_at, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&code.email)
        .bind(&code.code)
        .bind(code.expires_at)
        .bind(code.created_at)
        .execute(&self.pool)
        .await?;

        debug!("Reset code stored");
        Ok(())
    }

    /// Fetches the pending code for an email, expired or not.
    /// Validity against the clock is the caller's check.
    pub async fn find(&self, email: &str) -> DbResult<Option<PasswordResetCode>> {
        let row = sqlx::query_as::<_, ResetCodeRow>(
            r#"
            SELECT email, code, expires_at, created_at
            FROM password_reset_codes
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PasswordResetCode::from))
    }

    /// Consumes (deletes) the code for an email. Single use: once a reset
    /// succeeds the code must not work a second time.
    pub async fn delete(&self, email: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM password_reset_codes WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Sweeps codes that expired before `now`.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM password_reset_codes WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn code(email: &str, digits: &str, ttl_minutes: i64) -> PasswordResetCode {
        let now = Utc::now();
        PasswordResetCode {
            email: email.to_string(),
            code: digits.to_string(),
            expires_at: now + Duration::minutes(ttl_minutes),
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_put_replaces_prior_code() {
        let db = test_db().await;
        db.reset_codes().put(&code("a@b.test", "111111", 15)).await.unwrap();
        db.reset_codes().put(&code("a@b.test", "222222", 15)).await.unwrap();

        let found = db.reset_codes().find("a@b.test").await.unwrap().unwrap();
        assert_eq!(found.code, "222222");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM password_reset_codes")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_delete_consumes_code() {
        let db = test_db().await;
        db.reset_codes().put(&code("a@b.test", "111111", 15)).await.unwrap();
        db.reset_codes().delete("a@b.test").await.unwrap();
        assert!(db.reset_codes().find("a@b.test").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_expired_keeps_live_codes() {
        let db = test_db().await;
        db.reset_codes().put(&code("old@b.test", "111111", -5)).await.unwrap();
        db.reset_codes().put(&code("new@b.test", "222222", 15)).await.unwrap();

        let purged = db.reset_codes().purge_expired(Utc::now()).await.unwrap();
        assert_eq!(purged, 1);
        assert!(db.reset_codes().find("old@b.test").await.unwrap().is_none());
        assert!(db.reset_codes().find("new@b.test").await.unwrap().is_some());
    }
}
