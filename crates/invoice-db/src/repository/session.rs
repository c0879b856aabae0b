//! # Session Repository
//!
//! Storage for server-side sessions keyed by opaque cookie tokens.
//!
//! The repository stores and retrieves rows; the idle-timeout policy
//! (how stale `last_regenerated_at` may be) lives in the server layer,
//! which also decides when to call [`SessionRepository::touch`].

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use invoice_core::types::Session;

use crate::error::DbResult;

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    token: String,
    user_id: String,
    created_at: DateTime<Utc>,
    last_regenerated_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            token: row.token,
            user_id: row.user_id,
            created_at: row.created_at,
            last_regenerated_at: row.last_regenerated_at,
        }
    }
}

/// Repository for session storage.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Creates a new session repository.
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Stores a new session.
    pub async fn insert(&self, session: &Session) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token, user_id, created_at, last_regenerated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&session.token)
        .bind(&session.user_id)
        .bind(session.created_at)
        .bind(session.last_regenerated_at)
        .execute(&self.pool)
        .await?;

        debug!(user_id = %session.user_id, "Session stored");
        Ok(())
    }

    /// Looks up a session by token. Expiry is the caller's concern.
    pub async fn find(&self, token: &str) -> DbResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT token, user_id, created_at, last_regenerated_at
            FROM sessions
            WHERE token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Session::from))
    }

    /// Refreshes the idle-timeout anchor for an active session.
    pub async fn touch(&self, token: &str, now: DateTime<Utc>) -> DbResult<()> {
        sqlx::query("UPDATE sessions SET last_regenerated_at = ? WHERE token = ?")
            .bind(now)
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Destroys a session. Deleting an unknown token is a no-op.
    pub async fn delete(&self, token: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Destroys every session belonging to a user (e.g. after a password
    /// reset).
    pub async fn delete_for_user(&self, user_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Sweeps sessions whose idle anchor is older than `cutoff`.
    pub async fn delete_idle_before(&self, cutoff: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE last_regenerated_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            debug!(swept = result.rows_affected(), "Idle sessions swept");
        }
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
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
            VALUES ('u1', 'asha', 'asha@shop.test', 'hash', ?, ?)
            "#,
        )
        .bind(Utc::now())
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();
        db
    }

    fn session(token: &str, anchored_at: DateTime<Utc>) -> Session {
        Session {
            token: token.to_string(),
            user_id: "u1".to_string(),
            created_at: anchored_at,
            last_regenerated_at: anchored_at,
        }
    }

    #[tokio::test]
    async fn test_insert_find_delete() {
        let db = test_db().await;
        let s = session("tok-1", Utc::now());

        db.sessions().insert(&s).await.unwrap();
        let found = db.sessions().find("tok-1").await.unwrap().unwrap();
        assert_eq!(found.user_id, "u1");

        db.sessions().delete("tok-1").await.unwrap();
        assert!(db.sessions().find("tok-1").await.unwrap().is_none());

        // Deleting again is a no-op
        db.sessions().delete("tok-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_touch_moves_idle_anchor() {
        let db = test_db().await;
        let old = Utc::now() - Duration::minutes(20);
        db.sessions().insert(&session("tok-1", old)).await.unwrap();

        let now = Utc::now();
        db.sessions().touch("tok-1", now).await.unwrap();

        let found = db.sessions().find("tok-1").await.unwrap().unwrap();
        assert!(found.last_regenerated_at > old);
    }

    #[tokio::test]
    async fn test_sweep_idle_sessions() {
        let db = test_db().await;
        let now = Utc::now();
        db.sessions()
            .insert(&session("stale", now - Duration::minutes(45)))
            .await
            .unwrap();
        db.sessions().insert(&session("fresh", now)).await.unwrap();

        let swept = db
            .sessions()
            .delete_idle_before(now - Duration::minutes(30))
            .await
            .unwrap();
        assert_eq!(swept, 1);
        assert!(db.sessions().find("stale").await.unwrap().is_none());
        assert!(db.sessions().find("fresh").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_for_user_clears_all() {
        let db = test_db().await;
        let now = Utc::now();
        db.sessions().insert(&session("a", now)).await.unwrap();
        db.sessions().insert(&session("b", now)).await.unwrap();

        let deleted = db.sessions().delete_for_user("u1").await.unwrap();
        assert_eq!(deleted, 2);
    }
}
