//! # Authentication Primitives
//!
//! Password hashing, session lifecycle, and reset-code generation.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Session Lifecycle                                │
//! │                                                                         │
//! │  login ──► issue()        fresh 32-byte random token, never reused      │
//! │                │                                                        │
//! │                ▼                                                        │
//! │  request ─► require()     token row loaded from the store               │
//! │                │          ├─ absent ──────────────► 401                 │
//! │                │          ├─ idle > timeout ──────► row destroyed, 401  │
//! │                │          └─ live ────────────────► anchor refreshed    │
//! │                ▼                                                        │
//! │  logout ──► logout()      row deleted, cookie cleared by the handler    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A well-formed cookie whose row has been destroyed behaves exactly like
//! no cookie at all.

use chrono::{Duration, Utc};
use rand::RngCore;
use tracing::{debug, info};

use invoice_core::types::Session;
use invoice_db::SessionRepository;

use crate::error::{ApiError, ApiResult};

// =============================================================================
// Password Hashing
// =============================================================================

/// Hash a password for storage.
pub fn hash_password(password: &str) -> ApiResult<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify a password against its stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Tokens and Codes
// =============================================================================

/// Generates a fresh opaque session token: 32 random bytes, hex-encoded.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Generates a 6-digit numeric reset code, leading zeros preserved.
pub fn generate_reset_code() -> String {
    let n = rand::thread_rng().next_u32() % 1_000_000;
    format!("{n:06}")
}

// =============================================================================
// Session Manager
// =============================================================================

/// DB-backed session manager.
///
/// Handed to handlers through `AppState`; holds no global state of its own.
#[derive(Clone)]
pub struct SessionManager {
    sessions: SessionRepository,
    idle_timeout: Duration,
}

impl SessionManager {
    /// Creates a session manager with the given idle timeout.
    pub fn new(sessions: SessionRepository, idle_timeout_secs: i64) -> Self {
        SessionManager {
            sessions,
            idle_timeout: Duration::seconds(idle_timeout_secs),
        }
    }

    /// Creates a session for a user with a fresh token.
    ///
    /// A new token is generated on every login; a prior session identifier
    /// is never re-activated, so a leaked pre-login cookie is worthless.
    pub async fn issue(&self, user_id: &str) -> ApiResult<Session> {
        let now = Utc::now();
        let session = Session {
            token: generate_token(),
            user_id: user_id.to_string(),
            created_at: now,
            last_regenerated_at: now,
        };

        self.sessions.insert(&session).await?;
        info!(user_id, "Session issued");
        Ok(session)
    }

    /// Resolves a cookie token into a live session, or fails with 401.
    ///
    /// An idle session (no activity within the timeout) is destroyed on
    /// sight; a live one has its idle anchor refreshed.
    pub async fn require(&self, token: Option<&str>) -> ApiResult<Session> {
        let token = token.ok_or_else(ApiError::unauthorized)?;

        let session = self
            .sessions
            .find(token)
            .await?
            .ok_or_else(ApiError::unauthorized)?;

        let now = Utc::now();
        if now - session.last_regenerated_at > self.idle_timeout {
            debug!(user_id = %session.user_id, "Session idle-expired");
            self.sessions.delete(token).await?;
            return Err(ApiError::unauthorized());
        }

        self.sessions.touch(token, now).await?;
        Ok(session)
    }

    /// Like [`require`](Self::require) but yields `None` instead of 401.
    pub async fn check(&self, token: Option<&str>) -> ApiResult<Option<Session>> {
        match self.require(token).await {
            Ok(session) => Ok(Some(session)),
            Err(ApiError::Unauthorized(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Destroys a session. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> ApiResult<()> {
        self.sessions.delete(token).await?;
        Ok(())
    }

    /// Destroys every session for a user (after a password reset).
    pub async fn logout_all(&self, user_id: &str) -> ApiResult<u64> {
        Ok(self.sessions.delete_for_user(user_id).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use invoice_db::{Database, DbConfig};

    async fn manager(idle_secs: i64) -> (Database, SessionManager) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();
        db.users()
            .insert(&invoice_core::types::User {
                id: "u1".to_string(),
                username: "asha".to_string(),
                email: "asha@shop.test".to_string(),
                password_hash: "hash".to_string(),
                shop_name: None,
                shop_address: None,
                phone: None,
                tax_id: None,
                logo: None,
                signature: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        let mgr = SessionManager::new(db.sessions(), idle_secs);
        (db, mgr)
    }

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong password", &hash));
        assert!(!verify_password("anything", "not-a-hash"));
    }

    #[test]
    fn test_reset_code_shape() {
        for _ in 0..50 {
            let code = generate_reset_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_issue_and_require() {
        let (_db, mgr) = manager(1800).await;

        let session = mgr.issue("u1").await.unwrap();
        let resolved = mgr.require(Some(&session.token)).await.unwrap();
        assert_eq!(resolved.user_id, "u1");

        assert!(matches!(
            mgr.require(None).await,
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            mgr.require(Some("bogus")).await,
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_fresh_token_each_login() {
        let (_db, mgr) = manager(1800).await;
        let a = mgr.issue("u1").await.unwrap();
        let b = mgr.issue("u1").await.unwrap();
        assert_ne!(a.token, b.token);
    }

    #[tokio::test]
    async fn test_idle_session_is_destroyed() {
        // Zero-second timeout: every session is already idle
        let (db, mgr) = manager(0).await;
        let session = mgr.issue("u1").await.unwrap();

        // A beat later the session is stale
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(matches!(
            mgr.require(Some(&session.token)).await,
            Err(ApiError::Unauthorized(_))
        ));

        // And the row itself is gone, not just rejected
        assert!(db.sessions().find(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_destroys_session() {
        let (_db, mgr) = manager(1800).await;
        let session = mgr.issue("u1").await.unwrap();
        mgr.logout(&session.token).await.unwrap();
        assert!(matches!(
            mgr.require(Some(&session.token)).await,
            Err(ApiError::Unauthorized(_))
        ));
    }
}
