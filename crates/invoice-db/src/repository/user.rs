//! # User Repository
//!
//! Database operations for registered accounts.
//!
//! ## Uniqueness
//! Username and email are both UNIQUE at the schema level. Registration
//! relies on those constraints rather than a check-then-insert race:
//! a violation surfaces as [`DbError::UniqueViolation`] naming the field.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use invoice_core::types::{User, UserProfile};

use crate::error::{DbError, DbResult};

// =============================================================================
// Row Type
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    email: String,
    password_hash: String,
    shop_name: Option<String>,
    shop_address: Option<String>,
    phone: Option<String>,
    tax_id: Option<String>,
    logo: Option<String>,
    signature: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            shop_name: row.shop_name,
            shop_address: row.shop_address,
            phone: row.phone,
            tax_id: row.tax_id,
            logo: row.logo,
            signature: row.signature,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_USER: &str = r#"
    SELECT id, username, email, password_hash,
           shop_name, shop_address, phone, tax_id, logo, signature,
           created_at, updated_at
    FROM users
"#;

// =============================================================================
// Repository
// =============================================================================

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new user repository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new user.
    ///
    /// ## Errors
    /// [`DbError::UniqueViolation`] with `field` of `username` or `email`
    /// when the name or address is already registered.
    pub async fn insert(&self, user: &User) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO users
                (id, username, email, password_hash,
                 shop_name, shop_address, phone, tax_id, logo, signature,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.shop_name)
        .bind(&user.shop_address)
        .bind(&user.phone)
        .bind(&user.tax_id)
        .bind(&user.logo)
        .bind(&user.signature)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!(user_id = %user.id, username = %user.username, "User registered");
                Ok(())
            }
            // Rewrite "users.username" into the bare field name for callers
            Err(e) => match DbError::from(e) {
                DbError::UniqueViolation { field } if field.contains("username") => {
                    Err(DbError::UniqueViolation {
                        field: "username".to_string(),
                    })
                }
                DbError::UniqueViolation { field } if field.contains("email") => {
                    Err(DbError::UniqueViolation {
                        field: "email".to_string(),
                    })
                }
                other => Err(other),
            },
        }
    }

    /// Finds a user by ID.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    /// Finds a user by login identifier: matches username OR email.
    pub async fn find_by_identifier(&self, identifier: &str) -> DbResult<Option<User>> {
        debug!("Looking up user by identifier");

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "{SELECT_USER} WHERE username = ?1 OR email = ?1"
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Finds a user by email (the password-reset key).
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    /// Replaces a user's password hash, keyed by email.
    pub async fn update_password_by_email(&self, email: &str, password_hash: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = ?, updated_at = ? WHERE email = ?",
        )
        .bind(password_hash)
        .bind(Utc::now())
        .bind(email)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", email));
        }

        info!("Password updated");
        Ok(())
    }

    /// Partially updates a user's profile fields.
    ///
    /// Only fields present in `profile` change; `None` leaves the stored
    /// value alone. Returns the user as stored after the update.
    pub async fn update_profile(&self, user_id: &str, profile: &UserProfile) -> DbResult<User> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                shop_name    = COALESCE(?, shop_name),
                shop_address = COALESCE(?, shop_address),
                phone        = COALESCE(?, phone),
                tax_id       = COALESCE(?, tax_id),
                logo         = COALESCE(?, logo),
                signature    = COALESCE(?, signature),
                updated_at   = ?
            WHERE id = ?
            "#,
        )
        .bind(&profile.shop_name)
        .bind(&profile.shop_address)
        .bind(&profile.phone)
        .bind(&profile.tax_id)
        .bind(&profile.logo)
        .bind(&profile.signature)
        .bind(Utc::now())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", user_id));
        }

        self.find_by_id(user_id)
            .await?
            .ok_or_else(|| DbError::not_found("User", user_id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_user(username: &str, email: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            shop_name: None,
            shop_address: None,
            phone: None,
            tax_id: None,
            logo: None,
            signature: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_by_identifier() {
        let db = test_db().await;
        let user = new_user("asha", "asha@shop.test");
        db.users().insert(&user).await.unwrap();

        let by_name = db.users().find_by_identifier("asha").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);

        let by_email = db
            .users()
            .find_by_identifier("asha@shop.test")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);

        assert!(db.users().find_by_identifier("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email() {
        let db = test_db().await;
        db.users().insert(&new_user("asha", "asha@shop.test")).await.unwrap();

        let err = db
            .users()
            .insert(&new_user("asha", "other@shop.test"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field } if field == "username"));

        let err = db
            .users()
            .insert(&new_user("other", "asha@shop.test"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field } if field == "email"));
    }

    #[tokio::test]
    async fn test_update_password_by_email() {
        let db = test_db().await;
        db.users().insert(&new_user("asha", "asha@shop.test")).await.unwrap();

        db.users()
            .update_password_by_email("asha@shop.test", "$argon2id$new")
            .await
            .unwrap();

        let user = db.users().find_by_email("asha@shop.test").await.unwrap().unwrap();
        assert_eq!(user.password_hash, "$argon2id$new");

        let err = db
            .users()
            .update_password_by_email("nobody@shop.test", "$x")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_profile_is_partial() {
        let db = test_db().await;
        let user = new_user("asha", "asha@shop.test");
        db.users().insert(&user).await.unwrap();

        let updated = db
            .users()
            .update_profile(
                &user.id,
                &UserProfile {
                    shop_name: Some("Asha Traders".to_string()),
                    phone: Some("98765 43210".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.shop_name.as_deref(), Some("Asha Traders"));

        // A second partial update leaves earlier fields in place
        let updated = db
            .users()
            .update_profile(
                &user.id,
                &UserProfile {
                    tax_id: Some("27AAPFU0939F1ZV".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.shop_name.as_deref(), Some("Asha Traders"));
        assert_eq!(updated.phone.as_deref(), Some("98765 43210"));
        assert_eq!(updated.tax_id.as_deref(), Some("27AAPFU0939F1ZV"));
    }
}
