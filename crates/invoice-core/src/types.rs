//! # Domain Types
//!
//! Core domain types used throughout Micro Invoice POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │     Invoice     │   │    LineItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  username       │   │  user_id (FK)   │   │  invoice_id(FK) │       │
//! │  │  email          │   │  customer_name  │   │  price_paise    │       │
//! │  │  password_hash  │   │  total_paise    │   │  subtotal_paise │       │
//! │  │  profile fields │   │  items[]        │   │  gst_rate       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     GstRate     │   │     Session     │   │ PasswordReset   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │ Code            │       │
//! │  │  0|5|12|18|28 % │   │  token (opaque) │   │  email (PK)     │       │
//! │  │                 │   │  last_regen     │   │  code, expiry   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership Rules
//! - An invoice belongs to exactly one user (exclusive ownership)
//! - Line items belong to exactly one invoice and die with it
//! - Sessions and reset codes are server-side state, never exposed raw

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// GST Rate
// =============================================================================

/// GST rate restricted to the slabs the system accepts.
///
/// ## Why an enum, not a number?
/// The rate set is closed: 0%, 5%, 12%, 18%, 28%. Parsing into an enum at
/// the boundary means no downstream code ever has to handle a 7% rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GstRate {
    Zero,
    Five,
    Twelve,
    Eighteen,
    TwentyEight,
}

impl GstRate {
    /// All accepted slabs, in ascending order.
    pub const ALL: [GstRate; 5] = [
        GstRate::Zero,
        GstRate::Five,
        GstRate::Twelve,
        GstRate::Eighteen,
        GstRate::TwentyEight,
    ];

    /// Returns the rate as a whole percentage.
    #[inline]
    pub const fn percent(&self) -> u8 {
        match self {
            GstRate::Zero => 0,
            GstRate::Five => 5,
            GstRate::Twelve => 12,
            GstRate::Eighteen => 18,
            GstRate::TwentyEight => 28,
        }
    }

    /// Returns the rate in basis points (for integer tax math).
    #[inline]
    pub const fn bps(&self) -> i64 {
        self.percent() as i64 * 100
    }
}

impl Default for GstRate {
    fn default() -> Self {
        GstRate::Zero
    }
}

impl TryFrom<u8> for GstRate {
    type Error = String;

    fn try_from(pct: u8) -> Result<Self, Self::Error> {
        match pct {
            0 => Ok(GstRate::Zero),
            5 => Ok(GstRate::Five),
            12 => Ok(GstRate::Twelve),
            18 => Ok(GstRate::Eighteen),
            28 => Ok(GstRate::TwentyEight),
            other => Err(format!("unsupported GST rate: {other}%")),
        }
    }
}

impl From<GstRate> for u8 {
    fn from(rate: GstRate) -> u8 {
        rate.percent()
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered account. Created at registration, mutated by profile updates
/// and password resets, never hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Unique login name.
    pub username: String,

    /// Unique email address (also the key for password resets).
    pub email: String,

    /// Argon2 salted hash. The plaintext is never stored or logged.
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Shop name printed on rendered invoices.
    pub shop_name: Option<String>,

    /// Shop address printed on rendered invoices.
    pub shop_address: Option<String>,

    /// Contact phone number.
    pub phone: Option<String>,

    /// GSTIN / tax identifier.
    pub tax_id: Option<String>,

    /// Logo image (data URL or storage key; rendering is external).
    pub logo: Option<String>,

    /// Signature image (data URL or storage key; rendering is external).
    pub signature: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The profile subset of a [`User`] that the owner may edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub shop_name: Option<String>,
    pub shop_address: Option<String>,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
    pub logo: Option<String>,
    pub signature: Option<String>,
}

// =============================================================================
// Invoice
// =============================================================================

/// An invoice with its full line-item set.
///
/// Invariant: `total_paise == items.iter().map(|i| i.subtotal_paise).sum()`
/// after every successful write. The store enforces this by recomputing the
/// total server-side; client-supplied totals are discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    /// Owning user (exclusive ownership).
    pub user_id: String,
    pub customer_name: String,
    /// Derived total, stored redundantly for fast listing.
    pub total_paise: i64,
    /// Server-assigned, immutable.
    pub created_at: DateTime<Utc>,
    /// Owned exclusively by this invoice, in entry order.
    pub items: Vec<LineItem>,
}

impl Invoice {
    /// Returns the stored total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_paise(self.total_paise)
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One priced entry within an invoice.
///
/// Items have no identity outside their invoice: an invoice update replaces
/// the entire set, so item ids are not stable across edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub invoice_id: String,
    pub item_name: String,
    /// Unit price in paise (>= 0).
    pub price_paise: i64,
    /// Quantity (integer >= 0).
    pub quantity: i64,
    /// Flat discount in paise (>= 0), applied before GST.
    pub discount_paise: i64,
    /// GST slab as a whole percentage (0, 5, 12, 18, 28).
    pub gst_rate: i64,
    /// Derived: `(price*qty - discount) * (1 + gst/100)`. May be negative
    /// when the discount exceeds `price*qty`.
    pub subtotal_paise: i64,
    /// Zero-based position preserving entry order.
    pub position: i64,
}

impl LineItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_paise(self.price_paise)
    }

    /// Returns the computed subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_paise(self.subtotal_paise)
    }
}

/// Client-supplied line item, before the pricing engine derives its subtotal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemInput {
    pub item_name: String,
    pub price: Money,
    pub quantity: i64,
    pub discount: Money,
    pub gst_rate: GstRate,
}

// =============================================================================
// Session
// =============================================================================

/// Server-side session state keyed by an opaque cookie token.
///
/// Lifecycle: created on login (always with a fresh token, never reusing a
/// prior identifier), destroyed on logout or idle timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque token held by the client in an HttpOnly cookie.
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    /// Idle-timeout anchor: sessions older than the configured threshold
    /// since this instant are treated as absent.
    pub last_regenerated_at: DateTime<Utc>,
}

// =============================================================================
// Password Reset Code
// =============================================================================

/// A pending password-reset code. At most one live code per email; a new
/// request replaces the prior one. Consumed (deleted) on successful reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetCode {
    pub email: String,
    /// 6-digit numeric code (kept as a string to preserve leading zeros).
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetCode {
    /// Checks whether the code is still live at the given instant.
    #[inline]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_gst_rate_slabs() {
        assert_eq!(GstRate::try_from(18).unwrap(), GstRate::Eighteen);
        assert_eq!(GstRate::Eighteen.percent(), 18);
        assert_eq!(GstRate::Eighteen.bps(), 1800);
        assert!(GstRate::try_from(7).is_err());
    }

    #[test]
    fn test_gst_rate_serde_as_number() {
        let rate: GstRate = serde_json::from_str("28").unwrap();
        assert_eq!(rate, GstRate::TwentyEight);
        assert_eq!(serde_json::to_string(&GstRate::Five).unwrap(), "5");
        assert!(serde_json::from_str::<GstRate>("7").is_err());
    }

    #[test]
    fn test_reset_code_validity_window() {
        let now = Utc::now();
        let code = PasswordResetCode {
            email: "a@b.test".to_string(),
            code: "123456".to_string(),
            expires_at: now + Duration::minutes(15),
            created_at: now,
        };
        assert!(code.is_valid_at(now));
        assert!(code.is_valid_at(now + Duration::minutes(14)));
        assert!(!code.is_valid_at(now + Duration::minutes(16)));
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let user = User {
            id: "u1".to_string(),
            username: "asha".to_string(),
            email: "asha@shop.test".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            shop_name: None,
            shop_address: None,
            phone: None,
            tax_id: None,
            logo: None,
            signature: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password_hash"));
    }
}
