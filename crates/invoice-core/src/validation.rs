//! # Validation Module
//!
//! Input validation utilities for Micro Invoice POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request schema (serde)                                       │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Unknown/missing fields rejected                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints (username, email)                              │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::types::LineItemInput;
use crate::{MAX_AMOUNT_PAISE, MAX_INVOICE_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// String Validators
// =============================================================================

/// Validates a customer name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    validate_name("customer_name", name)
}

/// Validates a line item name.
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    validate_name("item_name", name)
}

fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a username.
///
/// ## Rules
/// - 3 to 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use invoice_core::validation::validate_username;
///
/// assert!(validate_username("asha_traders").is_ok());
/// assert!(validate_username("ab").is_err());
/// assert!(validate_username("has space").is_err());
/// ```
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if username.len() < 3 {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: 3,
        });
    }

    if username.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 50,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// ## Rules
/// Deliberately shallow: one `@` with non-empty local and domain parts, a
/// dot in the domain, no whitespace, at most 254 characters. Deliverability
/// is proven by the reset-code flow, not by parsing.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 254 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 254,
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must be a valid email address".to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.contains('@') {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a password.
///
/// ## Rules
/// - 8 to 128 characters. Only length is checked here; the slow salted
///   hash happens in the server layer.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.len() < 8 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 8,
        });
    }

    if password.len() > 128 {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: 128,
        });
    }

    Ok(())
}

/// Validates a password-reset code: exactly 6 ASCII digits.
pub fn validate_reset_code(code: &str) -> ValidationResult<()> {
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must be a 6-digit number".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be non-negative (zero is inside the formula's domain)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 || qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in paise.
///
/// ## Rules
/// - Must be non-negative (zero is allowed for free items)
/// - Must not exceed MAX_AMOUNT_PAISE; unbounded amounts would let
///   `price * quantity` escape i64
pub fn validate_price_paise(paise: i64) -> ValidationResult<()> {
    validate_amount("price", paise)
}

/// Validates a flat discount in paise.
///
/// ## Rules
/// - Must be non-negative. It MAY exceed `price * quantity`: the resulting
///   negative subtotal is legitimate and flows into the total as-is.
/// - Must not exceed MAX_AMOUNT_PAISE
pub fn validate_discount_paise(paise: i64) -> ValidationResult<()> {
    validate_amount("discount", paise)
}

fn validate_amount(field: &str, paise: i64) -> ValidationResult<()> {
    if paise < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    if paise > MAX_AMOUNT_PAISE {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_PAISE,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates a full line-item set before it reaches the store.
///
/// ## Rules
/// - Must not be empty: a zero-item invoice trivially breaks the total
///   invariant at 0, so it is rejected rather than silently recorded
/// - Must not exceed MAX_INVOICE_ITEMS (100)
/// - Every item must pass name/price/quantity/discount validation
pub fn validate_items(items: &[LineItemInput]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::EmptyItems);
    }

    if items.len() > MAX_INVOICE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_INVOICE_ITEMS as i64,
        });
    }

    for item in items {
        validate_item_name(&item.item_name)?;
        validate_price_paise(item.price.paise())?;
        validate_quantity(item.quantity)?;
        validate_discount_paise(item.discount.paise())?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
