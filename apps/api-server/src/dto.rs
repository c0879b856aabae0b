//! # Wire Types
//!
//! Request and response shapes for the JSON API.
//!
//! ## Money at the Boundary
//! Clients speak decimal rupees (`f64`); everything past this module is
//! integer paise. `Money::from_rupees` rounds to 2 decimal places on the
//! way in; `Money::rupees` formats on the way out. Floats exist ONLY here.
//!
//! Request bodies use `#[serde(deny_unknown_fields)]`: a misspelled field
//! is a 400, not a silently-ignored key.

use serde::{Deserialize, Serialize};

use invoice_core::money::Money;
use invoice_core::types::{GstRate, Invoice, LineItem, LineItemInput, User, UserProfile};
use invoice_core::ValidationError;

// =============================================================================
// Invoice Requests
// =============================================================================

/// One line item as submitted by a client.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineItemDto {
    pub item_name: String,
    /// Unit price in rupees.
    pub price: f64,
    pub quantity: i64,
    /// Flat discount in rupees. Optional; defaults to zero.
    #[serde(default)]
    pub discount: f64,
    /// GST slab percentage: 0, 5, 12, 18, or 28.
    pub gst_rate: u8,
    /// Client-computed subtotal. Accepted for wire compatibility, then
    /// discarded: the pricing engine recomputes it.
    #[serde(default)]
    pub subtotal: Option<f64>,
}

impl TryFrom<LineItemDto> for LineItemInput {
    type Error = ValidationError;

    fn try_from(dto: LineItemDto) -> Result<Self, Self::Error> {
        let gst_rate =
            GstRate::try_from(dto.gst_rate).map_err(|_| ValidationError::NotAllowed {
                field: "gst_rate".to_string(),
                allowed: GstRate::ALL.iter().map(|r| r.percent().to_string()).collect(),
            })?;

        Ok(LineItemInput {
            item_name: dto.item_name,
            price: Money::from_rupees(dto.price),
            quantity: dto.quantity,
            discount: Money::from_rupees(dto.discount),
            gst_rate,
        })
    }
}

/// Converts a submitted item list, failing on the first bad item.
pub fn into_item_inputs(items: Vec<LineItemDto>) -> Result<Vec<LineItemInput>, ValidationError> {
    items.into_iter().map(LineItemInput::try_from).collect()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateInvoiceRequest {
    pub customer_name: String,
    pub items: Vec<LineItemDto>,
    /// Client-computed total. Accepted for wire compatibility, then
    /// discarded: the store recomputes the total from the items.
    #[serde(default)]
    pub total: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateInvoiceRequest {
    pub id: String,
    pub customer_name: String,
    pub items: Vec<LineItemDto>,
    /// Accepted and discarded, as on create.
    #[serde(default)]
    pub total: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteInvoiceRequest {
    pub id: String,
}

// =============================================================================
// Invoice Responses
// =============================================================================

/// One line item as returned to clients, amounts in rupees.
#[derive(Debug, Serialize)]
pub struct LineItemView {
    pub item_name: String,
    pub price: f64,
    pub quantity: i64,
    pub discount: f64,
    pub gst_rate: i64,
    pub subtotal: f64,
}

impl From<LineItem> for LineItemView {
    fn from(item: LineItem) -> Self {
        LineItemView {
            item_name: item.item_name,
            price: Money::from_paise(item.price_paise).rupees(),
            quantity: item.quantity,
            discount: Money::from_paise(item.discount_paise).rupees(),
            gst_rate: item.gst_rate,
            subtotal: Money::from_paise(item.subtotal_paise).rupees(),
        }
    }
}

/// An invoice as returned to clients.
#[derive(Debug, Serialize)]
pub struct InvoiceView {
    pub id: String,
    pub customer_name: String,
    pub total: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub items: Vec<LineItemView>,
}

impl From<Invoice> for InvoiceView {
    fn from(invoice: Invoice) -> Self {
        InvoiceView {
            id: invoice.id,
            customer_name: invoice.customer_name,
            total: Money::from_paise(invoice.total_paise).rupees(),
            created_at: invoice.created_at,
            items: invoice.items.into_iter().map(LineItemView::from).collect(),
        }
    }
}

// =============================================================================
// Auth Requests
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// `username` accepts either the username or the email address.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    #[serde(alias = "newPassword")]
    pub new_password: String,
}

/// Partial profile update: absent fields keep their stored values.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub shop_name: Option<String>,
    pub shop_address: Option<String>,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
    pub logo: Option<String>,
    pub signature: Option<String>,
}

impl From<UpdateProfileRequest> for UserProfile {
    fn from(req: UpdateProfileRequest) -> Self {
        UserProfile {
            shop_name: req.shop_name,
            shop_address: req.shop_address,
            phone: req.phone,
            tax_id: req.tax_id,
            logo: req.logo,
            signature: req.signature,
        }
    }
}

// =============================================================================
// Auth Responses
// =============================================================================

/// Response for the `check` action. Never a 401: an anonymous caller gets
/// `authenticated: false` with the other fields absent.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
}

/// Extracts the editable profile subset from a stored user.
pub fn profile_of(user: &User) -> UserProfile {
    UserProfile {
        shop_name: user.shop_name.clone(),
        shop_address: user.shop_address.clone(),
        phone: user.phone.clone(),
        tax_id: user.tax_id.clone(),
        logo: user.logo.clone(),
        signature: user.signature.clone(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_item_dto_converts_to_paise() {
        let dto = LineItemDto {
            item_name: "Notebook".to_string(),
            price: 100.0,
            quantity: 2,
            discount: 20.0,
            gst_rate: 18,
            subtotal: None,
        };
        let input = LineItemInput::try_from(dto).unwrap();
        assert_eq!(input.price.paise(), 10_000);
        assert_eq!(input.discount.paise(), 2_000);
        assert_eq!(input.gst_rate, GstRate::Eighteen);
    }

    #[test]
    fn test_unsupported_gst_rate_is_rejected() {
        let dto = LineItemDto {
            item_name: "Notebook".to_string(),
            price: 100.0,
            quantity: 1,
            discount: 0.0,
            gst_rate: 7,
            subtotal: None,
        };
        assert!(LineItemInput::try_from(dto).is_err());
    }

    #[test]
    fn test_discount_defaults_to_zero() {
        let dto: LineItemDto = serde_json::from_value(serde_json::json!({
            "item_name": "Pen", "price": 10.5, "quantity": 3, "gst_rate": 5
        }))
        .unwrap();
        assert_eq!(dto.discount, 0.0);
    }

    #[test]
    fn test_client_supplied_subtotal_is_accepted_and_ignored() {
        let dto: LineItemDto = serde_json::from_value(serde_json::json!({
            "item_name": "Notebook", "price": 100.0, "quantity": 2,
            "discount": 20.0, "gst_rate": 18, "subtotal": 999999.99
        }))
        .unwrap();
        let input = LineItemInput::try_from(dto).unwrap();
        // Nothing downstream carries the client's figure
        assert_eq!(input.price.paise(), 10_000);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<CreateInvoiceRequest, _> = serde_json::from_value(serde_json::json!({
            "customer_name": "Asha",
            "items": [],
            "ownerId": "u2"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_check_response_omits_absent_fields() {
        let anon = CheckResponse {
            authenticated: false,
            username: None,
            profile: None,
        };
        let json = serde_json::to_string(&anon).unwrap();
        assert_eq!(json, r#"{"authenticated":false}"#);
    }
}
