//! # invoice-core: Pure Business Logic for Micro Invoice POS
//!
//! This crate is the **heart** of Micro Invoice POS. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Micro Invoice POS Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (apps/api-server)                   │   │
//! │  │    ?action=read|create|update|delete|register|login|...         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ invoice-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │   │
//! │  │   │  Invoice  │  │   Money   │  │ subtotal  │  │   rules   │  │   │
//! │  │   │  LineItem │  │  GST math │  │   total   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  invoice-db (Database Layer)                    │   │
//! │  │             SQLite queries, migrations, repositories            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Invoice, LineItem, Session, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - The pricing engine: line subtotals and invoice totals
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paise (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use invoice_core::money::Money;
//! use invoice_core::pricing::line_subtotal;
//! use invoice_core::types::GstRate;
//!
//! // price 100.00, qty 2, discount 20.00, GST 18%
//! let subtotal = line_subtotal(
//!     Money::from_rupees(100.0),
//!     2,
//!     Money::from_rupees(20.0),
//!     GstRate::Eighteen,
//! );
//!
//! // (200.00 - 20.00) * 1.18 = 212.40
//! assert_eq!(subtotal.paise(), 21240);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use invoice_core::Money` instead of
// `use invoice_core::money::Money`

pub use error::ValidationError;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single invoice
///
/// ## Business Reason
/// Prevents runaway submissions and keeps the rendered invoice printable.
pub const MAX_INVOICE_ITEMS: usize = 100;

/// Maximum quantity of a single line item
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum price or discount of a single line item, in paise (₹10 billion)
///
/// ## Business Reason
/// Bounds the arithmetic domain: with quantity capped at 999 and invoices
/// at 100 items, every subtotal and total stays far inside i64 even at the
/// top GST slab, so the integer math cannot overflow.
pub const MAX_AMOUNT_PAISE: i64 = 1_000_000_000_000;
