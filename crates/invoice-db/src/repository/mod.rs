//! # Repository Layer
//!
//! Repository pattern implementations for database access.
//!
//! ## Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Repository Pattern                                 │
//! │                                                                         │
//! │  Handler code                     Repository                  SQLite    │
//! │  ────────────                     ──────────                  ──────    │
//! │  db.invoices()                                                          │
//! │     .create(...)  ──────────────▶ validate input                        │
//! │                                   recompute money                       │
//! │                                   BEGIN..COMMIT   ──────────▶ rows      │
//! │                   ◀────────────── domain type     ◀────────── rows      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each repository owns a pool handle and returns `invoice-core` domain
//! types, never raw rows. Internal `*Row` structs bridge the SQL schema to
//! the domain types so the schema can evolve without touching callers.

pub mod invoice;
pub mod reset_code;
pub mod session;
pub mod user;

pub use invoice::InvoiceRepository;
pub use reset_code::ResetCodeRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
