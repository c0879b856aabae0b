//! # invoice-db: Database Layer for Micro Invoice POS
//!
//! SQLite persistence for invoices, users, sessions, and reset codes.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 HTTP API (apps/api-server)                              │
//! └─────────────────────────────┬───────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────▼───────────────────────────────────────────┐
//! │                  ★ invoice-db (THIS CRATE) ★                            │
//! │                                                                         │
//! │   ┌───────────┐  ┌─────────────┐  ┌──────────────────────────────────┐ │
//! │   │   pool    │  │ migrations  │  │          repository              │ │
//! │   │ Database  │  │  embedded   │  │  invoices / users / sessions /   │ │
//! │   │ DbConfig  │  │  SQL files  │  │         reset_codes              │ │
//! │   └───────────┘  └─────────────┘  └──────────────────────────────────┘ │
//! │                                                                         │
//! │   SQLite • WAL mode • foreign keys on • transactional invoice writes   │
//! └─────────────────────────────┬───────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────▼───────────────────────────────────────────┐
//! │               invoice-core (pure types + pricing)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use invoice_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./invoices.db")).await?;
//! let invoices = db.invoices().list_for_owner(&user_id).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{InvoiceRepository, ResetCodeRepository, SessionRepository, UserRepository};
