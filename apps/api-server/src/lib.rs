//! # Micro Invoice POS API Server
//!
//! HTTP JSON API over invoice-core (business rules) and invoice-db
//! (persistence). Exposed as a library so integration tests can build the
//! router around an in-memory database and drive it without a socket.

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod mailer;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use routes::build_router;
pub use state::AppState;
