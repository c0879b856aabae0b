//! Shared application state.
//!
//! Everything a handler needs arrives through this struct: the database
//! handle, the session manager, the mailer seam, and the resolved config.
//! Nothing is global; tests build their own state around an in-memory
//! database and whatever mailer they want to observe.

use std::sync::Arc;

use invoice_db::Database;

use crate::auth::SessionManager;
use crate::config::ServerConfig;
use crate::mailer::Mailer;

/// Shared application state, cloned per request by axum.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: SessionManager,
    pub mailer: Arc<dyn Mailer>,
    pub config: ServerConfig,
}

impl AppState {
    /// Wires up the state from its collaborators.
    pub fn new(db: Database, config: ServerConfig, mailer: Arc<dyn Mailer>) -> Self {
        let sessions = SessionManager::new(db.sessions(), config.session_idle_timeout_secs);
        AppState {
            db,
            sessions,
            mailer,
            config,
        }
    }
}
