//! # Mailer Seam
//!
//! Mail transport is an external collaborator. This module defines the one
//! seam the reset flow needs: hand a 6-digit code to *something* that can
//! reach the user. The default implementation only logs, which is enough
//! for development and for tests; a real transport plugs in behind the
//! same trait without touching the handlers.

use thiserror::Error;
use tracing::info;

/// Failure to hand a message off to the transport.
#[derive(Debug, Error)]
#[error("mail delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Outbound mail seam. Implementations must not block the async runtime
/// for long; slow transports should queue internally.
pub trait Mailer: Send + Sync {
    /// Delivers a password-reset code to the given address.
    fn send_reset_code(&self, email: &str, code: &str) -> Result<(), DeliveryError>;
}

/// Development mailer: writes the code to the log instead of sending it.
#[derive(Debug, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send_reset_code(&self, email: &str, code: &str) -> Result<(), DeliveryError> {
        // The code itself is short-lived and single-use; logging it is the
        // whole point of this transport
        info!(email, code, "Password reset code (log transport)");
        Ok(())
    }
}
