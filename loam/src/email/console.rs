//! Console backend for development
//!
//! Logs messages instead of delivering them.

use async_trait::async_trait;
use tracing::info;

use super::{Email, EmailError, EmailSender};

/// Development backend that logs emails instead of sending them
#[derive(Debug, Clone, Default)]
pub struct ConsoleBackend;

impl ConsoleBackend {
    /// Create a console backend
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailSender for ConsoleBackend {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        email.validate()?;

        let from = email.from.as_deref().unwrap_or_default();
        let subject = email.subject.as_deref().unwrap_or_default();

        info!(
            from = %from,
            to = ?email.to,
            reply_to = ?email.reply_to,
            subject = %subject,
            body = %email.text.as_deref().unwrap_or_default(),
            "console email"
        );

        Ok(())
    }
}
