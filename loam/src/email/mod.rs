//! Outbound email
//!
//! A small message builder plus a pluggable [`EmailSender`] backend: SMTP
//! via lettre for deployments, a console backend for development. Used by
//! the contact form.

pub mod console;
pub mod smtp;

pub use console::ConsoleBackend;
pub use smtp::SmtpBackend;

use async_trait::async_trait;
use thiserror::Error;

/// Email errors
#[derive(Debug, Error)]
pub enum EmailError {
    /// Backend configuration problem
    #[error("email configuration error: {0}")]
    Config(String),

    /// An address could not be parsed
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// Message has no sender
    #[error("email has no sender")]
    NoSender,

    /// Message has no recipients
    #[error("email has no recipients")]
    NoRecipients,

    /// Message has no subject
    #[error("email has no subject")]
    NoSubject,

    /// Message has no body
    #[error("email has no content")]
    NoContent,

    /// SMTP transport failure
    #[error("smtp error: {0}")]
    Smtp(String),
}

/// An outbound message
#[derive(Debug, Clone, Default)]
pub struct Email {
    /// Recipient addresses
    pub to: Vec<String>,
    /// Sender address
    pub from: Option<String>,
    /// Reply-To address
    pub reply_to: Option<String>,
    /// Subject line
    pub subject: Option<String>,
    /// Plain-text body
    pub text: Option<String>,
}

impl Email {
    /// Start an empty message
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a recipient
    #[must_use]
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    /// Set the sender
    #[must_use]
    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.from = Some(address.into());
        self
    }

    /// Set the Reply-To address
    #[must_use]
    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }

    /// Set the subject line
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the plain-text body
    #[must_use]
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text = Some(body.into());
        self
    }

    /// Check the message is complete enough to send.
    ///
    /// # Errors
    ///
    /// Returns the first missing-part error.
    pub fn validate(&self) -> Result<(), EmailError> {
        if self.to.is_empty() {
            return Err(EmailError::NoRecipients);
        }
        if self.from.is_none() {
            return Err(EmailError::NoSender);
        }
        if self.subject.is_none() {
            return Err(EmailError::NoSubject);
        }
        if self.text.is_none() {
            return Err(EmailError::NoContent);
        }
        Ok(())
    }
}

/// Delivery backend
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send a message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message is incomplete or delivery fails.
    async fn send(&self, email: Email) -> Result<(), EmailError>;
}
