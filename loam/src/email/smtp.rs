//! SMTP backend using lettre

use async_trait::async_trait;
use lettre::{
    message::{header, Mailbox},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{Email, EmailError, EmailSender};
use crate::config::SmtpSettings;

/// SMTP email backend
pub struct SmtpBackend {
    settings: SmtpSettings,
}

impl SmtpBackend {
    /// Create a backend from SMTP settings.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::Config`] if the host is missing.
    pub fn new(settings: SmtpSettings) -> Result<Self, EmailError> {
        if settings.host.is_empty() {
            return Err(EmailError::Config("email.smtp.host is not set".to_string()));
        }
        Ok(Self { settings })
    }

    fn build_message(email: &Email) -> Result<Message, EmailError> {
        email.validate()?;

        let from_addr = email.from.as_ref().ok_or(EmailError::NoSender)?;
        let from: Mailbox = from_addr
            .parse()
            .map_err(|_| EmailError::InvalidAddress(from_addr.clone()))?;

        let mut builder = Message::builder().from(from);

        for to_addr in &email.to {
            let to: Mailbox = to_addr
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to_addr.clone()))?;
            builder = builder.to(to);
        }

        if let Some(reply_to_addr) = &email.reply_to {
            let reply_to: Mailbox = reply_to_addr
                .parse()
                .map_err(|_| EmailError::InvalidAddress(reply_to_addr.clone()))?;
            builder = builder.reply_to(reply_to);
        }

        let subject = email.subject.as_ref().ok_or(EmailError::NoSubject)?;
        builder = builder.subject(subject);

        let text = email.text.as_ref().ok_or(EmailError::NoContent)?;
        builder
            .header(header::ContentType::TEXT_PLAIN)
            .body(text.clone())
            .map_err(|e| EmailError::Smtp(e.to_string()))
    }

    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let credentials = Credentials::new(
            self.settings.username.clone(),
            self.settings.password.clone(),
        );

        let mut transport = if self.settings.use_tls {
            let tls_parameters = TlsParameters::new(self.settings.host.clone())
                .map_err(|e| EmailError::Smtp(format!("TLS parameters error: {e}")))?;

            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.settings.host)
                .map_err(|e| EmailError::Smtp(e.to_string()))?
                .credentials(credentials)
                .tls(Tls::Required(tls_parameters))
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.settings.host)
                .credentials(credentials)
        };

        transport = transport.port(self.settings.port);

        Ok(transport.build())
    }
}

#[async_trait]
impl EmailSender for SmtpBackend {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        let message = Self::build_message(&email)?;
        let transport = self.create_transport()?;

        transport
            .send(message)
            .await
            .map_err(|e| EmailError::Smtp(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SmtpSettings {
        SmtpSettings {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "user@example.com".to_string(),
            password: "password123".to_string(),
            use_tls: true,
        }
    }

    #[test]
    fn backend_requires_a_host() {
        assert!(SmtpBackend::new(SmtpSettings::default()).is_err());
        assert!(SmtpBackend::new(settings()).is_ok());
    }

    #[test]
    fn builds_a_simple_message() {
        let email = Email::new()
            .to("recipient@example.com")
            .from("sender@example.com")
            .reply_to("visitor@example.com")
            .subject("Test Email")
            .text("This is a test email");
        assert!(SmtpBackend::build_message(&email).is_ok());
    }

    #[test]
    fn rejects_unparsable_addresses() {
        let email = Email::new()
            .to("not an address")
            .from("sender@example.com")
            .subject("Test")
            .text("body");
        assert!(matches!(
            SmtpBackend::build_message(&email),
            Err(EmailError::InvalidAddress(_))
        ));
    }
}
