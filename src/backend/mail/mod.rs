//! Outgoing Mail
//!
//! Sends account verification links over SMTP with `lettre`. Without SMTP
//! settings the mailer is disabled and the link is written to the log
//! instead, which is enough for local development.

use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender mailbox, e.g. `Brackets <noreply@example.com>`
    pub from: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Link the front end serves for redeeming a verification token
pub fn verification_link(app_origin: &str, token: &str) -> String {
    format!("{}/user-verification?{}", app_origin.trim_end_matches('/'), token)
}

#[derive(Clone)]
struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

#[derive(Clone, Default)]
pub struct Mailer {
    smtp: Option<SmtpMailer>,
}

impl Mailer {
    /// Mailer that only logs
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn from_config(config: Option<&SmtpConfig>) -> Result<Self, MailError> {
        let Some(config) = config else {
            tracing::warn!("SMTP not configured, verification links will only be logged");
            return Ok(Self::disabled());
        };

        let from: Mailbox = config.from.parse()?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(config.username.clone(), config.password.clone()))
            .build();

        Ok(Self {
            smtp: Some(SmtpMailer { transport, from }),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.smtp.is_some()
    }

    pub async fn send_verification(&self, username: &str, email: &str, link: &str) -> Result<(), MailError> {
        let Some(smtp) = &self.smtp else {
            tracing::info!("Verification link for {}: {}", username, link);
            return Ok(());
        };

        let to = Mailbox::new(Some(username.to_string()), email.parse()?);
        let message = Message::builder()
            .from(smtp.from.clone())
            .to(to)
            .subject("Confirm your account")
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "Hello {},\n\nconfirm your account by opening the following link:\n{}\n",
                username, link
            ))?;

        smtp.transport.send(message).await?;
        tracing::info!("Verification mail sent to {}", email);
        Ok(())
    }
}
