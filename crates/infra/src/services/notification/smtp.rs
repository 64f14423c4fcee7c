use super::INotificationTransport;
use crate::config::{ConfigError, SmtpSettings};
use anyhow::Context;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use medication_reminders_domain::NotificationMessage;
use tracing::info;

/// Sends notifications as multipart html / plain text emails through an
/// authenticated STARTTLS relay
pub struct SmtpNotificationTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotificationTransport {
    pub fn new(settings: &SmtpSettings, sender_name: &str) -> Result<Self, ConfigError> {
        let from_address = settings
            .username
            .parse::<Address>()
            .map_err(|e| ConfigError::Invalid {
                key: "SMTP_USERNAME",
                reason: e.to_string(),
            })?;

        let creds = Credentials::new(settings.username.clone(), settings.password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| ConfigError::Invalid {
                key: "SMTP_HOST",
                reason: e.to_string(),
            })?
            .port(settings.port)
            .credentials(creds)
            .build();

        Ok(Self {
            mailer,
            from: Mailbox::new(Some(sender_name.to_string()), from_address),
        })
    }
}

#[async_trait::async_trait]
impl INotificationTransport for SmtpNotificationTransport {
    async fn send(&self, message: &NotificationMessage) -> anyhow::Result<()> {
        let to_address = message
            .to
            .parse::<Address>()
            .with_context(|| format!("Invalid recipient address: {}", message.to))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(Mailbox::new(Some(message.recipient_name.clone()), to_address))
            .subject(message.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                message.text_body.clone(),
                message.html_body.clone(),
            ))
            .context("Unable to build email")?;

        self.mailer.send(email).await.context("SMTP send failed")?;

        info!("Email sent to: {}", message.to);
        Ok(())
    }
}
