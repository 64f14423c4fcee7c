mod inmemory;
mod smtp;
mod webhook;

use crate::config::{ConfigError, TransportSettings};
pub use inmemory::InMemoryNotificationTransport;
use medication_reminders_domain::NotificationMessage;
pub use smtp::SmtpNotificationTransport;
use std::sync::Arc;
pub use webhook::WebhookNotificationTransport;

/// Delivers composed notifications to their recipient.
///
/// `Ok` means the transport accepted the message. Any error is treated as
/// "not delivered" and the reminder stays eligible for the next poll cycle.
#[async_trait::async_trait]
pub trait INotificationTransport: Send + Sync {
    async fn send(&self, message: &NotificationMessage) -> anyhow::Result<()>;
}

pub fn create_notification_transport(
    settings: &TransportSettings,
    sender_name: &str,
) -> Result<Arc<dyn INotificationTransport>, ConfigError> {
    let transport: Arc<dyn INotificationTransport> = match settings {
        TransportSettings::Smtp(smtp) => Arc::new(SmtpNotificationTransport::new(smtp, sender_name)?),
        TransportSettings::Webhook(webhook) => Arc::new(WebhookNotificationTransport::new(webhook)),
    };
    Ok(transport)
}
