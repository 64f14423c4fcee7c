use super::INotificationTransport;
use crate::config::WebhookSettings;
use anyhow::Context;
use medication_reminders_domain::NotificationMessage;
use serde::Serialize;

const WEBHOOK_KEY_HEADER: &str = "medication-reminders-webhook-key";

/// Posts notifications as json to an external delivery service
pub struct WebhookNotificationTransport {
    client: reqwest::Client,
    url: String,
    key: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookPayload<'a> {
    to: &'a str,
    recipient_name: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
}

impl WebhookNotificationTransport {
    pub fn new(settings: &WebhookSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: settings.url.clone(),
            key: settings.key.clone(),
        }
    }
}

#[async_trait::async_trait]
impl INotificationTransport for WebhookNotificationTransport {
    async fn send(&self, message: &NotificationMessage) -> anyhow::Result<()> {
        let payload = WebhookPayload {
            to: &message.to,
            recipient_name: &message.recipient_name,
            subject: &message.subject,
            html_body: &message.html_body,
            text_body: &message.text_body,
        };

        let mut req = self.client.post(&self.url).json(&payload);
        if let Some(key) = &self.key {
            req = req.header(WEBHOOK_KEY_HEADER, key);
        }

        req.send()
            .await
            .context("Unable to reach notification webhook")?
            .error_for_status()
            .context("Notification webhook rejected the notification")?;
        Ok(())
    }
}
