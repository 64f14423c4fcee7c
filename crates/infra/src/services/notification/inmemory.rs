use super::INotificationTransport;
use medication_reminders_domain::NotificationMessage;
use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
    time::Duration,
};

/// Records notifications instead of delivering them. Delivery to specific
/// addresses can be made to fail or to stall.
pub struct InMemoryNotificationTransport {
    sent: Mutex<Vec<NotificationMessage>>,
    failing_addresses: Mutex<HashSet<String>>,
    delays: Mutex<HashMap<String, Duration>>,
}

impl InMemoryNotificationTransport {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(vec![]),
            failing_addresses: Mutex::new(HashSet::new()),
            delays: Mutex::new(HashMap::new()),
        }
    }

    /// Successfully delivered notifications in the order they were sent
    pub fn sent(&self) -> Vec<NotificationMessage> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn sent_to(&self, address: &str) -> usize {
        self.sent().iter().filter(|m| m.to == address).count()
    }

    pub fn fail_for(&self, address: &str) {
        self.failing_addresses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(address.to_string());
    }

    pub fn recover(&self, address: &str) {
        self.failing_addresses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(address);
    }

    pub fn delay_for(&self, address: &str, delay: Duration) {
        self.delays
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(address.to_string(), delay);
    }
}

impl Default for InMemoryNotificationTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl INotificationTransport for InMemoryNotificationTransport {
    async fn send(&self, message: &NotificationMessage) -> anyhow::Result<()> {
        let delay = self
            .delays
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&message.to)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .failing_addresses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&message.to);
        if failing {
            return Err(anyhow::anyhow!("Delivery to {} failed", message.to));
        }

        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.clone());
        Ok(())
    }
}
