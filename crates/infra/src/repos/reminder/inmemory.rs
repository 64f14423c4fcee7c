use super::IReminderRepo;
use crate::repos::shared::inmemory_repo::*;
use chrono::{DateTime, Utc};
use medication_reminders_domain::{Reminder, TimeOfDay, ID};

pub struct InMemoryReminderRepo {
    reminders: std::sync::Mutex<Vec<Reminder>>,
}

impl InMemoryReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: std::sync::Mutex::new(vec![]),
        }
    }
}

impl Default for InMemoryReminderRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IReminderRepo for InMemoryReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        insert(reminder, &self.reminders);
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> anyhow::Result<Option<Reminder>> {
        Ok(find(reminder_id, &self.reminders))
    }

    async fn find_by_time(&self, time: &TimeOfDay) -> anyhow::Result<Vec<Reminder>> {
        Ok(find_by(&self.reminders, |r| r.time == *time))
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Reminder>> {
        let mut reminders = find_all(&self.reminders);
        reminders.sort_by_key(|r| r.time);
        Ok(reminders)
    }

    async fn set_last_notified_at(
        &self,
        reminder_id: &ID,
        notified_at: &DateTime<Utc>,
    ) -> anyhow::Result<()> {
        if update(reminder_id, &self.reminders, |r| {
            r.last_notified_at = Some(*notified_at)
        }) {
            Ok(())
        } else {
            Err(anyhow::anyhow!("Reminder with id: {} not found", reminder_id))
        }
    }
}
