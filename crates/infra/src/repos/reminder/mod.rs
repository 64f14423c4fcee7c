mod inmemory;
mod postgres;

use chrono::{DateTime, Utc};
pub use inmemory::InMemoryReminderRepo;
use medication_reminders_domain::{Reminder, TimeOfDay, ID};
pub use postgres::PostgresReminderRepo;

#[async_trait::async_trait]
pub trait IReminderRepo: Send + Sync {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()>;
    async fn find(&self, reminder_id: &ID) -> anyhow::Result<Option<Reminder>>;
    /// Reminders scheduled at exactly `time`
    async fn find_by_time(&self, time: &TimeOfDay) -> anyhow::Result<Vec<Reminder>>;
    /// All reminders ordered by their scheduled time
    async fn find_all(&self) -> anyhow::Result<Vec<Reminder>>;
    /// Fails if the `Reminder` does not exist (anymore)
    async fn set_last_notified_at(
        &self,
        reminder_id: &ID,
        notified_at: &DateTime<Utc>,
    ) -> anyhow::Result<()>;
}
