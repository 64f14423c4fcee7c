use chrono::{DateTime, Utc};
use medication_reminders_domain::{Profile, Reminder, TimeOfDay, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderStatusDTO {
    pub id: ID,
    pub user_id: ID,
    pub medicine_name: String,
    pub time: TimeOfDay,
    pub last_notified_at: Option<DateTime<Utc>>,
    /// Whether the reminder is matched by the current poll cycle
    pub due_now: bool,
    pub notified_today: bool,
}

impl ReminderStatusDTO {
    pub fn new(reminder: Reminder, due_now: bool, notified_today: bool) -> Self {
        Self {
            id: reminder.id,
            user_id: reminder.user_id,
            medicine_name: reminder.medicine_name,
            time: reminder.time,
            last_notified_at: reminder.last_notified_at,
            due_now,
            notified_today,
        }
    }
}

/// Never exposes the address itself
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStatusDTO {
    pub id: ID,
    pub display_name: Option<String>,
    pub has_address: bool,
}

impl ProfileStatusDTO {
    pub fn new(profile: Profile) -> Self {
        let has_address = profile.contact().is_some();
        Self {
            id: profile.id,
            display_name: profile.full_name,
            has_address,
        }
    }
}
