use crate::{
    shared::entity::{Entity, ID},
    TimeOfDay,
};
use chrono::{DateTime, Utc};

/// A `Reminder` represents one scheduled medication intake that the owning
/// user should be notified about every day at `time`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub id: ID,
    /// The user that owns this `Reminder` and should receive the notification
    pub user_id: ID,
    pub medicine_name: String,
    pub dosage: Option<String>,
    /// Informational only, e.g. "Twice daily"
    pub frequency: Option<String>,
    /// Local wall-clock time of day the medication should be taken at
    pub time: TimeOfDay,
    /// Timestamp of the most recent successfully delivered notification.
    /// Only ever written by the reminder dispatcher after a confirmed send.
    pub last_notified_at: Option<DateTime<Utc>>,
}

impl Reminder {
    pub fn new(user_id: ID, medicine_name: String, time: TimeOfDay) -> Self {
        Self {
            id: Default::default(),
            user_id,
            medicine_name,
            dosage: None,
            frequency: None,
            time,
            last_notified_at: None,
        }
    }
}

impl Entity for Reminder {
    fn id(&self) -> &ID {
        &self.id
    }
}
