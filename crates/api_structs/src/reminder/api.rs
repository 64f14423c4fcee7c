use crate::dtos::{ProfileStatusDTO, ReminderStatusDTO};
use chrono::{DateTime, Utc};
use medication_reminders_domain::TimeOfDay;
use serde::{Deserialize, Serialize};

pub mod inspect_reminders {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub now: DateTime<Utc>,
        pub timezone: String,
        pub current_time: TimeOfDay,
        pub target_time: TimeOfDay,
        pub lead_minutes: i64,
        pub reminders: Vec<ReminderStatusDTO>,
        pub profiles: Vec<ProfileStatusDTO>,
    }
}
