mod notification;
mod profile;
mod reminder;
mod shared;
mod time_of_day;

pub use notification::NotificationMessage;
pub use profile::{Contact, Profile};
pub use reminder::Reminder;
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use time_of_day::{
    is_already_notified_today, local_date, target_time_of_day, InvalidTimeOfDayError, TimeOfDay,
};
