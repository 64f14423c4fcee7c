use super::IReminderRepo;
use chrono::{DateTime, Utc};
use medication_reminders_domain::{InvalidTimeOfDayError, Reminder, TimeOfDay, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::TryFrom;
use tracing::warn;

pub struct PostgresReminderRepo {
    pool: PgPool,
}

impl PostgresReminderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReminderRaw {
    reminder_uid: Uuid,
    user_uid: Uuid,
    medicine_name: String,
    dosage: Option<String>,
    frequency: Option<String>,
    time: String,
    last_notified_at: Option<DateTime<Utc>>,
}

impl TryFrom<ReminderRaw> for Reminder {
    type Error = InvalidTimeOfDayError;

    fn try_from(raw: ReminderRaw) -> Result<Self, Self::Error> {
        Ok(Reminder {
            id: raw.reminder_uid.into(),
            user_id: raw.user_uid.into(),
            medicine_name: raw.medicine_name,
            dosage: raw.dosage,
            frequency: raw.frequency,
            time: raw.time.parse()?,
            last_notified_at: raw.last_notified_at,
        })
    }
}

/// Rows with a schedule that can not be interpreted are skipped, they can
/// never be matched by the dispatcher anyway.
fn into_reminders(rows: Vec<ReminderRaw>) -> Vec<Reminder> {
    rows.into_iter()
        .filter_map(|row| {
            let reminder_uid = row.reminder_uid;
            match Reminder::try_from(row) {
                Ok(reminder) => Some(reminder),
                Err(e) => {
                    warn!("Skipping reminder: {} with invalid schedule: {}", reminder_uid, e);
                    None
                }
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl IReminderRepo for PostgresReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reminders
            (reminder_uid, user_uid, medicine_name, dosage, frequency, time, last_notified_at)
            VALUES($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(reminder.id.inner_ref())
        .bind(reminder.user_id.inner_ref())
        .bind(&reminder.medicine_name)
        .bind(&reminder.dosage)
        .bind(&reminder.frequency)
        .bind(reminder.time.to_string())
        .bind(reminder.last_notified_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> anyhow::Result<Option<Reminder>> {
        let row = sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders AS r
            WHERE r.reminder_uid = $1
            "#,
        )
        .bind(reminder_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(|row| into_reminders(vec![row]).pop()))
    }

    async fn find_by_time(&self, time: &TimeOfDay) -> anyhow::Result<Vec<Reminder>> {
        let rows = sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders AS r
            WHERE r.time = $1
            "#,
        )
        .bind(time.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(into_reminders(rows))
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Reminder>> {
        let rows = sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders AS r
            ORDER BY r.time
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(into_reminders(rows))
    }

    async fn set_last_notified_at(
        &self,
        reminder_id: &ID,
        notified_at: &DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let res = sqlx::query(
            r#"
            UPDATE reminders
            SET last_notified_at = $2
            WHERE reminder_uid = $1
            "#,
        )
        .bind(reminder_id.inner_ref())
        .bind(notified_at)
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 {
            return Err(anyhow::anyhow!("Reminder with id: {} not found", reminder_id));
        }
        Ok(())
    }
}
