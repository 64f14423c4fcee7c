use crate::shared::usecase::UseCase;
use chrono::{DateTime, NaiveDate, Utc};
use futures::future::join_all;
use medication_reminders_domain::{
    is_already_notified_today, local_date, target_time_of_day, Contact, NotificationMessage,
    Reminder, TimeOfDay, ID,
};
use medication_reminders_infra::ReminderContext;
use tracing::{error, info, info_span, warn};
use tracing_futures::Instrument;

/// Sends a notification for every `Reminder` that is due at `now` and has not
/// been notified about yet today. This is one poll cycle of the reminder
/// dispatcher.
///
/// A reminder is due when it is scheduled at exactly `now` + lead time. Each
/// matched reminder is processed independently, a failure for one of them
/// never affects the others. Delivery is at-least-once: a reminder is only
/// marked as notified after the transport confirmed the send, so every
/// failure before that point is retried by the next cycle.
#[derive(Debug)]
pub struct SendRemindersUseCase {
    pub now: DateTime<Utc>,
}

/// Where the pipeline of a single matched `Reminder` ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    AlreadyNotifiedToday,
    /// The owner has no profile
    ContactNotFound,
    /// The profile could not be read
    ContactLookupFailed,
    NoDeliverableAddress,
    DeliveryFailed,
    DeliveryTimedOut,
    /// Delivered and recorded as notified
    Sent,
    /// Delivered, but storing that failed. The reminder may be sent again.
    SentButNotRecorded,
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent | Self::SentButNotRecorded)
    }
}

#[derive(Debug)]
pub struct CycleReport {
    pub now: DateTime<Utc>,
    pub target: TimeOfDay,
    pub outcomes: Vec<(ID, DispatchOutcome)>,
}

impl CycleReport {
    pub fn outcome(&self, reminder_id: &ID) -> Option<&DispatchOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == reminder_id)
            .map(|(_, outcome)| outcome)
    }

    pub fn sent_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_sent()).count()
    }
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendRemindersUseCase {
    type Response = CycleReport;

    type Error = UseCaseError;

    const NAME: &'static str = "SendReminders";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        let now = self.now;
        let tz = ctx.config.timezone;
        let target = target_time_of_day(&now, ctx.config.lead_minutes, &tz);
        let today = local_date(&now, &tz);

        info!(
            "Polling at {}. Looking for reminders at {} ({}m lead)",
            TimeOfDay::of(&now, &tz),
            target,
            ctx.config.lead_minutes
        );

        let reminders = ctx
            .repos
            .reminders
            .find_by_time(&target)
            .await
            .map_err(|e| {
                error!("Unable to fetch reminders scheduled at {}: {:?}", target, e);
                UseCaseError::StorageError
            })?;

        let outcomes = join_all(
            reminders
                .into_iter()
                .map(|reminder| dispatch_reminder(reminder, now, today, ctx)),
        )
        .await;

        Ok(CycleReport {
            now,
            target,
            outcomes,
        })
    }
}

async fn dispatch_reminder(
    reminder: Reminder,
    now: DateTime<Utc>,
    today: NaiveDate,
    ctx: &ReminderContext,
) -> (ID, DispatchOutcome) {
    let span = info_span!("dispatch_reminder", reminder_id = %reminder.id);
    let outcome = process_reminder(&reminder, now, today, ctx)
        .instrument(span)
        .await;
    (reminder.id, outcome)
}

async fn process_reminder(
    reminder: &Reminder,
    now: DateTime<Utc>,
    today: NaiveDate,
    ctx: &ReminderContext,
) -> DispatchOutcome {
    if is_already_notified_today(
        reminder.last_notified_at.as_ref(),
        &today,
        &ctx.config.timezone,
    ) {
        info!("Already notified today for reminder {}", reminder.id);
        return DispatchOutcome::AlreadyNotifiedToday;
    }

    // The write back is not covered by the timeout, once the notification
    // went out it should be recorded no matter how long that takes
    match tokio::time::timeout(ctx.config.delivery_timeout, deliver(reminder, ctx)).await {
        Ok(Ok(())) => record_delivery(reminder, now, ctx).await,
        Ok(Err(outcome)) => outcome,
        Err(_) => {
            warn!(
                "Delivery of reminder {} timed out after {:?}",
                reminder.id, ctx.config.delivery_timeout
            );
            DispatchOutcome::DeliveryTimedOut
        }
    }
}

async fn resolve_contact(user_id: &ID, ctx: &ReminderContext) -> Result<Contact, DispatchOutcome> {
    let profile = match ctx.repos.profiles.find(user_id).await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            warn!("Could not find profile for user {}", user_id);
            return Err(DispatchOutcome::ContactNotFound);
        }
        Err(e) => {
            warn!("Unable to look up profile for user {}: {:?}", user_id, e);
            return Err(DispatchOutcome::ContactLookupFailed);
        }
    };

    profile.contact().ok_or_else(|| {
        warn!("No deliverable address found for user {}", user_id);
        DispatchOutcome::NoDeliverableAddress
    })
}

async fn deliver(reminder: &Reminder, ctx: &ReminderContext) -> Result<(), DispatchOutcome> {
    let contact = resolve_contact(&reminder.user_id, ctx).await?;
    let message =
        NotificationMessage::medication_reminder(reminder, &contact, &ctx.config.sender_name);

    if let Err(e) = ctx.transport.send(&message).await {
        error!(
            "Error sending reminder {} to {}: {:?}",
            reminder.id, contact.address, e
        );
        return Err(DispatchOutcome::DeliveryFailed);
    }

    info!(
        "Sent reminder for {} to {}",
        reminder.medicine_name, contact.address
    );
    Ok(())
}

/// Stores that `reminder` was notified at `now`, retrying with exponential
/// backoff. Giving up leaves the reminder eligible again, which means a
/// duplicate notification if it is matched once more today.
async fn record_delivery(
    reminder: &Reminder,
    now: DateTime<Utc>,
    ctx: &ReminderContext,
) -> DispatchOutcome {
    let attempts = ctx.config.write_back_attempts.max(1);
    let mut backoff = ctx.config.write_back_backoff;

    for attempt in 1..=attempts {
        match ctx
            .repos
            .reminders
            .set_last_notified_at(&reminder.id, &now)
            .await
        {
            Ok(()) => return DispatchOutcome::Sent,
            Err(e) if attempt < attempts => {
                warn!(
                    "Failed to update state of reminder {} (attempt {}/{}): {:?}",
                    reminder.id, attempt, attempts, e
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            Err(e) => {
                error!(
                    "Reminder {} was sent but its state could not be stored after {} attempts, it may be sent again: {:?}",
                    reminder.id, attempts, e
                );
            }
        }
    }

    DispatchOutcome::SentButNotRecorded
}
