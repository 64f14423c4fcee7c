use crate::{reminder::SendRemindersUseCase, shared::usecase::execute};
use actix_web::rt::task::JoinHandle;
use chrono::{DateTime, Utc};
use medication_reminders_infra::{ISys, ReminderContext};
use std::{sync::Arc, time::Duration};
use tokio::time::{interval, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Source of poll instants for the reminder dispatcher. Returns `None`
/// when there will be no more ticks.
#[async_trait::async_trait(?Send)]
pub trait PollTicker {
    async fn tick(&mut self) -> Option<DateTime<Utc>>;
}

/// Ticks every `period`, starting immediately. A cycle that takes longer
/// than `period` postpones the next tick instead of causing a burst of them.
pub struct IntervalTicker {
    interval: Interval,
    sys: Arc<dyn ISys>,
}

impl IntervalTicker {
    pub fn new(period: Duration, sys: Arc<dyn ISys>) -> Self {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval, sys }
    }
}

#[async_trait::async_trait(?Send)]
impl PollTicker for IntervalTicker {
    async fn tick(&mut self) -> Option<DateTime<Utc>> {
        self.interval.tick().await;
        Some(self.sys.get_datetime())
    }
}

/// Runs one dispatch cycle per tick until `shutdown` is cancelled or the
/// ticker is exhausted. Cycles never overlap and a cycle that has started
/// always runs to completion.
pub async fn run_reminder_dispatcher<T: PollTicker>(
    ctx: ReminderContext,
    mut ticker: T,
    shutdown: CancellationToken,
) {
    info!(
        "Reminder dispatcher started. Polling every {:?} with a {}m lead in {}",
        ctx.config.poll_interval,
        ctx.config.lead_minutes,
        ctx.config.timezone.name()
    );

    loop {
        let now = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            tick = ticker.tick() => match tick {
                Some(now) => now,
                None => break,
            },
        };

        // A failed cycle is already logged, the next tick simply tries again
        if let Ok(report) = execute(SendRemindersUseCase { now }, &ctx).await {
            if !report.outcomes.is_empty() {
                info!(
                    "Sent {} of {} reminders due at {}",
                    report.sent_count(),
                    report.outcomes.len(),
                    report.target
                );
            }
        }
    }

    info!("Reminder dispatcher stopped");
}

pub fn start_reminder_dispatcher(
    ctx: ReminderContext,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let ticker = IntervalTicker::new(ctx.config.poll_interval, ctx.sys.clone());
    actix_web::rt::spawn(run_reminder_dispatcher(ctx, ticker, shutdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use medication_reminders_domain::{Profile, Reminder, ID};
    use medication_reminders_infra::{IProfileRepo, IReminderRepo, InMemoryNotificationTransport};

    /// Yields the given instants and then either stops or never ticks again
    struct VecTicker {
        instants: Vec<DateTime<Utc>>,
        stall_when_empty: bool,
    }

    impl VecTicker {
        fn new(mut instants: Vec<DateTime<Utc>>, stall_when_empty: bool) -> Self {
            instants.reverse();
            Self {
                instants,
                stall_when_empty,
            }
        }
    }

    #[async_trait::async_trait(?Send)]
    impl PollTicker for VecTicker {
        async fn tick(&mut self) -> Option<DateTime<Utc>> {
            match self.instants.pop() {
                Some(now) => Some(now),
                None if self.stall_when_empty => futures::future::pending().await,
                None => None,
            }
        }
    }

    async fn setup() -> (ReminderContext, Arc<InMemoryNotificationTransport>) {
        let mut ctx = ReminderContext::create_inmemory();
        ctx.config.timezone = chrono_tz::UTC;
        ctx.config.lead_minutes = 20;
        ctx.config.delivery_timeout = Duration::from_secs(5);
        let transport = Arc::new(InMemoryNotificationTransport::new());
        ctx.transport = transport.clone();

        let mut profile = Profile::new(ID::new());
        profile.email = Some("ada@example.com".into());
        ctx.repos.profiles.insert(&profile).await.unwrap();
        let reminder = Reminder::new(profile.id, "Metformin".into(), "08:00".parse().unwrap());
        ctx.repos.reminders.insert(&reminder).await.unwrap();

        (ctx, transport)
    }

    #[actix_web::main]
    #[test]
    async fn it_runs_a_cycle_per_tick() {
        let (ctx, transport) = setup().await;
        let ticker = VecTicker::new(
            vec![
                Utc.with_ymd_and_hms(2024, 3, 10, 7, 40, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 3, 10, 7, 40, 30).unwrap(),
                Utc.with_ymd_and_hms(2024, 3, 11, 7, 40, 0).unwrap(),
            ],
            false,
        );

        run_reminder_dispatcher(ctx, ticker, CancellationToken::new()).await;

        // Second tick is deduplicated, third is on the next day
        assert_eq!(transport.sent().len(), 2);
    }

    #[actix_web::main]
    #[test]
    async fn it_does_not_poll_after_shutdown() {
        let (ctx, transport) = setup().await;
        let ticker = VecTicker::new(
            vec![Utc.with_ymd_and_hms(2024, 3, 10, 7, 40, 0).unwrap()],
            true,
        );
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        run_reminder_dispatcher(ctx, ticker, shutdown).await;

        assert!(transport.sent().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn it_finishes_in_flight_cycle_on_shutdown() {
        let (ctx, transport) = setup().await;
        transport.delay_for("ada@example.com", Duration::from_millis(200));
        let ticker = VecTicker::new(
            vec![Utc.with_ymd_and_hms(2024, 3, 10, 7, 40, 0).unwrap()],
            true,
        );
        let shutdown = CancellationToken::new();

        let handle = actix_web::rt::spawn(run_reminder_dispatcher(
            ctx,
            ticker,
            shutdown.clone(),
        ));
        actix_web::rt::time::sleep(Duration::from_millis(50)).await;
        shutdown.cancel();
        handle.await.expect("Dispatcher to stop");

        assert_eq!(transport.sent().len(), 1);
    }

    #[actix_web::main]
    #[test]
    async fn interval_ticker_fires_immediately() {
        let ctx = ReminderContext::create_inmemory();
        let mut ticker = IntervalTicker::new(Duration::from_secs(3600), ctx.sys.clone());

        let first = tokio::time::timeout(Duration::from_secs(1), ticker.tick()).await;

        assert!(matches!(first, Ok(Some(_))));
    }
}
