use crate::error::ApiError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use medication_reminders_api_structs::dtos::{ProfileStatusDTO, ReminderStatusDTO};
use medication_reminders_api_structs::inspect_reminders::APIResponse;
use medication_reminders_domain::{
    is_already_notified_today, local_date, target_time_of_day, TimeOfDay,
};
use medication_reminders_infra::{ISys, ReminderContext};
use tracing::error;

pub async fn inspect_reminders_controller(
    ctx: web::Data<ReminderContext>,
) -> Result<HttpResponse, ApiError> {
    let usecase = InspectRemindersUseCase {
        now: ctx.sys.get_datetime(),
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(res))
        .map_err(ApiError::from)
}

/// Read only view of what the dispatcher sees at `now`: the time it would
/// match, every reminder with its delivery state and which owners can be
/// reached.
#[derive(Debug)]
pub struct InspectRemindersUseCase {
    pub now: DateTime<Utc>,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

impl From<UseCaseError> for ApiError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for InspectRemindersUseCase {
    type Response = APIResponse;

    type Error = UseCaseError;

    const NAME: &'static str = "InspectReminders";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        let tz = ctx.config.timezone;
        let target = target_time_of_day(&self.now, ctx.config.lead_minutes, &tz);
        let today = local_date(&self.now, &tz);

        let reminders = ctx
            .repos
            .reminders
            .find_all()
            .await
            .map_err(|e| {
                error!("Unable to fetch reminders: {:?}", e);
                UseCaseError::StorageError
            })?;
        let profiles = ctx
            .repos
            .profiles
            .find_all()
            .await
            .map_err(|e| {
                error!("Unable to fetch profiles: {:?}", e);
                UseCaseError::StorageError
            })?;

        let reminders = reminders
            .into_iter()
            .map(|reminder| {
                let due_now = reminder.time == target;
                let notified_today =
                    is_already_notified_today(reminder.last_notified_at.as_ref(), &today, &tz);
                ReminderStatusDTO::new(reminder, due_now, notified_today)
            })
            .collect();

        Ok(APIResponse {
            now: self.now,
            timezone: tz.name().to_string(),
            current_time: TimeOfDay::of(&self.now, &tz),
            target_time: target,
            lead_minutes: ctx.config.lead_minutes,
            reminders,
            profiles: profiles.into_iter().map(ProfileStatusDTO::new).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use medication_reminders_domain::{Profile, Reminder, ID};
    use medication_reminders_infra::{IProfileRepo, IReminderRepo};

    #[actix_web::main]
    #[test]
    async fn it_reports_due_and_notified_reminders() {
        let mut ctx = ReminderContext::create_inmemory();
        ctx.config.timezone = chrono_tz::UTC;
        ctx.config.lead_minutes = 20;

        let mut profile = Profile::new(ID::new());
        profile.full_name = Some("Ada".into());
        profile.email = Some("ada@example.com".into());
        ctx.repos.profiles.insert(&profile).await.unwrap();
        let mut no_address = Profile::new(ID::new());
        no_address.email = Some("  ".into());
        ctx.repos.profiles.insert(&no_address).await.unwrap();

        let now = Utc.with_ymd_and_hms(2024, 3, 10, 7, 40, 0).unwrap();
        let due = Reminder::new(profile.id.clone(), "Metformin".into(), "08:00".parse().unwrap());
        let mut notified = Reminder::new(profile.id.clone(), "Aspirin".into(), "06:00".parse().unwrap());
        notified.last_notified_at = Some(Utc.with_ymd_and_hms(2024, 3, 10, 5, 40, 0).unwrap());
        ctx.repos.reminders.insert(&due).await.unwrap();
        ctx.repos.reminders.insert(&notified).await.unwrap();

        let res = execute(InspectRemindersUseCase { now }, &ctx)
            .await
            .expect("To inspect reminders");

        assert_eq!(res.timezone, "UTC");
        assert_eq!(res.current_time.to_string(), "07:40");
        assert_eq!(res.target_time.to_string(), "08:00");
        assert_eq!(res.reminders.len(), 2);
        // Ordered by time
        assert_eq!(res.reminders[0].id, notified.id);
        assert!(!res.reminders[0].due_now);
        assert!(res.reminders[0].notified_today);
        assert_eq!(res.reminders[1].id, due.id);
        assert!(res.reminders[1].due_now);
        assert!(!res.reminders[1].notified_today);

        assert_eq!(res.profiles.len(), 2);
        let reachable = res.profiles.iter().find(|p| p.id == profile.id).unwrap();
        assert!(reachable.has_address);
        let unreachable = res.profiles.iter().find(|p| p.id == no_address.id).unwrap();
        assert!(!unreachable.has_address);
    }

    struct UnreachableProfileRepo;

    #[async_trait::async_trait]
    impl IProfileRepo for UnreachableProfileRepo {
        async fn insert(&self, _profile: &Profile) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("Connection refused"))
        }

        async fn find(&self, _user_id: &ID) -> anyhow::Result<Option<Profile>> {
            Err(anyhow::anyhow!("Connection refused"))
        }

        async fn find_all(&self) -> anyhow::Result<Vec<Profile>> {
            Err(anyhow::anyhow!("Connection refused"))
        }
    }

    #[actix_web::main]
    #[test]
    async fn it_fails_when_storage_is_unreachable() {
        let mut ctx = ReminderContext::create_inmemory();
        ctx.repos.profiles = std::sync::Arc::new(UnreachableProfileRepo);
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 7, 40, 0).unwrap();

        let res = execute(InspectRemindersUseCase { now }, &ctx).await;

        assert!(matches!(res, Err(UseCaseError::StorageError)));
    }
}
