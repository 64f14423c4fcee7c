mod profile;
mod reminder;
mod shared;

pub use profile::{IProfileRepo, InMemoryProfileRepo, PostgresProfileRepo};
pub use reminder::{IReminderRepo, InMemoryReminderRepo, PostgresReminderRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub reminders: Arc<dyn IReminderRepo>,
    pub profiles: Arc<dyn IProfileRepo>,
}

impl Repos {
    /// Connections are established lazily so that an unreachable database
    /// only fails the poll cycles that need it instead of the whole process.
    pub fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_lazy(connection_string)?;
        info!("Postgres connection pool created");

        Ok(Self {
            reminders: Arc::new(PostgresReminderRepo::new(pool.clone())),
            profiles: Arc::new(PostgresProfileRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            reminders: Arc::new(InMemoryReminderRepo::new()),
            profiles: Arc::new(InMemoryProfileRepo::new()),
        }
    }
}
