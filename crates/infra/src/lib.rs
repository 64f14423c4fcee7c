mod config;
mod repos;
mod services;
mod system;

pub use config::{
    get_psql_connection_string, Config, ConfigError, ContextParams, SmtpSettings,
    TransportSettings, WebhookSettings,
};
pub use repos::{
    IProfileRepo, IReminderRepo, InMemoryProfileRepo, InMemoryReminderRepo, Repos,
};
pub use services::*;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::{ISys, RealSys};

#[derive(Clone)]
pub struct ReminderContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub transport: Arc<dyn INotificationTransport>,
}

impl ReminderContext {
    fn create(params: ContextParams) -> anyhow::Result<Self> {
        let config = Config::new();
        let repos = Repos::create_postgres(&params.postgres_connection_string)?;
        let transport = create_notification_transport(&params.transport, &config.sender_name)?;
        Ok(Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            transport,
        })
    }

    /// Context backed by inmemory repositories and an inmemory transport
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            transport: Arc::new(InMemoryNotificationTransport::new()),
        }
    }
}

/// Will setup the infrastructure context given the environment.
/// Fails if any required configuration is missing.
pub async fn setup_context() -> anyhow::Result<ReminderContext> {
    let params = ContextParams::from_env()?;
    ReminderContext::create(params)
}

pub async fn run_migration() -> anyhow::Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&get_psql_connection_string()?)
        .await?;

    sqlx::migrate!().run(&pool).await?;
    Ok(())
}
