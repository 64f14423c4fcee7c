use chrono_tz::Tz;
use std::{fmt::Display, str::FromStr, time::Duration};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} env var to be present.")]
    Missing(&'static str),
    #[error("{key} env var is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// How often the reminder dispatcher polls for due reminders
    pub poll_interval: Duration,
    /// How many minutes ahead of the scheduled time a reminder is sent
    pub lead_minutes: i64,
    /// Timezone the `HH:MM` reminder schedules are interpreted in. Also decides
    /// what "today" means when checking if a reminder was already sent.
    pub timezone: Tz,
    /// Upper bound for resolving the contact and delivering one notification.
    /// Keeps a single slow delivery from stalling the rest of the poll cycle.
    pub delivery_timeout: Duration,
    /// How many times storing the delivery state of a sent reminder is attempted
    /// before giving up. Giving up means the reminder may be sent twice.
    pub write_back_attempts: u32,
    /// Delay before the first write back retry, doubled for every retry after that
    pub write_back_backoff: Duration,
    /// Name shown as the sender of the notifications
    pub sender_name: String,
}

impl Config {
    pub fn new() -> Self {
        let poll_interval_secs = env_or("REMINDER_POLL_INTERVAL_SECS", 60_u64);
        let delivery_timeout_secs = env_or("REMINDER_DELIVERY_TIMEOUT_SECS", 30_u64);
        let write_back_backoff_millis = env_or("REMINDER_WRITE_BACK_BACKOFF_MILLIS", 250_u64);

        Self {
            port: env_or("PORT", 5000),
            poll_interval: Duration::from_secs(poll_interval_secs.max(1)),
            lead_minutes: lead_minutes(),
            timezone: env_or("REMINDER_TIMEZONE", Tz::UTC),
            delivery_timeout: Duration::from_secs(delivery_timeout_secs.max(1)),
            write_back_attempts: env_or("REMINDER_WRITE_BACK_ATTEMPTS", 3_u32).max(1),
            write_back_backoff: Duration::from_millis(write_back_backoff_millis),
            sender_name: std::env::var("EMAIL_SENDER_NAME")
                .ok()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| "Health Monitor".into()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads an optional env var, falling back to `default` if it is absent or
/// cannot be parsed.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
{
    let value = match std::env::var(key) {
        Ok(value) => value,
        Err(_) => return default,
    };
    match value.trim().parse::<T>() {
        Ok(parsed) => parsed,
        Err(_) => {
            warn!(
                "The given {}: {} is not valid, falling back to the default: {}.",
                key, value, default
            );
            default
        }
    }
}

const DEFAULT_LEAD_MINUTES: i64 = 20;

/// Lead times must fall within a single day
fn lead_minutes() -> i64 {
    let lead_minutes = env_or("REMINDER_LEAD_MINUTES", DEFAULT_LEAD_MINUTES);
    if (0..24 * 60).contains(&lead_minutes) {
        lead_minutes
    } else {
        warn!(
            "The given REMINDER_LEAD_MINUTES: {} is out of range (0 - 1439), falling back to the default: {}.",
            lead_minutes, DEFAULT_LEAD_MINUTES
        );
        DEFAULT_LEAD_MINUTES
    }
}

fn required_env(key: &'static str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key)),
    }
}

#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct WebhookSettings {
    pub url: String,
    /// Sent in the `medication-reminders-webhook-key` header so that the
    /// receiver can verify the request
    pub key: Option<String>,
}

#[derive(Debug, Clone)]
pub enum TransportSettings {
    Smtp(SmtpSettings),
    Webhook(WebhookSettings),
}

impl TransportSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        const TRANSPORT: &str = "NOTIFICATION_TRANSPORT";

        let transport = std::env::var(TRANSPORT).unwrap_or_else(|_| "smtp".into());
        match transport.trim().to_lowercase().as_str() {
            "smtp" => Ok(Self::Smtp(SmtpSettings {
                host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".into()),
                port: env_or("SMTP_PORT", 587),
                username: required_env("SMTP_USERNAME")?,
                password: required_env("SMTP_PASSWORD")?,
            })),
            "webhook" => {
                const WEBHOOK_URL: &str = "NOTIFICATION_WEBHOOK_URL";
                let url = required_env(WEBHOOK_URL)?;
                let parsed_url = url::Url::parse(&url).map_err(|e| ConfigError::Invalid {
                    key: WEBHOOK_URL,
                    reason: e.to_string(),
                })?;
                if !["https", "http"].contains(&parsed_url.scheme()) {
                    return Err(ConfigError::Invalid {
                        key: WEBHOOK_URL,
                        reason: format!("unsupported scheme `{}`", parsed_url.scheme()),
                    });
                }
                Ok(Self::Webhook(WebhookSettings {
                    url,
                    key: std::env::var("NOTIFICATION_WEBHOOK_KEY").ok(),
                }))
            }
            other => Err(ConfigError::Invalid {
                key: TRANSPORT,
                reason: format!("unknown transport `{}`, expected `smtp` or `webhook`", other),
            }),
        }
    }
}

/// Credentials needed to wire up the context. Unlike `Config` none of
/// these have defaults, the process must not start without them.
#[derive(Debug, Clone)]
pub struct ContextParams {
    pub postgres_connection_string: String,
    pub transport: TransportSettings,
}

impl ContextParams {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            postgres_connection_string: get_psql_connection_string()?,
            transport: TransportSettings::from_env()?,
        })
    }
}

pub fn get_psql_connection_string() -> Result<String, ConfigError> {
    required_env("DATABASE_URL")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 14] = [
        "DATABASE_URL",
        "NOTIFICATION_TRANSPORT",
        "SMTP_HOST",
        "SMTP_PORT",
        "SMTP_USERNAME",
        "SMTP_PASSWORD",
        "NOTIFICATION_WEBHOOK_URL",
        "NOTIFICATION_WEBHOOK_KEY",
        "PORT",
        "REMINDER_POLL_INTERVAL_SECS",
        "REMINDER_LEAD_MINUTES",
        "REMINDER_TIMEZONE",
        "REMINDER_WRITE_BACK_ATTEMPTS",
        "EMAIL_SENDER_NAME",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn it_uses_defaults() {
        clear_env();
        let config = Config::new();
        assert_eq!(config.port, 5000);
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.lead_minutes, 20);
        assert_eq!(config.timezone, Tz::UTC);
        assert_eq!(config.write_back_attempts, 3);
        assert_eq!(config.sender_name, "Health Monitor");
    }

    #[test]
    #[serial]
    fn it_reads_tunables() {
        clear_env();
        std::env::set_var("REMINDER_POLL_INTERVAL_SECS", "30");
        std::env::set_var("REMINDER_LEAD_MINUTES", "15");
        std::env::set_var("REMINDER_TIMEZONE", "Europe/Oslo");
        let config = Config::new();
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.lead_minutes, 15);
        assert_eq!(config.timezone, chrono_tz::Europe::Oslo);
        clear_env();
    }

    #[test]
    #[serial]
    fn it_falls_back_on_invalid_tunables() {
        clear_env();
        std::env::set_var("PORT", "not-a-port");
        std::env::set_var("REMINDER_TIMEZONE", "Mars/Olympus_Mons");
        std::env::set_var("REMINDER_WRITE_BACK_ATTEMPTS", "0");
        let config = Config::new();
        assert_eq!(config.port, 5000);
        assert_eq!(config.timezone, Tz::UTC);
        assert_eq!(config.write_back_attempts, 1);
        clear_env();
    }

    #[test]
    #[serial]
    fn it_falls_back_on_out_of_range_lead() {
        clear_env();
        for lead in ["-20", "1440", "200000000000000"] {
            std::env::set_var("REMINDER_LEAD_MINUTES", lead);
            assert_eq!(Config::new().lead_minutes, 20);
        }
        std::env::set_var("REMINDER_LEAD_MINUTES", "0");
        assert_eq!(Config::new().lead_minutes, 0);
        std::env::set_var("REMINDER_LEAD_MINUTES", "1439");
        assert_eq!(Config::new().lead_minutes, 1439);
        clear_env();
    }

    #[test]
    #[serial]
    fn it_requires_database_url() {
        clear_env();
        std::env::set_var("SMTP_USERNAME", "sender@example.com");
        std::env::set_var("SMTP_PASSWORD", "secret");
        assert!(matches!(
            ContextParams::from_env(),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
        clear_env();
    }

    #[test]
    #[serial]
    fn it_requires_smtp_credentials() {
        clear_env();
        std::env::set_var("DATABASE_URL", "postgres://localhost/reminders");
        std::env::set_var("SMTP_USERNAME", "sender@example.com");
        assert!(matches!(
            ContextParams::from_env(),
            Err(ConfigError::Missing("SMTP_PASSWORD"))
        ));

        std::env::set_var("SMTP_PASSWORD", "secret");
        let params = ContextParams::from_env().expect("Valid params");
        match params.transport {
            TransportSettings::Smtp(smtp) => {
                assert_eq!(smtp.host, "smtp.gmail.com");
                assert_eq!(smtp.port, 587);
                assert!(!format!("{:?}", smtp).contains("secret"));
            }
            _ => panic!("Expected smtp transport"),
        }
        clear_env();
    }

    #[test]
    #[serial]
    fn it_validates_webhook_url() {
        clear_env();
        std::env::set_var("DATABASE_URL", "postgres://localhost/reminders");
        std::env::set_var("NOTIFICATION_TRANSPORT", "webhook");
        assert!(matches!(
            ContextParams::from_env(),
            Err(ConfigError::Missing("NOTIFICATION_WEBHOOK_URL"))
        ));

        std::env::set_var("NOTIFICATION_WEBHOOK_URL", "ftp://example.com/hook");
        assert!(matches!(
            ContextParams::from_env(),
            Err(ConfigError::Invalid { .. })
        ));

        std::env::set_var("NOTIFICATION_WEBHOOK_URL", "https://example.com/hook");
        assert!(matches!(
            ContextParams::from_env().map(|p| p.transport),
            Ok(TransportSettings::Webhook(_))
        ));
        clear_env();
    }

    #[test]
    #[serial]
    fn it_rejects_unknown_transport() {
        clear_env();
        std::env::set_var("DATABASE_URL", "postgres://localhost/reminders");
        std::env::set_var("NOTIFICATION_TRANSPORT", "carrier-pigeon");
        assert!(matches!(
            ContextParams::from_env(),
            Err(ConfigError::Invalid { .. })
        ));
        clear_env();
    }
}
