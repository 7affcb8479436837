//! Application settings loaded from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;
use cron::Schedule;
use serde::{Deserialize, Serialize};

/// Required deployment configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Bot API token (from @BotFather).
    pub token: String,

    /// Id of the single state document.
    pub document_id: String,

    /// Public base URL of this server, used for the webhook and keep-alive.
    #[serde(default)]
    pub server_url: Option<String>,
}

impl BotConfig {
    /// Creates a new bot configuration.
    #[must_use]
    pub fn new(token: String, document_id: String) -> Self {
        Self {
            token,
            document_id,
            server_url: None,
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Expects `BOT_TOKEN` (or `TOKEN`) and `DOCUMENT_ID` to be set.
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = std::env::var("BOT_TOKEN")
            .or_else(|_| std::env::var("TOKEN"))
            .map_err(|_| ConfigError::MissingEnvVar("BOT_TOKEN"))?;

        let document_id = std::env::var("DOCUMENT_ID")
            .map_err(|_| ConfigError::MissingEnvVar("DOCUMENT_ID"))?;
        validate_document_id(&document_id)?;

        let server_url = std::env::var("SERVER_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_owned())
            .filter(|url| !url.is_empty());

        Ok(Self {
            token,
            document_id,
            server_url,
        })
    }

    /// Path the webhook is served on. The token keeps it unguessable.
    #[must_use]
    pub fn webhook_path(&self) -> String {
        format!("/webhook/{}", self.token)
    }

    /// Full webhook URL to register with Telegram, if a server URL is known.
    #[must_use]
    pub fn webhook_url(&self) -> Option<String> {
        self.server_url
            .as_ref()
            .map(|base| format!("{base}{}", self.webhook_path()))
    }
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"***")
            .field("document_id", &self.document_id)
            .field("server_url", &self.server_url)
            .finish()
    }
}

/// Checks that a document id is safe to use as a file name.
pub fn validate_document_id(id: &str) -> Result<(), ConfigError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidDocumentId(id.to_owned()))
    }
}

/// Bot tunables, all with defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSettings {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the state document.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Bot API base URL.
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,

    /// Cron expression (with seconds) for the daily tick.
    #[serde(default = "default_daily_cron")]
    pub daily_cron: String,

    /// IANA timezone the cron expression is evaluated in.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Daily message; `{count}` is replaced by the day count.
    #[serde(default = "default_day_message")]
    pub day_message: String,

    /// Keep-alive period in seconds, 0 to disable.
    #[serde(default = "default_keepalive_interval")]
    pub keepalive_interval_secs: u64,

    /// Send disappearing confirmations after commands.
    #[serde(default = "default_true")]
    pub confirmations: bool,

    /// Lifetime of confirmations in seconds.
    #[serde(default = "default_confirmation_ttl")]
    pub confirmation_ttl_secs: u64,

    /// Report failed commands back to the chat.
    #[serde(default = "default_true")]
    pub report_errors: bool,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_owned()
}

fn default_port() -> u16 {
    3000
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data")
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_owned()
}

fn default_daily_cron() -> String {
    "0 0 5 * * *".to_owned() // every day at 05:00
}

fn default_timezone() -> String {
    "Asia/Phnom_Penh".to_owned()
}

fn default_day_message() -> String {
    "ថ្ងៃ {count}".to_owned()
}

fn default_keepalive_interval() -> u64 {
    600
}

fn default_confirmation_ttl() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            store_path: default_store_path(),
            telegram_api_url: default_telegram_api_url(),
            daily_cron: default_daily_cron(),
            timezone: default_timezone(),
            day_message: default_day_message(),
            keepalive_interval_secs: default_keepalive_interval(),
            confirmations: true,
            confirmation_ttl_secs: default_confirmation_ttl(),
            report_errors: true,
        }
    }
}

impl BotSettings {
    /// Creates bot settings from environment variables with defaults.
    ///
    /// Unparseable values fall back to their defaults.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self {
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| default_bind_address()),
            port: env_parse("PORT").unwrap_or_else(default_port),
            store_path: std::env::var("STORE_PATH").map_or_else(|_| default_store_path(), PathBuf::from),
            telegram_api_url: std::env::var("TELEGRAM_API_URL")
                .unwrap_or_else(|_| default_telegram_api_url()),
            daily_cron: std::env::var("DAILY_CRON").unwrap_or_else(|_| default_daily_cron()),
            timezone: std::env::var("TIMEZONE").unwrap_or_else(|_| default_timezone()),
            day_message: std::env::var("DAY_MESSAGE").unwrap_or_else(|_| default_day_message()),
            keepalive_interval_secs: env_parse("KEEPALIVE_INTERVAL_SECS")
                .unwrap_or_else(default_keepalive_interval),
            confirmations: env_flag("CONFIRMATIONS").unwrap_or(true),
            confirmation_ttl_secs: env_parse("CONFIRMATION_TTL_SECS")
                .unwrap_or_else(default_confirmation_ttl),
            report_errors: env_flag("REPORT_ERRORS").unwrap_or(true),
        }
    }

    /// Parses the daily cron expression.
    pub fn schedule(&self) -> Result<Schedule, ConfigError> {
        Schedule::from_str(&self.daily_cron).map_err(|e| ConfigError::InvalidCron {
            expr: self.daily_cron.clone(),
            reason: e.to_string(),
        })
    }

    /// Parses the scheduler timezone.
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse()
            .map_err(|_| ConfigError::InvalidTimezone(self.timezone.clone()))
    }

    /// Keep-alive period, `None` when disabled.
    #[must_use]
    pub fn keepalive_interval(&self) -> Option<Duration> {
        (self.keepalive_interval_secs > 0).then(|| Duration::from_secs(self.keepalive_interval_secs))
    }

    /// Lifetime of disappearing confirmations.
    #[must_use]
    pub const fn confirmation_ttl(&self) -> Duration {
        Duration::from_secs(self.confirmation_ttl_secs)
    }

    /// Socket address string for the HTTP listener.
    #[must_use]
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|s| parse_flag(&s))
}

/// Parses common boolean spellings (`true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`).
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid document id '{0}' (use letters, digits, '-' and '_')")]
    InvalidDocumentId(String),

    #[error("Invalid cron expression '{expr}': {reason}")]
    InvalidCron { expr: String, reason: String },

    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),
}
