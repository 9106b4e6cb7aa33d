//! Process configuration read from environment variables.
//!
//! # Invariants
//! - A missing or blank `BOT_TOKEN` is fatal.
//! - An unparsable `ADMIN_IDS` list is not fatal: it is reported and
//!   admin features stay disabled.

use crate::model::user::ExternalUserId;
use log::{error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const BOT_TOKEN_VAR: &str = "BOT_TOKEN";
pub const ADMIN_IDS_VAR: &str = "ADMIN_IDS";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "LOG_DIR";

/// Local SQLite file used when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "shelfbot.sqlite3";

/// Startup configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingBotToken,
    EmptyLogDir,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBotToken => write!(f, "{BOT_TOKEN_VAR} is not set"),
            Self::EmptyLogDir => write!(f, "{LOG_DIR_VAR} is set but empty"),
        }
    }
}

impl Error for ConfigError {}

/// Resolved process configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub bot_token: String,
    pub admin_ids: Vec<ExternalUserId>,
    pub database_url: String,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

// Keeps the token out of debug logs.
impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"<redacted>")
            .field("admin_ids", &self.admin_ids)
            .field("database_url", &self.database_url)
            .field("log_level", &self.log_level)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl BotConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    /// - [`ConfigError::MissingBotToken`] when the token is absent or blank.
    /// - [`ConfigError::EmptyLogDir`] when `LOG_DIR` is present but blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = non_blank(lookup(BOT_TOKEN_VAR)).ok_or(ConfigError::MissingBotToken)?;

        let admin_ids = match non_blank(lookup(ADMIN_IDS_VAR)) {
            Some(raw) => parse_admin_ids(&raw).unwrap_or_else(|| {
                error!("event=config_load module=config status=error var={ADMIN_IDS_VAR} reason=invalid_list");
                Vec::new()
            }),
            None => Vec::new(),
        };
        if admin_ids.is_empty() {
            warn!("event=config_load module=config status=degraded reason=no_admins");
        }

        let database_url =
            non_blank(lookup(DATABASE_URL_VAR)).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let log_level = non_blank(lookup(LOG_LEVEL_VAR));
        let log_dir = match lookup(LOG_DIR_VAR) {
            Some(raw) if raw.trim().is_empty() => return Err(ConfigError::EmptyLogDir),
            Some(raw) => Some(PathBuf::from(raw.trim())),
            None => None,
        };

        Ok(Self {
            bot_token,
            admin_ids,
            database_url,
            log_level,
            log_dir,
        })
    }
}

/// Parses a comma-separated id list. Empty segments are skipped; any
/// non-integer segment invalidates the whole list.
pub fn parse_admin_ids(raw: &str) -> Option<Vec<ExternalUserId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.parse::<ExternalUserId>().ok())
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
