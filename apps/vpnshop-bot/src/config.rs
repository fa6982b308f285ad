use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::time::Duration;
use vpnshop_shared::AdminSet;

use crate::panel_client::{DEFAULT_LOGIN_TIMEOUT, DEFAULT_SESSION_COOKIE};

#[derive(Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub database_url: String,
    pub admins: AdminSet,
    /// Sessions live in memory when unset.
    pub redis_url: Option<String>,
    pub session_ttl_secs: Option<u64>,
    pub panel_login_timeout: Duration,
    pub panel_session_cookie: String,
    /// Shown as the chat menu button when set.
    pub mini_app_url: Option<String>,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"<redacted>")
            .field("database_url", &"<redacted>")
            .field("admins", &self.admins.len())
            .field("redis_url", &self.redis_url.as_ref().map(|_| "<redacted>"))
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("panel_login_timeout", &self.panel_login_timeout)
            .field("panel_session_cookie", &self.panel_session_cookie)
            .field("mini_app_url", &self.mini_app_url)
            .finish()
    }
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| var(key).ok_or_else(|| anyhow!("{} is not set", key));

        let admins = AdminSet::parse(&var("ADMIN_IDS").unwrap_or_default())
            .map_err(|e| anyhow!("ADMIN_IDS: {}", e))?;

        let session_ttl_secs = var("SESSION_TTL_SECS")
            .map(|v| v.trim().parse::<u64>())
            .transpose()
            .context("SESSION_TTL_SECS must be a number of seconds")?
            .filter(|ttl| *ttl > 0);

        let panel_login_timeout = var("PANEL_LOGIN_TIMEOUT_SECS")
            .map(|v| v.trim().parse::<u64>())
            .transpose()
            .context("PANEL_LOGIN_TIMEOUT_SECS must be a number of seconds")?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_LOGIN_TIMEOUT);

        Ok(Self {
            bot_token: required("BOT_TOKEN")?,
            database_url: required("DATABASE_URL")?,
            admins,
            redis_url: var("REDIS_URL"),
            session_ttl_secs,
            panel_login_timeout,
            panel_session_cookie: var("PANEL_SESSION_COOKIE")
                .unwrap_or_else(|| DEFAULT_SESSION_COOKIE.to_string()),
            mini_app_url: var("MINI_APP_URL"),
        })
    }
}
