//! Aggregator connection settings.

use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime};
use validator::Validate;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://apiv2.shiprocket.in/v1/external";

/// Default country treated as domestic.
pub const DEFAULT_HOME_COUNTRY: &str = "IN";

/// Currency used for international quotes when the order carries none.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Default HTTP timeout for every aggregator call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("Invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

// ---------------------------------------------------------------------------
// Refresh schedule
// ---------------------------------------------------------------------------

/// When the bearer token is renewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshSchedule {
    /// Once a day at the given local wall-clock time.
    DailyAt(NaiveTime),
    /// At a fixed interval.
    Every(Duration),
}

impl Default for RefreshSchedule {
    fn default() -> Self {
        Self::DailyAt(NaiveTime::from_hms_opt(1, 0, 0).unwrap_or_default())
    }
}

impl RefreshSchedule {
    /// Time to wait from `now` (local wall clock) until the next refresh.
    pub fn next_delay(&self, now: NaiveDateTime) -> Duration {
        match self {
            Self::Every(interval) => *interval,
            Self::DailyAt(at) => {
                let today = now.date().and_time(*at);
                let next = if today > now {
                    today
                } else {
                    today + chrono::Duration::days(1)
                };
                (next - now).to_std().unwrap_or(Duration::ZERO)
            }
        }
    }

    /// Parse `HH:MM` into a daily schedule.
    pub fn parse_daily(value: &str) -> Option<Self> {
        NaiveTime::parse_from_str(value.trim(), "%H:%M")
            .ok()
            .map(Self::DailyAt)
    }
}

// ---------------------------------------------------------------------------
// ShiprocketConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Validate)]
pub struct ShiprocketConfig {
    #[validate(url)]
    pub base_url: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(length(min = 1))]
    pub channel_id: String,
    /// Book a pickup for the next day right after AWB assignment.
    pub enable_next_day_pickup: bool,
    #[validate(length(equal = 2))]
    pub home_country: String,
    #[validate(length(equal = 3))]
    pub default_currency: String,
    pub request_timeout: Duration,
    pub refresh_schedule: RefreshSchedule,
}

impl ShiprocketConfig {
    /// Configuration with defaults for everything but the credentials.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        channel_id: impl Into<String>,
    ) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            email: email.into(),
            password: password.into(),
            channel_id: channel_id.into(),
            enable_next_day_pickup: false,
            home_country: DEFAULT_HOME_COUNTRY.to_string(),
            default_currency: DEFAULT_CURRENCY.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            refresh_schedule: RefreshSchedule::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var                       | Default                                   |
    /// |-------------------------------|-------------------------------------------|
    /// | `SHIPROCKET_URL`              | `https://apiv2.shiprocket.in/v1/external` |
    /// | `SHIPROCKET_USERNAME`         | required                                  |
    /// | `SHIPROCKET_PASSWORD`         | required                                  |
    /// | `SHIPROCKET_CHANNEL_ID`       | required                                  |
    /// | `SHIPROCKET_NEXT_DAY_PICKUP`  | `false`                                   |
    /// | `SHIPROCKET_HOME_COUNTRY`     | `IN`                                      |
    /// | `SHIPROCKET_DEFAULT_CURRENCY` | `USD`                                     |
    /// | `SHIPROCKET_TIMEOUT_SECS`     | `30`                                      |
    /// | `SHIPROCKET_REFRESH_AT`       | `01:00`                                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; used by [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let mut config = Self::new(
            required("SHIPROCKET_USERNAME")?,
            required("SHIPROCKET_PASSWORD")?,
            required("SHIPROCKET_CHANNEL_ID")?,
        );

        if let Some(url) = lookup("SHIPROCKET_URL") {
            config.base_url = url;
        }
        if let Some(flag) = lookup("SHIPROCKET_NEXT_DAY_PICKUP") {
            config.enable_next_day_pickup = parse_bool(&flag).ok_or(ConfigError::Invalid {
                name: "SHIPROCKET_NEXT_DAY_PICKUP",
                reason: format!("expected true/false, got {flag:?}"),
            })?;
        }
        if let Some(country) = lookup("SHIPROCKET_HOME_COUNTRY") {
            config.home_country = country.to_uppercase();
        }
        if let Some(currency) = lookup("SHIPROCKET_DEFAULT_CURRENCY") {
            config.default_currency = currency.to_uppercase();
        }
        if let Some(secs) = lookup("SHIPROCKET_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|e| ConfigError::Invalid {
                name: "SHIPROCKET_TIMEOUT_SECS",
                reason: format!("{e}"),
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(at) = lookup("SHIPROCKET_REFRESH_AT") {
            config.refresh_schedule =
                RefreshSchedule::parse_daily(&at).ok_or(ConfigError::Invalid {
                    name: "SHIPROCKET_REFRESH_AT",
                    reason: format!("expected HH:MM, got {at:?}"),
                })?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
