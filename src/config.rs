use chrono::NaiveTime;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::adapters::discord::HISTORY_PAGE_LIMIT;
use crate::domain::DEFAULT_TRACKED_LEAGUES;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub discord: DiscordConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub posting: PostingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// api-sports API key (x-apisports-key header)
    pub key: String,
    /// REST endpoint for fixture data
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
}

fn default_api_base_url() -> String {
    "https://v3.football.api-sports.io".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    /// Discord bot token
    pub token: String,
    /// Target text channel id
    pub channel_id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    /// Competition allowlist; fixtures in other leagues are ignored
    #[serde(default = "default_league_ids")]
    pub league_ids: Vec<u32>,
}

fn default_league_ids() -> Vec<u32> {
    DEFAULT_TRACKED_LEAGUES.to_vec()
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            league_ids: default_league_ids(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Civil timezone anchoring "today", kickoff waits and end of day
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Cadence of the live + FT polling loop
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Minutes after kickoff before a fixture is checked for full time
    #[serde(default = "default_ft_offset_min")]
    pub ft_offset_min: i64,
    /// Local time of day (HH:MM) at which a new daily cycle starts
    #[serde(default = "default_daily_trigger")]
    pub daily_trigger: String,
    /// Run one cycle immediately at process startup
    #[serde(default = "default_run_on_startup")]
    pub run_on_startup: bool,
}

fn default_timezone() -> String {
    "Europe/Rome".to_string()
}

fn default_poll_interval_secs() -> u64 {
    480
}

fn default_ft_offset_min() -> i64 {
    // 90 minutes of play plus typical stoppage and interruption buffer
    112
}

fn default_daily_trigger() -> String {
    "11:00".to_string()
}

fn default_run_on_startup() -> bool {
    true
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            poll_interval_secs: default_poll_interval_secs(),
            ft_offset_min: default_ft_offset_min(),
            daily_trigger: default_daily_trigger(),
            run_on_startup: default_run_on_startup(),
        }
    }
}

impl ScheduleConfig {
    /// Parse the daily trigger time (HH:MM, seconds optional).
    pub fn daily_trigger_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.daily_trigger, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&self.daily_trigger, "%H:%M:%S"))
            .ok()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostingConfig {
    /// Intervening foreign messages before an edit becomes a new post
    #[serde(default = "default_edit_threshold")]
    pub edit_threshold: usize,
    /// How far back to look in channel history when counting
    #[serde(default = "default_history_lookback")]
    pub history_lookback: usize,
}

fn default_edit_threshold() -> usize {
    30
}

fn default_history_lookback() -> usize {
    100
}

impl Default for PostingConfig {
    fn default() -> Self {
        Self {
            edit_threshold: default_edit_threshold(),
            history_lookback: default_history_lookback(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for daily-rolling log files; stdout only when unset
    #[serde(default)]
    pub dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("api.base_url", default_api_base_url())?
            .set_default("schedule.timezone", default_timezone())?
            .set_default("schedule.poll_interval_secs", default_poll_interval_secs())?
            .set_default("schedule.ft_offset_min", default_ft_offset_min())?
            .set_default("schedule.daily_trigger", default_daily_trigger())?
            .set_default("schedule.run_on_startup", default_run_on_startup())?
            .set_default("posting.edit_threshold", default_edit_threshold() as u64)?
            .set_default("posting.history_lookback", default_history_lookback() as u64)?
            .set_default("logging.level", default_log_level())?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("MATCHDAY_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (MATCHDAY_API__KEY, etc.)
            .add_source(
                Environment::with_prefix("MATCHDAY")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.api.key.trim().is_empty() {
            errors.push("api.key must be set".to_string());
        }

        if self.discord.token.trim().is_empty() {
            errors.push("discord.token must be set".to_string());
        }

        if self.discord.channel_id == 0 {
            errors.push("discord.channel_id must be set".to_string());
        }

        if self.tracking.league_ids.is_empty() {
            errors.push("tracking.league_ids must not be empty".to_string());
        }

        if self.schedule.poll_interval_secs == 0 {
            errors.push("schedule.poll_interval_secs must be positive".to_string());
        }

        if self.schedule.ft_offset_min <= 0 {
            errors.push("schedule.ft_offset_min must be positive".to_string());
        }

        if self.schedule.timezone.parse::<chrono_tz::Tz>().is_err() {
            errors.push(format!(
                "schedule.timezone is not a valid IANA timezone: {}",
                self.schedule.timezone
            ));
        }

        if self.schedule.daily_trigger_time().is_none() {
            errors.push(format!(
                "schedule.daily_trigger is not a valid HH:MM time: {}",
                self.schedule.daily_trigger
            ));
        }

        if self.posting.edit_threshold == 0 {
            errors.push("posting.edit_threshold must be positive".to_string());
        }

        if self.posting.edit_threshold > HISTORY_PAGE_LIMIT {
            errors.push(format!(
                "posting.edit_threshold must not exceed {} (channel history \
                 is read one page at a time)",
                HISTORY_PAGE_LIMIT
            ));
        }

        if self.posting.history_lookback < self.posting.edit_threshold {
            errors.push(
                "posting.history_lookback must be at least posting.edit_threshold \
                 to avoid undercounting intervening messages"
                    .to_string(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
