use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::HolidayCalendar;
use crate::pricing::{BasePrices, BracketRule, GuestCount, RateTable};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub pricing: PricingConfig,
    pub conversation: ConversationConfig,
    pub logging: LoggingConfig,
}

/// Rate tables for the operative calendar year. The holiday list is explicit
/// dates, not a recurrence rule; supplying next year's table is an operational
/// task for whoever owns the configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PricingConfig {
    pub base_prices: BasePrices,
    pub extra_bed_fee: u32,
    pub brackets: Vec<BracketRule>,
    pub holidays: Vec<NaiveDate>,
}

impl PricingConfig {
    pub fn rate_table(&self) -> RateTable {
        RateTable::new(
            self.base_prices,
            self.extra_bed_fee,
            self.brackets.clone(),
            HolidayCalendar::new(self.holidays.iter().copied()),
        )
    }

    /// True when the holiday list has no entry for `year` — the configuration
    /// gap that makes every date in that year price on weekday rules alone.
    pub fn holiday_gap(&self, year: i32) -> bool {
        !self.holidays.iter().any(|date| date.year() == year)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConversationConfig {
    pub trigger_keyword: String,
    pub booking_keyword: String,
    pub trigger_policy: TriggerPolicy,
}

/// What the trigger keyword does when it arrives mid-flow. `Restart` matches
/// the behavior this engine replaced: the keyword always reopens the date
/// prompt. `Ignore` lets mid-flow stages treat it as ordinary input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    Restart,
    Ignore,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub trigger_keyword: Option<String>,
    pub booking_keyword: Option<String>,
    pub trigger_policy: Option<TriggerPolicy>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pricing: PricingConfig::default(),
            conversation: ConversationConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_prices: BasePrices {
                weekday: 2_000,
                friday: 2_500,
                weekend: 2_800,
                sunday: 2_300,
                holiday: 3_000,
            },
            extra_bed_fee: 800,
            brackets: vec![
                BracketRule { min_guests: 1, max_guests: 2, rooms: 1, extra_bed: false },
                BracketRule { min_guests: 3, max_guests: 4, rooms: 2, extra_bed: false },
                BracketRule { min_guests: 5, max_guests: 6, rooms: 3, extra_bed: false },
                BracketRule { min_guests: 7, max_guests: 8, rooms: 3, extra_bed: true },
            ],
            holidays: taiwan_holidays_2025(),
        }
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            trigger_keyword: "房價".to_string(),
            booking_keyword: "預訂".to_string(),
            trigger_policy: TriggerPolicy::Restart,
        }
    }
}

impl std::str::FromStr for TriggerPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "restart" => Ok(Self::Restart),
            "ignore" => Ok(Self::Ignore),
            other => Err(ConfigError::Validation(format!(
                "unsupported trigger policy `{other}` (expected restart|ignore)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("roomrate.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(pricing) = patch.pricing {
            if let Some(base_prices) = pricing.base_prices {
                if let Some(weekday) = base_prices.weekday {
                    self.pricing.base_prices.weekday = weekday;
                }
                if let Some(friday) = base_prices.friday {
                    self.pricing.base_prices.friday = friday;
                }
                if let Some(weekend) = base_prices.weekend {
                    self.pricing.base_prices.weekend = weekend;
                }
                if let Some(sunday) = base_prices.sunday {
                    self.pricing.base_prices.sunday = sunday;
                }
                if let Some(holiday) = base_prices.holiday {
                    self.pricing.base_prices.holiday = holiday;
                }
            }
            if let Some(extra_bed_fee) = pricing.extra_bed_fee {
                self.pricing.extra_bed_fee = extra_bed_fee;
            }
            if let Some(brackets) = pricing.brackets {
                self.pricing.brackets = brackets;
            }
            if let Some(holidays) = pricing.holidays {
                self.pricing.holidays = holidays;
            }
        }

        if let Some(conversation) = patch.conversation {
            if let Some(trigger_keyword) = conversation.trigger_keyword {
                self.conversation.trigger_keyword = trigger_keyword;
            }
            if let Some(booking_keyword) = conversation.booking_keyword {
                self.conversation.booking_keyword = booking_keyword;
            }
            if let Some(trigger_policy) = conversation.trigger_policy {
                self.conversation.trigger_policy = trigger_policy;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("ROOMRATE_EXTRA_BED_FEE") {
            self.pricing.extra_bed_fee = parse_u32("ROOMRATE_EXTRA_BED_FEE", &value)?;
        }

        if let Some(value) = read_env("ROOMRATE_TRIGGER_KEYWORD") {
            self.conversation.trigger_keyword = value;
        }
        if let Some(value) = read_env("ROOMRATE_BOOKING_KEYWORD") {
            self.conversation.booking_keyword = value;
        }
        if let Some(value) = read_env("ROOMRATE_TRIGGER_POLICY") {
            self.conversation.trigger_policy = value.parse()?;
        }

        let log_level =
            read_env("ROOMRATE_LOGGING_LEVEL").or_else(|| read_env("ROOMRATE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("ROOMRATE_LOGGING_FORMAT").or_else(|| read_env("ROOMRATE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(trigger_keyword) = overrides.trigger_keyword {
            self.conversation.trigger_keyword = trigger_keyword;
        }
        if let Some(booking_keyword) = overrides.booking_keyword {
            self.conversation.booking_keyword = booking_keyword;
        }
        if let Some(trigger_policy) = overrides.trigger_policy {
            self.conversation.trigger_policy = trigger_policy;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.conversation.trigger_keyword.trim().is_empty() {
            return Err(ConfigError::Validation("trigger keyword must not be empty".to_string()));
        }
        if self.conversation.booking_keyword.trim().is_empty() {
            return Err(ConfigError::Validation("booking keyword must not be empty".to_string()));
        }
        if self.conversation.trigger_keyword == self.conversation.booking_keyword {
            return Err(ConfigError::Validation(
                "trigger and booking keywords must differ".to_string(),
            ));
        }

        if self.pricing.brackets.is_empty() {
            return Err(ConfigError::Validation("room bracket table must not be empty".to_string()));
        }
        for rule in &self.pricing.brackets {
            if rule.min_guests > rule.max_guests {
                return Err(ConfigError::Validation(format!(
                    "room bracket {}-{} is inverted",
                    rule.min_guests, rule.max_guests
                )));
            }
            if rule.rooms == 0 {
                return Err(ConfigError::Validation(format!(
                    "room bracket {}-{} assigns zero rooms",
                    rule.min_guests, rule.max_guests
                )));
            }
        }
        for guests in GuestCount::MIN..=GuestCount::MAX {
            if !self.pricing.brackets.iter().any(|rule| rule.covers(guests)) {
                return Err(ConfigError::Validation(format!(
                    "room bracket table does not cover {guests} guests"
                )));
            }
        }

        self.logging.level.parse::<tracing::Level>().map_err(|_| {
            ConfigError::Validation(format!(
                "unsupported log level `{}` (expected trace|debug|info|warn|error)",
                self.logging.level
            ))
        })?;

        let current_year = chrono::Local::now().year();
        if self.pricing.holiday_gap(current_year) {
            tracing::warn!(
                event_name = "config.holiday_table_gap",
                year = current_year,
                "no holiday dates configured for the current year; every date will price on weekday rules"
            );
        }

        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    pricing: Option<PricingPatch>,
    conversation: Option<ConversationPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    base_prices: Option<BasePricesPatch>,
    extra_bed_fee: Option<u32>,
    brackets: Option<Vec<BracketRule>>,
    holidays: Option<Vec<NaiveDate>>,
}

#[derive(Debug, Default, Deserialize)]
struct BasePricesPatch {
    weekday: Option<u32>,
    friday: Option<u32>,
    weekend: Option<u32>,
    sunday: Option<u32>,
    holiday: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct ConversationPatch {
    trigger_keyword: Option<String>,
    booking_keyword: Option<String>,
    trigger_policy: Option<TriggerPolicy>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(value) = read_env("ROOMRATE_CONFIG") {
        return Some(PathBuf::from(value));
    }

    let default_path = PathBuf::from("roomrate.toml");
    default_path.exists().then_some(default_path)
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let contents = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    toml::from_str(&contents)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn read_env(name: &str) -> Option<String> {
    env::var(name).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn parse_u32(name: &str, value: &str) -> Result<u32, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Validation(format!("`{name}` must be an unsigned integer")))
}

/// The operative year's public holidays and long-weekend dates, as explicit
/// calendar dates.
fn taiwan_holidays_2025() -> Vec<NaiveDate> {
    [
        // New Year's Day
        (1, 1),
        // Lunar New Year block
        (2, 1),
        (2, 2),
        (2, 3),
        (2, 4),
        (2, 5),
        // Peace Memorial Day
        (2, 28),
        // Qingming block
        (4, 4),
        (4, 5),
        (4, 6),
        // Labor Day
        (5, 1),
        // Dragon Boat Festival
        (6, 1),
        (6, 2),
        // Mid-Autumn block
        (9, 12),
        (9, 13),
        (9, 14),
        // National Day
        (10, 10),
        // New Year's Eve
        (12, 31),
    ]
    .into_iter()
    .map(|(month, day)| {
        NaiveDate::from_ymd_opt(2025, month, day).expect("static holiday table is valid")
    })
    .collect()
}
