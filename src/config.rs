//! Settings loading and interval parsing.
//!
//! Settings are read once from an `appsettings.json` style file. Every key is
//! optional: a missing or mistyped value quietly falls back to its default so a
//! half-edited file still starts the bot. The interval is kept as text here and
//! only parsed during startup validation.

use crate::error::{BotError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_INTERVAL: &str = "00:00:10";
pub const DEFAULT_FIND_CLASS: &str = "Notepad";
pub const DEFAULT_MESSAGE: &str = "None";
pub const DEFAULT_LINES_TO_WRITE: u32 = 10;

/// File name looked up next to the executable when no path is given.
pub const CONFIG_FILE_NAME: &str = "appsettings.json";

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;
const MAX_FRACTION_DIGITS: usize = 7;

/// Longest accepted interval, 10675199.02:48:05.4775807 (the largest
/// time span expressible in 100ns ticks).
pub const MAX_INTERVAL: Duration = Duration::new(922_337_203_685, 477_580_700);

/// The four values the bot runs with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Settings {
    /// Time between ticks, `[d.]hh:mm[:ss[.fffffff]]`.
    pub interval: String,
    /// Window class name of the target window.
    pub find_class: String,
    /// Text typed on every tick.
    pub message: String,
    /// Lines per block before a line break is typed.
    pub lines_to_write: NonZeroU32,
}

/// Values supplied on the command line that replace loaded settings.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub interval: Option<String>,
    pub find_class: Option<String>,
    pub message: Option<String>,
    pub lines_to_write: Option<i64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL.to_string(),
            find_class: DEFAULT_FIND_CLASS.to_string(),
            message: DEFAULT_MESSAGE.to_string(),
            lines_to_write: default_lines(),
        }
    }
}

impl Settings {
    /// Builds settings directly. A zero line count falls back to the default.
    pub fn new(
        interval: impl Into<String>,
        find_class: impl Into<String>,
        message: impl Into<String>,
        lines_to_write: u32,
    ) -> Self {
        Self {
            interval: interval.into(),
            find_class: find_class.into(),
            message: message.into(),
            lines_to_write: NonZeroU32::new(lines_to_write).unwrap_or_else(default_lines),
        }
    }

    /// Loads settings from a JSON file.
    ///
    /// The file itself must exist and hold a JSON object; individual keys are
    /// lenient (see [`Settings::from_json`]).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| BotError::config_load(path.display().to_string(), e.to_string()))?;
        let root: Value = serde_json::from_str(&content)
            .map_err(|e| BotError::config_load(path.display().to_string(), e.to_string()))?;

        match root {
            Value::Object(map) => {
                debug!("Loaded settings file {}", path.display());
                Ok(Self::from_json(&map))
            }
            _ => Err(BotError::config_load(
                path.display().to_string(),
                "expected a JSON object at the top level",
            )),
        }
    }

    /// Reads settings out of a JSON object.
    ///
    /// Keys match case-insensitively. Scalars are taken in their textual form,
    /// so `"LinesToWrite": "12"` and `"Message": 5` both work. Anything else
    /// falls back to the default.
    pub fn from_json(root: &Map<String, Value>) -> Self {
        let interval = text_or_default(root, "Interval", DEFAULT_INTERVAL);
        let find_class = text_or_default(root, "FindClass", DEFAULT_FIND_CLASS);
        let message = text_or_default(root, "Message", DEFAULT_MESSAGE);
        let lines_to_write = match lookup(root, "LinesToWrite") {
            None => default_lines(),
            Some(value) => integer_value(value)
                .and_then(positive_lines)
                .unwrap_or_else(|| {
                    warn!(
                        "LinesToWrite value {} is not a positive integer, using {}",
                        value, DEFAULT_LINES_TO_WRITE
                    );
                    default_lines()
                }),
        };

        Self {
            interval,
            find_class,
            message,
            lines_to_write,
        }
    }

    /// Replaces loaded values with command-line ones.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(interval) = &overrides.interval {
            self.interval = interval.clone();
        }
        if let Some(find_class) = &overrides.find_class {
            self.find_class = find_class.clone();
        }
        if let Some(message) = &overrides.message {
            self.message = message.clone();
        }
        if let Some(lines) = overrides.lines_to_write {
            self.lines_to_write = positive_lines(lines).unwrap_or_else(|| {
                warn!(
                    "--lines {} is not a positive integer, using {}",
                    lines, DEFAULT_LINES_TO_WRITE
                );
                default_lines()
            });
        }
        self
    }

    /// Parses the interval text into a duration.
    pub fn parsed_interval(&self) -> Result<Duration> {
        parse_interval(&self.interval)
    }

    /// Writes the settings as pretty-printed JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content + "\n")
            .map_err(|e| BotError::config_save(path.display().to_string(), e.to_string()))
    }
}

/// `appsettings.json` next to the running executable, or in the working
/// directory when the executable path is unknown.
pub fn default_config_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// Parses a time-span string into a [`Duration`].
///
/// Accepted forms are `d` (whole days) and `[d.]hh:mm[:ss[.f]]` with up to
/// seven fraction digits. Hours must be below 24, minutes and seconds below 60.
/// Negative and zero-length spans, and spans above [`MAX_INTERVAL`], are
/// rejected since they cannot drive a timer.
///
/// ```
/// use busy_bot::config::parse_interval;
/// use std::time::Duration;
///
/// assert_eq!(parse_interval("00:00:10").unwrap(), Duration::from_secs(10));
/// assert_eq!(parse_interval("1.00:30").unwrap(), Duration::from_secs(86_400 + 1_800));
/// assert!(parse_interval("bogus").is_err());
/// ```
pub fn parse_interval(value: &str) -> Result<Duration> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BotError::invalid_interval(value, "empty interval"));
    }
    if trimmed.starts_with('-') {
        return Err(BotError::invalid_interval(value, "interval cannot be negative"));
    }

    let duration = match trimmed.find(':') {
        None => {
            let days = parse_number(value, trimmed, "days")?;
            let secs = days
                .checked_mul(SECS_PER_DAY)
                .ok_or_else(|| BotError::invalid_interval(value, "interval is too large"))?;
            Duration::from_secs(secs)
        }
        Some(colon) => {
            let (days, clock) = match trimmed[..colon].find('.') {
                Some(dot) => (
                    parse_number(value, &trimmed[..dot], "days")?,
                    &trimmed[dot + 1..],
                ),
                None => (0, trimmed),
            };
            parse_clock(value, days, clock)?
        }
    };

    if duration > MAX_INTERVAL {
        return Err(BotError::invalid_interval(value, "interval is too large"));
    }
    if duration.is_zero() {
        return Err(BotError::invalid_interval(
            value,
            "interval must be greater than zero",
        ));
    }
    Ok(duration)
}

fn parse_clock(value: &str, days: u64, clock: &str) -> Result<Duration> {
    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(BotError::invalid_interval(
            value,
            "expected the format \"HH:MM:SS\"",
        ));
    }

    let hours = parse_bounded(value, parts[0], "hours", 24)?;
    let minutes = parse_bounded(value, parts[1], "minutes", 60)?;
    let (seconds, nanos) = match parts.get(2) {
        None => (0, 0),
        Some(part) => match part.split_once('.') {
            None => (parse_bounded(value, part, "seconds", 60)?, 0),
            Some((secs, fraction)) => (
                parse_bounded(value, secs, "seconds", 60)?,
                parse_fraction(value, fraction)?,
            ),
        },
    };

    let secs = days
        .checked_mul(SECS_PER_DAY)
        .and_then(|s| s.checked_add(hours * SECS_PER_HOUR + minutes * SECS_PER_MINUTE + seconds))
        .ok_or_else(|| BotError::invalid_interval(value, "interval is too large"))?;
    Ok(Duration::new(secs, nanos))
}

fn parse_number(value: &str, part: &str, what: &str) -> Result<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BotError::invalid_interval(
            value,
            format!("{} must be a whole number", what),
        ));
    }
    part.parse::<u64>()
        .map_err(|_| BotError::invalid_interval(value, format!("{} out of range", what)))
}

fn parse_bounded(value: &str, part: &str, what: &str, limit: u64) -> Result<u64> {
    let number = parse_number(value, part, what)?;
    if number >= limit {
        return Err(BotError::invalid_interval(
            value,
            format!("{} must be below {}", what, limit),
        ));
    }
    Ok(number)
}

fn parse_fraction(value: &str, fraction: &str) -> Result<u32> {
    if fraction.is_empty()
        || fraction.len() > MAX_FRACTION_DIGITS
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(BotError::invalid_interval(
            value,
            format!("fraction must be 1 to {} digits", MAX_FRACTION_DIGITS),
        ));
    }
    // Pad to nanoseconds: ".5" is 500_000_000ns.
    let padded = format!("{:0<9}", fraction);
    padded
        .parse::<u32>()
        .map_err(|_| BotError::invalid_interval(value, "invalid fraction"))
}

fn default_lines() -> NonZeroU32 {
    NonZeroU32::new(DEFAULT_LINES_TO_WRITE).unwrap_or(NonZeroU32::MIN)
}

fn positive_lines(lines: i64) -> Option<NonZeroU32> {
    u32::try_from(lines).ok().and_then(NonZeroU32::new)
}

fn lookup<'a>(root: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    root.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

fn text_or_default(root: &Map<String, Value>, key: &str, default: &str) -> String {
    match lookup(root, key) {
        None => default.to_string(),
        Some(value) => text_value(value).unwrap_or_else(|| {
            warn!("{} value {} is not a scalar, using \"{}\"", key, value, default);
            default.to_string()
        }),
    }
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
