use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Where answer mirrors are kept during an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// One JSON file under `[storage].dir`; survives a crash or restart.
    File,
    /// Process memory only (lost on exit).
    Memory,
}

impl Default for StorageMode {
    fn default() -> Self {
        StorageMode::File
    }
}

impl FromStr for StorageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(StorageMode::File),
            "memory" => Ok(StorageMode::Memory),
            other => Err(format!(
                "invalid storage mode: {other} (expected \"file\" or \"memory\")"
            )),
        }
    }
}

/// Time left in an attempt, or the configured budget before one starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRemaining {
    Seconds(u64),
    Unlimited,
}

impl TimeRemaining {
    pub fn from_minutes(minutes: u64) -> Self {
        TimeRemaining::Seconds(minutes.saturating_mul(60))
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, TimeRemaining::Unlimited)
    }
}

/// `MM:SS` for a countdown, `∞ No Limit` otherwise.
impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeRemaining::Seconds(secs) => write!(f, "{:02}:{:02}", secs / 60, secs % 60),
            TimeRemaining::Unlimited => f.write_str("∞ No Limit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_renders_as_minutes_and_seconds() {
        assert_eq!(TimeRemaining::Seconds(0).to_string(), "00:00");
        assert_eq!(TimeRemaining::Seconds(65).to_string(), "01:05");
        assert_eq!(TimeRemaining::from_minutes(90).to_string(), "90:00");
        assert_eq!(TimeRemaining::Unlimited.to_string(), "∞ No Limit");
    }

    #[test]
    fn storage_mode_parses_case_insensitively() {
        assert_eq!("FILE".parse::<StorageMode>(), Ok(StorageMode::File));
        assert_eq!(" memory ".parse::<StorageMode>(), Ok(StorageMode::Memory));
        assert!("sqlite".parse::<StorageMode>().is_err());
    }
}
