//! Runtime settings for the command-line front end.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use chrono::{FixedOffset, Local, Weekday};
use serde::{Deserialize, Serialize};

use crate::calendar::DEFAULT_WEEK_START;
use crate::deadlines::{DeadlineWindow, DEFAULT_UPCOMING_LIMIT, DEFAULT_WINDOW_DAYS};

/// Number of assignments a calendar cell lists before collapsing the rest.
pub const DEFAULT_CALENDAR_PREVIEW: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Length of the upcoming-deadline window in days
    pub window_days: u32,
    /// Maximum number of upcoming assignments shown
    pub upcoming_limit: usize,
    /// Assignments listed per calendar day before "+N more"
    pub calendar_preview: usize,
    /// First day of the calendar week, e.g. "sunday" or "mon"
    pub week_start: String,
    /// Presentation time zone as minutes east of UTC; local offset when unset
    pub utc_offset_minutes: Option<i32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            upcoming_limit: DEFAULT_UPCOMING_LIMIT,
            calendar_preview: DEFAULT_CALENDAR_PREVIEW,
            week_start: "sunday".to_string(),
            utc_offset_minutes: None,
        }
    }
}

/// Command-line values that take precedence over the settings file.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub window_days: Option<u32>,
    pub upcoming_limit: Option<usize>,
    pub utc_offset_minutes: Option<i32>,
}

impl Settings {
    /// Reads settings from `path`, or returns defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("invalid settings in {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let settings: Settings = toml::from_str(raw)?;
        settings.week_start()?;
        settings.zone()?;
        Ok(settings)
    }

    pub fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(days) = overrides.window_days {
            self.window_days = days;
        }
        if let Some(limit) = overrides.upcoming_limit {
            self.upcoming_limit = limit;
        }
        if let Some(offset) = overrides.utc_offset_minutes {
            self.utc_offset_minutes = Some(offset);
        }
    }

    pub fn deadline_window(&self) -> DeadlineWindow {
        DeadlineWindow {
            days: self.window_days,
            limit: self.upcoming_limit,
        }
    }

    pub fn week_start(&self) -> anyhow::Result<Weekday> {
        if self.week_start.trim().is_empty() {
            return Ok(DEFAULT_WEEK_START);
        }
        self.week_start
            .trim()
            .parse::<Weekday>()
            .map_err(|_| anyhow::anyhow!("unknown week start `{}`", self.week_start))
    }

    pub fn zone(&self) -> anyhow::Result<FixedOffset> {
        match self.utc_offset_minutes {
            None => Ok(*Local::now().offset()),
            Some(minutes) => {
                if minutes.abs() >= 24 * 60 {
                    bail!("utc offset of {minutes} minutes is out of range");
                }
                FixedOffset::east_opt(minutes * 60)
                    .with_context(|| format!("utc offset of {minutes} minutes is out of range"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_behaviour() {
        let settings = Settings::default();
        assert_eq!(settings.deadline_window(), DeadlineWindow::default());
        assert_eq!(settings.calendar_preview, 2);
        assert_eq!(settings.week_start().unwrap(), Weekday::Sun);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings = Settings::from_toml("window_days = 14\nweek_start = \"mon\"\n").unwrap();
        assert_eq!(settings.window_days, 14);
        assert_eq!(settings.upcoming_limit, DEFAULT_UPCOMING_LIMIT);
        assert_eq!(settings.week_start().unwrap(), Weekday::Mon);
    }

    #[test]
    fn rejects_unknown_week_start_and_bad_offset() {
        assert!(Settings::from_toml("week_start = \"funday\"").is_err());
        assert!(Settings::from_toml("utc_offset_minutes = 1440").is_err());
    }

    #[test]
    fn overrides_win_over_file_values() {
        let mut settings = Settings::from_toml("window_days = 3\nupcoming_limit = 2").unwrap();
        settings.apply_overrides(&SettingsOverrides {
            window_days: Some(10),
            upcoming_limit: None,
            utc_offset_minutes: Some(-300),
        });
        assert_eq!(settings.window_days, 10);
        assert_eq!(settings.upcoming_limit, 2);
        assert_eq!(settings.zone().unwrap().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "calendar_preview = 4\nutc_offset_minutes = 330\n").unwrap();

        let settings = Settings::load(Some(path.as_path())).unwrap();
        assert_eq!(settings.calendar_preview, 4);
        assert_eq!(settings.zone().unwrap().local_minus_utc(), 330 * 60);

        assert!(Settings::load(Some(dir.path().join("missing.toml").as_path())).is_err());
        assert_eq!(Settings::load(None).unwrap(), Settings::default());
    }
}
