//! Engine options with defaults.
//!
//! Overrides arrive as untyped JSON. An option that is missing, not a finite
//! number, or (for weekdays) yields no usable entries keeps its default.

use chrono::Weekday;
use serde_json::Value;

pub const DEFAULT_MAX_CONSECUTIVE_PER_DAY: u32 = 2;
pub const DEFAULT_MAX_HOURS_PER_TEACHER_PER_WEEK: u32 = 12;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub enabled_weekdays: Vec<Weekday>,
    /// Per-day cap for teachers that do not set their own.
    pub max_consecutive_per_day: u32,
    /// Per-week cap for teachers that do not set their own.
    pub max_hours_per_teacher_per_week: u32,
    /// Placement passes per subject per day.
    pub max_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled_weekdays: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            max_consecutive_per_day: DEFAULT_MAX_CONSECUTIVE_PER_DAY,
            max_hours_per_teacher_per_week: DEFAULT_MAX_HOURS_PER_TEACHER_PER_WEEK,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Config {
    /// Applies the recognized options of `overrides` on top of the defaults.
    pub fn from_overrides(overrides: Option<&Value>) -> Self {
        let defaults = Self::default();
        let Some(overrides) = overrides else {
            return defaults;
        };

        let enabled_weekdays = overrides
            .get("enabledWeekdays")
            .and_then(Value::as_array)
            .map(|days| days.iter().filter_map(weekday_from_number).collect::<Vec<_>>())
            .filter(|days| !days.is_empty())
            .unwrap_or(defaults.enabled_weekdays);

        Self {
            enabled_weekdays,
            max_consecutive_per_day: finite_count(overrides.get("maxConsecutivePerDay"))
                .unwrap_or(defaults.max_consecutive_per_day),
            max_hours_per_teacher_per_week: finite_count(
                overrides.get("maxHoursPerTeacherPerWeek"),
            )
            .unwrap_or(defaults.max_hours_per_teacher_per_week),
            max_attempts: finite_count(overrides.get("maxAttempts"))
                .unwrap_or(defaults.max_attempts),
        }
    }

    pub fn is_enabled(&self, weekday: Weekday) -> bool {
        self.enabled_weekdays.contains(&weekday)
    }
}

/// Monday=1 .. Saturday=6; Sunday may be sent as 0 or 7.
fn weekday_from_number(value: &Value) -> Option<Weekday> {
    let number = value.as_f64().filter(|n| n.is_finite() && n.fract() == 0.0)?;
    match number as i64 {
        0 | 7 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

// Counters are integers compared with `<`, so a fractional limit behaves as
// its ceiling.
fn finite_count(value: Option<&Value>) -> Option<u32> {
    let number = value?.as_f64().filter(|n| n.is_finite())?;
    Some(number.max(0.0).ceil().min(f64::from(u32::MAX)) as u32)
}
