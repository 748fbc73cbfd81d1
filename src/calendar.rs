//! Calendar partitioning: date range -> eligible school days -> ISO week buckets.

use chrono::{Datelike, NaiveDate};
use itertools::Itertools;
use std::collections::HashSet;

use crate::config::Config;

/// Eligible days of a run, grouped into contiguous ISO weeks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarPlan {
    pub days: Vec<NaiveDate>,
    pub weeks: Vec<Vec<NaiveDate>>,
}

impl CalendarPlan {
    /// Builds the plan for `start..=end`. A missing bound yields an empty plan.
    pub fn build(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        holidays: &HashSet<NaiveDate>,
        config: &Config,
    ) -> Self {
        let (Some(start), Some(end)) = (start, end) else {
            return Self::default();
        };
        let days = eligible_days(&enumerate_days(start, end), holidays, config);
        let weeks = group_by_week(&days);
        Self { days, weeks }
    }

    /// Week count used to split demand; never zero.
    pub fn week_divisor(&self) -> usize {
        self.weeks.len().max(1)
    }

    /// Days of week `index`, empty when the calendar has fewer weeks.
    pub fn week(&self, index: usize) -> &[NaiveDate] {
        self.weeks.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Every calendar date from `start` to `end` inclusive, ascending.
pub fn enumerate_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|day| *day <= end).collect()
}

/// Drops holidays and days whose weekday is not enabled.
pub fn eligible_days(
    days: &[NaiveDate],
    holidays: &HashSet<NaiveDate>,
    config: &Config,
) -> Vec<NaiveDate> {
    days.iter()
        .copied()
        .filter(|day| !holidays.contains(day) && config.is_enabled(day.weekday()))
        .collect()
}

/// Splits `days` into runs that share an ISO week.
pub fn group_by_week(days: &[NaiveDate]) -> Vec<Vec<NaiveDate>> {
    let runs = days.iter().chunk_by(|day| day.iso_week());
    let mut weeks = Vec::new();
    for (_, run) in &runs {
        weeks.push(run.copied().collect());
    }
    weeks
}
