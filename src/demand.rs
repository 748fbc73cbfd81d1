//! Per-week demand planning.

use crate::data::{SessionType, Subject};

/// Splits `total` units over `weeks`, handing the remainder out one unit per
/// week starting from the first. A zero week count is treated as one week.
pub fn even_split(total: u32, weeks: usize) -> Vec<u32> {
    let weeks = weeks.max(1);
    let base = total / weeks as u32;
    let remainder = (total % weeks as u32) as usize;
    (0..weeks)
        .map(|week| if week < remainder { base + 1 } else { base })
        .collect()
}

/// Weekly demand vectors of one subject for each session type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyDemand {
    pub lecture: Vec<u32>,
    pub tutorial: Vec<u32>,
    pub practical: Vec<u32>,
}

impl WeeklyDemand {
    pub fn plan(subject: &Subject, weeks: usize) -> Self {
        Self {
            lecture: even_split(subject.lecture_hours_total, weeks),
            tutorial: even_split(subject.tutorial_hours_total, weeks),
            practical: even_split(subject.practical_hours_total, weeks),
        }
    }

    pub fn for_week(&self, session: SessionType, week: usize) -> u32 {
        let per_week = match session {
            SessionType::Lecture => &self.lecture,
            SessionType::Tutorial => &self.tutorial,
            SessionType::Practical => &self.practical,
        };
        per_week.get(week).copied().unwrap_or(0)
    }
}
