//! Conflict collection and run metrics.

use log::debug;

use crate::data::{Conflict, Metrics, ScheduledEntry, SessionType};

pub const CONFLICT_REASON: &str = "Insufficient capacity or teacher/room constraints";
pub const CONFLICT_SUGGESTION: &str =
    "Increase available time slots/rooms/teachers or relax consecutive/hour caps";

/// Collects unmet demand while the assigner runs. It never touches the timetable.
#[derive(Debug, Default)]
pub struct ConflictReport {
    conflicts: Vec<Conflict>,
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records leftover demand; a zero count is not a conflict.
    pub fn record_unmet(
        &mut self,
        subject_id: &str,
        week_index: usize,
        session_type: SessionType,
        remaining: u32,
    ) {
        if remaining == 0 {
            return;
        }
        let conflict = Conflict {
            subject_id: subject_id.to_string(),
            week_index,
            session_type,
            remaining,
            reason: CONFLICT_REASON.to_string(),
            suggestion: CONFLICT_SUGGESTION.to_string(),
        };
        debug!("Unmet demand: {}", conflict);
        self.conflicts.push(conflict);
    }

    pub fn into_conflicts(self) -> Vec<Conflict> {
        self.conflicts
    }
}

pub fn summarize(
    timetable: &[ScheduledEntry],
    conflicts: &[Conflict],
    weeks: usize,
    scheduling_days: usize,
) -> Metrics {
    Metrics {
        total_scheduled: timetable.len(),
        conflicts: conflicts.len(),
        weeks,
        unmet_hours: conflicts.iter().map(|c| c.remaining).sum(),
        scheduling_days,
    }
}
