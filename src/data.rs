use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::normalize::{Delimited, OneOrMany, null_as_default};

// Type aliases for clarity
pub type SubjectId = String;
pub type RoomId = String;
pub type TeacherId = String;
pub type TimeSlotId = String;

/// A category of teaching activity with its own hour quota and room rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionType {
    Lecture,
    Tutorial,
    Practical,
}

impl SessionType {
    /// Order in which a subject's weekly demand is placed. Practical goes
    /// first so it claims Lab capacity before the other types can.
    pub const PLANNING_ORDER: [SessionType; 3] = [
        SessionType::Practical,
        SessionType::Lecture,
        SessionType::Tutorial,
    ];
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionType::Lecture => "Lecture",
            SessionType::Tutorial => "Tutorial",
            SessionType::Practical => "Practical",
        };
        f.write_str(name)
    }
}

/// Capability tag of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomKind {
    #[serde(alias = "Lecture Hall")]
    LectureHall,
    Classroom,
    Lab,
}

impl RoomKind {
    /// Labs host anything; lecture halls and classrooms host everything but practicals.
    pub fn can_host(self, session: SessionType) -> bool {
        match session {
            SessionType::Practical => self == RoomKind::Lab,
            SessionType::Lecture | SessionType::Tutorial => true,
        }
    }
}

/// A subject with its total hour quotas over the whole date range.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lecture_hours_total: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tutorial_hours_total: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub practical_hours_total: u32,
    /// Higher is scheduled first. Absent means 0.
    #[serde(default)]
    pub priority: Option<i32>,
}

impl Subject {
    pub fn priority(&self) -> i32 {
        self.priority.unwrap_or(0)
    }

    pub fn total_hours(&self, session: SessionType) -> u32 {
        match session {
            SessionType::Lecture => self.lecture_hours_total,
            SessionType::Tutorial => self.tutorial_hours_total,
            SessionType::Practical => self.practical_hours_total,
        }
    }
}

/// Represents a physical room and what it can host.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Room {
    pub id: RoomId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RoomKind,
}

/// One time quantum of a teaching day. Break slots never receive entries.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: TimeSlotId,
    pub start_time: String,
    pub end_time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_break: bool,
}

/// Represents a teacher with their eligibility and load limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: TeacherId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub subjects_can_teach: Option<Delimited>,
    #[serde(default)]
    pub unavailable_dates: Option<Delimited>,
    #[serde(default)]
    pub max_hours_per_day: Option<u32>,
    #[serde(default)]
    pub max_hours_per_week: Option<u32>,
}

/// The complete input for one generation run.
///
/// Collections may be sent as a single object or a list; `config` is read
/// leniently, see [`crate::config::Config::from_overrides`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableRequest {
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub subjects: Option<OneOrMany<Subject>>,
    #[serde(default)]
    pub rooms: Option<OneOrMany<Room>>,
    #[serde(default)]
    pub time_slots: Option<OneOrMany<TimeSlot>>,
    #[serde(default)]
    pub holidays: Option<OneOrMany<String>>,
    #[serde(default)]
    pub teachers: Option<OneOrMany<Teacher>>,
    #[serde(default)]
    pub config: Option<serde_json::Value>,
}

/// Represents a single placed session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledEntry {
    pub subject_id: SubjectId,
    pub room_id: RoomId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<TeacherId>,
    pub date: NaiveDate,
    pub time_slot_id: TimeSlotId,
    #[serde(rename = "type")]
    pub session_type: SessionType,
}

/// Demand for one subject, week and session type that could not be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub subject_id: SubjectId,
    pub week_index: usize,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    pub remaining: u32,
    pub reason: String,
    pub suggestion: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} week {}] {} x{} unplaced: {}",
            self.subject_id, self.week_index, self.session_type, self.remaining, self.reason
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_scheduled: usize,
    pub conflicts: usize,
    pub weeks: usize,
    pub unmet_hours: u32,
    pub scheduling_days: usize,
}

/// The final output of the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableOutput {
    pub timetable: Vec<ScheduledEntry>,
    pub conflicts: Vec<Conflict>,
    pub metrics: Metrics,
}
