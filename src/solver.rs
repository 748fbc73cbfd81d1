use chrono::NaiveDate;
use itertools::Itertools;
use log::{info, trace, warn};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::calendar::CalendarPlan;
use crate::config::Config;
use crate::data::{
    Room, ScheduledEntry, SessionType, Subject, Teacher, TimeSlot, TimetableOutput,
    TimetableRequest,
};
use crate::demand::WeeklyDemand;
use crate::normalize::{canonical_date, canonical_dates, normalize_list};
use crate::report::{self, ConflictReport};

/// Generates a timetable with the greedy week-by-week assigner.
///
/// Never fails: demand that cannot be placed is returned as conflicts.
pub fn generate_timetable(request: TimetableRequest) -> TimetableOutput {
    let start_time = Instant::now();
    let config = Config::from_overrides(request.config.as_ref());

    // normalize inputs into their canonical orders
    let subjects = normalize_list(request.subjects)
        .into_iter()
        .sorted_by(|a, b| b.priority().cmp(&a.priority()).then_with(|| a.id.cmp(&b.id)))
        .collect_vec();
    let rooms = normalize_list(request.rooms)
        .into_iter()
        .sorted_by(|a, b| a.id.cmp(&b.id))
        .collect_vec();
    let slots = normalize_list(request.time_slots)
        .into_iter()
        .filter(|slot| !slot.is_break)
        .sorted_by(|a, b| a.start_time.cmp(&b.start_time))
        .collect_vec();
    let holidays_raw = normalize_list(request.holidays);
    let holidays = canonical_dates(holidays_raw.iter().map(String::as_str));
    let teachers = normalize_list(request.teachers)
        .into_iter()
        .sorted_by(|a, b| a.id.cmp(&b.id))
        .collect_vec();
    let profiles = teachers
        .iter()
        .map(|teacher| TeacherProfile::new(teacher, &config))
        .collect_vec();

    let calendar = CalendarPlan::build(
        canonical_date(&request.start_date),
        canonical_date(&request.end_date),
        &holidays,
        &config,
    );
    let weeks = calendar.week_divisor();
    info!(
        "Generating timetable for {} subjects, {} rooms, {} teachers and {} slots over {} days in {} weeks...",
        subjects.len(),
        rooms.len(),
        teachers.len(),
        slots.len(),
        calendar.days.len(),
        calendar.weeks.len()
    );
    warn_if_over_capacity(&subjects, &calendar, slots.len(), rooms.len(), teachers.len());

    let demand = subjects
        .iter()
        .map(|subject| (subject, WeeklyDemand::plan(subject, weeks)))
        .collect_vec();

    let mut assigner = SlotAssigner::new(&rooms, &slots, &profiles, &config);
    for week_index in 0..weeks {
        assigner.start_week();
        for (subject, plan) in &demand {
            assigner.schedule_week(subject, plan, week_index, calendar.week(week_index));
        }
    }
    let (mut timetable, report) = assigner.finish();

    // canonical output order
    timetable.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.time_slot_id.cmp(&b.time_slot_id))
    });
    let conflicts = report.into_conflicts();
    let metrics = report::summarize(&timetable, &conflicts, weeks, calendar.days.len());

    info!(
        "Timetable generated in {:.2?}: {} entries, {} conflicts",
        start_time.elapsed(),
        metrics.total_scheduled,
        metrics.conflicts
    );

    TimetableOutput {
        timetable,
        conflicts,
        metrics,
    }
}

/// Deterministic string hash used to rotate a subject's starting day.
///
/// `h = h * 31 + unit` over UTF-16 code units with 32-bit wrap-around,
/// then the absolute value.
pub fn rotation_hash(id: &str) -> u32 {
    id.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
        .unsigned_abs()
}

/// Days of the week starting at the subject's rotation offset, wrapping around.
pub fn rotated_days(days: &[NaiveDate], subject_id: &str) -> Vec<NaiveDate> {
    if days.is_empty() {
        return Vec::new();
    }
    let offset = rotation_hash(subject_id) as usize % days.len();
    days[offset..].iter().chain(&days[..offset]).copied().collect()
}

// rough check only; the run goes ahead either way
fn warn_if_over_capacity(
    subjects: &[Subject],
    calendar: &CalendarPlan,
    slot_count: usize,
    room_count: usize,
    teacher_count: usize,
) {
    let required: u64 = subjects
        .iter()
        .flat_map(|s| SessionType::PLANNING_ORDER.map(|session| u64::from(s.total_hours(session))))
        .sum();
    let parallel = room_count.max(1).min(teacher_count.max(1)) as u64;
    let available = (calendar.days.len() * slot_count) as u64 * parallel;
    if required > available {
        warn!(
            "Requested {} sessions but only about {} cells are available; expect conflicts",
            required, available
        );
    }
}

/// A teacher with eligibility and caps resolved for one run.
#[derive(Debug, Clone)]
pub struct TeacherProfile<'a> {
    pub id: &'a str,
    pub subjects: HashSet<&'a str>,
    pub unavailable: HashSet<NaiveDate>,
    pub day_cap: u32,
    pub week_cap: u32,
}

impl<'a> TeacherProfile<'a> {
    pub fn new(teacher: &'a Teacher, config: &Config) -> Self {
        let subjects = teacher
            .subjects_can_teach
            .as_ref()
            .map(|list| list.tokens().into_iter().collect())
            .unwrap_or_default();
        let unavailable = teacher
            .unavailable_dates
            .as_ref()
            .map(|list| canonical_dates(list.tokens()))
            .unwrap_or_default();
        Self {
            id: &teacher.id,
            subjects,
            unavailable,
            day_cap: teacher
                .max_hours_per_day
                .unwrap_or(config.max_consecutive_per_day),
            week_cap: teacher
                .max_hours_per_week
                .unwrap_or(config.max_hours_per_teacher_per_week),
        }
    }

    pub fn can_teach(&self, subject_id: &str) -> bool {
        self.subjects.contains(subject_id)
    }
}

// (date, time slot id, room or teacher id)
type Booking<'a> = (NaiveDate, &'a str, &'a str);

/// Mutable state of one generation run. Nothing here outlives the request.
struct SlotAssigner<'a> {
    rooms: &'a [Room],
    slots: &'a [TimeSlot],
    teachers: &'a [TeacherProfile<'a>],
    config: &'a Config,
    room_booked: HashSet<Booking<'a>>,
    teacher_booked: HashSet<Booking<'a>>,
    room_day_usage: HashMap<(NaiveDate, &'a str), u32>,
    // both cleared at every week boundary
    teacher_week_load: HashMap<&'a str, u32>,
    teacher_day_load: HashMap<(NaiveDate, &'a str), u32>,
    timetable: Vec<ScheduledEntry>,
    report: ConflictReport,
}

impl<'a> SlotAssigner<'a> {
    fn new(
        rooms: &'a [Room],
        slots: &'a [TimeSlot],
        teachers: &'a [TeacherProfile<'a>],
        config: &'a Config,
    ) -> Self {
        Self {
            rooms,
            slots,
            teachers,
            config,
            room_booked: HashSet::new(),
            teacher_booked: HashSet::new(),
            room_day_usage: HashMap::new(),
            teacher_week_load: HashMap::new(),
            teacher_day_load: HashMap::new(),
            timetable: Vec::new(),
            report: ConflictReport::new(),
        }
    }

    fn start_week(&mut self) {
        self.teacher_week_load.clear();
        self.teacher_day_load.clear();
    }

    fn finish(self) -> (Vec<ScheduledEntry>, ConflictReport) {
        (self.timetable, self.report)
    }

    /// Places one subject's demand for one week, then reports what is left.
    fn schedule_week(
        &mut self,
        subject: &Subject,
        plan: &WeeklyDemand,
        week_index: usize,
        days: &[NaiveDate],
    ) {
        let mut pending = SessionType::PLANNING_ORDER
            .map(|session| (session, plan.for_week(session, week_index)));

        for day in rotated_days(days, &subject.id) {
            if pending.iter().all(|(_, remaining)| *remaining == 0) {
                break;
            }
            for _attempt in 0..self.config.max_attempts {
                let committed = self.place_next(subject, day, &mut pending);
                if !committed {
                    break;
                }
            }
        }

        for (session, remaining) in pending {
            self.report
                .record_unmet(&subject.id, week_index, session, remaining);
        }
    }

    /// One pass over the day's slots; stops at the first placement.
    fn place_next(
        &mut self,
        subject: &Subject,
        day: NaiveDate,
        pending: &mut [(SessionType, u32)],
    ) -> bool {
        let slots = self.slots;
        for slot in slots {
            for (session, remaining) in pending.iter_mut() {
                if *remaining == 0 {
                    continue;
                }
                if self.try_place(subject, day, slot, *session) {
                    *remaining -= 1;
                    return true;
                }
            }
        }
        false
    }

    fn try_place(
        &mut self,
        subject: &Subject,
        day: NaiveDate,
        slot: &'a TimeSlot,
        session: SessionType,
    ) -> bool {
        let Some(room) = self.least_used_room(day, session) else {
            return false;
        };
        if self
            .room_booked
            .contains(&(day, slot.id.as_str(), room.id.as_str()))
        {
            return false;
        }

        let teacher = if self.teachers.is_empty() {
            None
        } else {
            match self.pick_teacher(&subject.id, day, slot.id.as_str()) {
                Some(teacher) => Some(teacher),
                None => return false,
            }
        };
        if let Some(teacher) = teacher {
            if self.day_load(day, teacher.id) >= teacher.day_cap {
                return false;
            }
        }

        trace!(
            "Placing {} {} on {} slot {} in room {} with teacher {:?}",
            subject.id,
            session,
            day,
            slot.id,
            room.id,
            teacher.map(|t| t.id)
        );
        self.room_booked.insert((day, slot.id.as_str(), room.id.as_str()));
        *self.room_day_usage.entry((day, room.id.as_str())).or_insert(0) += 1;
        if let Some(teacher) = teacher {
            self.teacher_booked.insert((day, slot.id.as_str(), teacher.id));
            *self.teacher_day_load.entry((day, teacher.id)).or_insert(0) += 1;
            *self.teacher_week_load.entry(teacher.id).or_insert(0) += 1;
        }
        self.timetable.push(ScheduledEntry {
            subject_id: subject.id.clone(),
            room_id: room.id.clone(),
            teacher_id: teacher.map(|t| t.id.to_string()),
            date: day,
            time_slot_id: slot.id.clone(),
            session_type: session,
        });
        true
    }

    /// Eligible room with the fewest entries on `day`; ties go to the lowest id.
    fn least_used_room(&self, day: NaiveDate, session: SessionType) -> Option<&'a Room> {
        let rooms = self.rooms;
        rooms
            .iter()
            .filter(|room| room.kind.can_host(session))
            .min_by_key(|room| self.room_day_usage.get(&(day, room.id.as_str())).copied().unwrap_or(0))
    }

    /// Free, available, eligible teacher under the weekly cap with the lowest
    /// weekly load; ties go to the lowest id.
    fn pick_teacher(
        &self,
        subject_id: &str,
        day: NaiveDate,
        slot_id: &'a str,
    ) -> Option<&'a TeacherProfile<'a>> {
        let teachers = self.teachers;
        teachers
            .iter()
            .filter(|t| t.can_teach(subject_id))
            .filter(|t| !self.teacher_booked.contains(&(day, slot_id, t.id)))
            .filter(|t| !t.unavailable.contains(&day))
            .filter(|t| self.week_load(t.id) < t.week_cap)
            .min_by_key(|t| self.week_load(t.id))
    }

    fn week_load(&self, teacher_id: &str) -> u32 {
        self.teacher_week_load.get(teacher_id).copied().unwrap_or(0)
    }

    fn day_load(&self, day: NaiveDate, teacher_id: &'a str) -> u32 {
        self.teacher_day_load
            .get(&(day, teacher_id))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RoomKind;
    use crate::normalize::Delimited;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn rotation_hash_matches_reference_values() {
        assert_eq!(rotation_hash(""), 0);
        assert_eq!(rotation_hash("S1"), 2622);
        assert_eq!(rotation_hash("S2"), 2623);
        assert_eq!(rotation_hash("abc"), 96354);
    }

    #[test]
    fn rotation_hash_wraps_and_takes_absolute_value() {
        // 31-bit overflow: "polygenelubricants" hashes to i32::MIN under h*31+c.
        assert_eq!(rotation_hash("polygenelubricants"), 2_147_483_648);
    }

    #[test]
    fn days_rotate_by_subject() {
        let days = [
            date(2025, 1, 6),
            date(2025, 1, 7),
            date(2025, 1, 9),
            date(2025, 1, 10),
        ];
        // 2622 % 4 == 2
        assert_eq!(
            rotated_days(&days, "S1"),
            vec![date(2025, 1, 9), date(2025, 1, 10), date(2025, 1, 6), date(2025, 1, 7)]
        );
        assert!(rotated_days(&[], "S1").is_empty());
    }

    #[test]
    fn teacher_profile_resolves_caps_and_lists() {
        let teacher = Teacher {
            id: "T1".into(),
            name: "Alice".into(),
            subjects_can_teach: Some(Delimited::from("S1;S2")),
            unavailable_dates: Some(Delimited::from("2025-01-07, nonsense")),
            max_hours_per_day: None,
            max_hours_per_week: Some(5),
        };
        let config = Config::default();
        let profile = TeacherProfile::new(&teacher, &config);
        assert!(profile.can_teach("S2"));
        assert!(!profile.can_teach("S3"));
        assert_eq!(profile.unavailable, HashSet::from([date(2025, 1, 7)]));
        assert_eq!(profile.day_cap, config.max_consecutive_per_day);
        assert_eq!(profile.week_cap, 5);
    }

    #[test]
    fn least_used_room_balances_within_a_day() {
        let rooms = vec![
            Room { id: "R1".into(), name: String::new(), kind: RoomKind::Classroom },
            Room { id: "R2".into(), name: String::new(), kind: RoomKind::Lab },
        ];
        let slots: Vec<TimeSlot> = Vec::new();
        let config = Config::default();
        let mut assigner = SlotAssigner::new(&rooms, &slots, &[], &config);
        let day = date(2025, 1, 6);

        assert_eq!(assigner.least_used_room(day, SessionType::Lecture).unwrap().id, "R1");
        assigner.room_day_usage.insert((day, "R1"), 1);
        assert_eq!(assigner.least_used_room(day, SessionType::Lecture).unwrap().id, "R2");
        // other days are unaffected
        assert_eq!(
            assigner.least_used_room(date(2025, 1, 7), SessionType::Lecture).unwrap().id,
            "R1"
        );
        assert_eq!(assigner.least_used_room(day, SessionType::Practical).unwrap().id, "R2");
    }

    #[test]
    fn booked_least_used_room_rejects_the_cell() {
        // The least-used room is the only candidate considered for a cell.
        let rooms = vec![
            Room { id: "R1".into(), name: String::new(), kind: RoomKind::Classroom },
            Room { id: "R2".into(), name: String::new(), kind: RoomKind::Classroom },
        ];
        let slots = vec![TimeSlot {
            id: "TS1".into(),
            start_time: "09:00".into(),
            end_time: "10:00".into(),
            is_break: false,
        }];
        let config = Config::default();
        let mut assigner = SlotAssigner::new(&rooms, &slots, &[], &config);
        let day = date(2025, 1, 6);
        assigner.room_booked.insert((day, "TS1", "R1"));
        let subject = Subject {
            id: "S1".into(),
            name: String::new(),
            lecture_hours_total: 1,
            tutorial_hours_total: 0,
            practical_hours_total: 0,
            priority: None,
        };
        assert!(!assigner.try_place(&subject, day, &slots[0], SessionType::Lecture));
        assert!(assigner.timetable.is_empty());
    }
}
