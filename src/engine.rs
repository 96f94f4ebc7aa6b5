//! The reconciliation engine: per-student history/stats caches, the
//! date-scoped edit session, and the deterministic bulk-submission builder.
//!
//! All mutation funnels through the operations on `EngineState`. Fetches are
//! represented as tickets tagged with the canonical date they were issued
//! for; completions whose tag no longer matches the current selection are
//! dropped instead of merged.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{dates, status};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterStudent {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRoster {
    pub id: i64,
    pub name: String,
    pub teacher_id: i64,
    /// Roster order is submission order; ids are unique within a roster.
    pub students: Vec<RosterStudent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    #[serde(default)]
    pub member_class_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub student_id: i64,
    pub course_id: i64,
    pub class_id: i64,
    /// Canonical form, `yyyy-MM-dd`.
    pub date: String,
    pub status: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentRecord {
    pub date: String,
    pub status: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseStatistic {
    pub student_id: i64,
    pub course_id: i64,
    pub total_classes: i64,
    pub present_count: i64,
    pub absent_count: i64,
    pub late_count: i64,
    pub attendance_percentage: f64,
    #[serde(default)]
    pub recent_attendance: Vec<RecentRecord>,
}

/// Stats are cached per (student, class); one list entry per course the
/// student takes in that class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatsKey {
    pub student_id: i64,
    pub class_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntry {
    /// Display vocabulary, not the wire code.
    pub status: String,
    pub comment: String,
}

impl SessionEntry {
    fn default_present() -> Self {
        SessionEntry {
            status: status::DISPLAY_PRESENT.to_string(),
            comment: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FetchKind {
    History,
    Stats,
    Courses,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchTicket {
    pub id: String,
    pub kind: FetchKind,
    pub student_id: i64,
    pub class_id: i64,
    /// Canonical selected date at issue time; completions are dropped when
    /// this no longer matches the current selection.
    pub date_tag: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    pub applied: bool,
    pub stale: bool,
}

impl MergeOutcome {
    const APPLIED: MergeOutcome = MergeOutcome {
        applied: true,
        stale: false,
    };
    const STALE: MergeOutcome = MergeOutcome {
        applied: false,
        stale: true,
    };
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceUpsertCommand {
    pub student_id: i64,
    pub date: String,
    pub status: String,
    pub comment: String,
    pub class_id: i64,
    pub course_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditError {
    DateLocked,
    UnknownStudent,
}

pub struct EngineState {
    rosters: Vec<ClassRoster>,
    catalog: Vec<Course>,
    ledger: HashMap<i64, Vec<AttendanceRecord>>,
    stats: HashMap<StatsKey, Vec<CourseStatistic>>,
    student_courses: HashMap<i64, Vec<Course>>,
    session: HashMap<i64, SessionEntry>,
    selected_date: String,
    tickets: HashMap<String, FetchTicket>,
    status_message: Option<String>,
}

impl EngineState {
    pub fn new(selected_date: String) -> Self {
        EngineState {
            rosters: Vec::new(),
            catalog: Vec::new(),
            ledger: HashMap::new(),
            stats: HashMap::new(),
            student_courses: HashMap::new(),
            session: HashMap::new(),
            selected_date,
            tickets: HashMap::new(),
            status_message: None,
        }
    }

    pub fn rosters(&self) -> &[ClassRoster] {
        &self.rosters
    }

    pub fn selected_date(&self) -> &str {
        &self.selected_date
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn session_entry(&self, student_id: i64) -> Option<&SessionEntry> {
        self.session.get(&student_id)
    }

    /// teacherId of the roster owner; the first roster's value, as the host
    /// needs it to fetch the course catalog.
    pub fn teacher_id(&self) -> Option<i64> {
        self.rosters.first().map(|r| r.teacher_id)
    }

    /// Replace the roster set. The edit session is reseeded wholesale and a
    /// fresh fetch fan-out is issued for the current date.
    pub fn load_rosters(&mut self, rosters: Vec<ClassRoster>) -> Vec<FetchTicket> {
        self.rosters = rosters;
        self.seed_session();
        self.fan_out()
    }

    pub fn load_catalog(&mut self, courses: Vec<Course>) {
        self.catalog = courses;
    }

    /// Switch the selected date (picker callback form). Clearing the session
    /// happens before any ticket for the new date is minted.
    pub fn select_date(&mut self, picker: &str) -> Result<Vec<FetchTicket>, dates::DateFormatError> {
        self.selected_date = dates::picker_to_canonical(picker)?;
        self.seed_session();
        Ok(self.fan_out())
    }

    /// Locked/Editable projection. Stateless; malformed dates stay editable.
    pub fn is_locked(&self, today: chrono::NaiveDate) -> bool {
        dates::is_past(&self.selected_date, today)
    }

    /// Seed the edit session from the ledger: every roster student gets the
    /// internalized first record matching the selected date, or the default.
    /// Idempotent for an unchanged ledger and date.
    pub fn seed_session(&mut self) {
        let mut seeded = HashMap::new();
        for roster in &self.rosters {
            for student in &roster.students {
                seeded.insert(student.id, self.seeded_entry(student.id));
            }
        }
        self.session = seeded;
    }

    fn seeded_entry(&self, student_id: i64) -> SessionEntry {
        match self.ledger_match(student_id) {
            Some(record) => SessionEntry {
                status: status::internalize(&record.status).to_string(),
                comment: record.comment.clone().unwrap_or_default(),
            },
            None => SessionEntry::default_present(),
        }
    }

    /// First ledger record for the selected date. The remote source is
    /// expected to hold at most one per (student, date); duplicates are not
    /// collapsed here, the first match wins.
    fn ledger_match(&self, student_id: i64) -> Option<&AttendanceRecord> {
        self.ledger
            .get(&student_id)?
            .iter()
            .find(|r| r.date == self.selected_date)
    }

    fn history_range(&self) -> (String, String) {
        match dates::parse_canonical(&self.selected_date) {
            Ok(d) => {
                let year = d.format("%Y");
                (format!("{year}-01-01"), format!("{year}-12-31"))
            }
            Err(_) => (String::new(), String::new()),
        }
    }

    /// Issue the per-student fetch fan-out for the current (rosters, date).
    /// Tickets from a previous date are forgotten; their completions will
    /// land as stale.
    fn fan_out(&mut self) -> Vec<FetchTicket> {
        let tag = self.selected_date.clone();
        self.tickets.retain(|_, t| t.date_tag == tag);
        let (start_date, end_date) = self.history_range();
        let mut plan = Vec::new();
        for roster in &self.rosters {
            for student in &roster.students {
                for kind in [FetchKind::History, FetchKind::Stats, FetchKind::Courses] {
                    plan.push(FetchTicket {
                        id: Uuid::new_v4().to_string(),
                        kind,
                        student_id: student.id,
                        class_id: roster.id,
                        date_tag: tag.clone(),
                        start_date: start_date.clone(),
                        end_date: end_date.clone(),
                    });
                }
            }
        }
        for ticket in &plan {
            self.tickets.insert(ticket.id.clone(), ticket.clone());
        }
        plan
    }

    fn take_live_ticket(&mut self, ticket_id: &str) -> Option<FetchTicket> {
        let ticket = self.tickets.remove(ticket_id)?;
        if ticket.date_tag != self.selected_date {
            return None;
        }
        Some(ticket)
    }

    /// Merge a completed history fetch. The student's ledger entry is
    /// replaced wholesale (last successful fetch wins) and the session entry
    /// for that student is refreshed if a record matches the selected date.
    pub fn merge_history(
        &mut self,
        ticket_id: &str,
        records: Vec<AttendanceRecord>,
    ) -> MergeOutcome {
        let Some(ticket) = self.take_live_ticket(ticket_id) else {
            return MergeOutcome::STALE;
        };
        self.ledger.insert(ticket.student_id, records);
        self.overlay_session(ticket.student_id);
        MergeOutcome::APPLIED
    }

    fn overlay_session(&mut self, student_id: i64) {
        if !self.session.contains_key(&student_id) {
            return;
        }
        let matched = self.ledger_match(student_id).map(|record| SessionEntry {
            status: status::internalize(&record.status).to_string(),
            comment: record.comment.clone().unwrap_or_default(),
        });
        if let Some(entry) = matched {
            self.session.insert(student_id, entry);
        }
    }

    pub fn merge_stats(&mut self, ticket_id: &str, stats: Vec<CourseStatistic>) -> MergeOutcome {
        let Some(ticket) = self.take_live_ticket(ticket_id) else {
            return MergeOutcome::STALE;
        };
        let key = StatsKey {
            student_id: ticket.student_id,
            class_id: ticket.class_id,
        };
        self.stats.insert(key, stats);
        MergeOutcome::APPLIED
    }

    pub fn merge_courses(&mut self, ticket_id: &str, courses: Vec<Course>) -> MergeOutcome {
        let Some(ticket) = self.take_live_ticket(ticket_id) else {
            return MergeOutcome::STALE;
        };
        self.student_courses.insert(ticket.student_id, courses);
        MergeOutcome::APPLIED
    }

    /// A failed fetch retires its ticket and nothing else; whatever was
    /// cached for that key stays visible. Returns the ticket for logging.
    pub fn fetch_failed(&mut self, ticket_id: &str) -> Option<FetchTicket> {
        self.tickets.remove(ticket_id)
    }

    pub fn set_status(
        &mut self,
        student_id: i64,
        display: &str,
        today: chrono::NaiveDate,
    ) -> Result<(), EditError> {
        if self.is_locked(today) {
            return Err(EditError::DateLocked);
        }
        let entry = self
            .session
            .get_mut(&student_id)
            .ok_or(EditError::UnknownStudent)?;
        entry.status = display.to_string();
        Ok(())
    }

    pub fn set_comment(
        &mut self,
        student_id: i64,
        comment: &str,
        today: chrono::NaiveDate,
    ) -> Result<(), EditError> {
        if self.is_locked(today) {
            return Err(EditError::DateLocked);
        }
        let entry = self
            .session
            .get_mut(&student_id)
            .ok_or(EditError::UnknownStudent)?;
        entry.comment = comment.to_string();
        Ok(())
    }

    /// First catalog course whose membership includes the roster, else the
    /// sentinel 0. Multi-course rosters collapse to one course id per
    /// submission.
    pub fn resolved_course_id(&self, roster_id: i64) -> i64 {
        self.catalog
            .iter()
            .find(|c| c.member_class_ids.contains(&roster_id))
            .map(|c| c.id)
            .unwrap_or(0)
    }

    /// One upsert command per roster student, roster order then student
    /// order. Two calls against identical state yield an identical sequence.
    pub fn build_bulk_commands(&self) -> Vec<AttendanceUpsertCommand> {
        let mut commands = Vec::new();
        for roster in &self.rosters {
            let course_id = self.resolved_course_id(roster.id);
            for student in &roster.students {
                let entry = self.session.get(&student.id);
                let display = entry
                    .map(|e| e.status.as_str())
                    .unwrap_or(status::DISPLAY_PRESENT);
                commands.push(AttendanceUpsertCommand {
                    student_id: student.id,
                    date: self.selected_date.clone(),
                    status: status::externalize(display).to_string(),
                    comment: entry.map(|e| e.comment.clone()).unwrap_or_default(),
                    class_id: roster.id,
                    course_id,
                });
            }
        }
        commands
    }

    pub fn submission_succeeded(&mut self, saved_count: i64) {
        self.status_message = Some(format!("{} yoklama kaydı kaydedildi", saved_count));
    }

    /// The session is left untouched so the teacher can correct and resubmit.
    pub fn submission_failed(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
    }

    /// Ledger rows for one (student, class, course), for report generation.
    /// Pure read; the cache is not touched.
    pub fn history_slice(
        &self,
        student_id: i64,
        class_id: i64,
        course_id: i64,
    ) -> Vec<AttendanceRecord> {
        self.ledger
            .get(&student_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.class_id == class_id && r.course_id == course_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Stats entries for one (student, class) narrowed to a course.
    pub fn stats_slice(
        &self,
        student_id: i64,
        class_id: i64,
        course_id: i64,
    ) -> Vec<CourseStatistic> {
        self.stats
            .get(&StatsKey {
                student_id,
                class_id,
            })
            .map(|entries| {
                entries
                    .iter()
                    .filter(|s| s.course_id == course_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn courses_for_student(&self, student_id: i64) -> &[Course] {
        self.student_courses
            .get(&student_id)
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }
}
