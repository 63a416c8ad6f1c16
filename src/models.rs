use std::collections::BTreeMap;

use serde::Serialize;

/// One roster row after column mapping and registration dedup. Built once at
/// load time, read-only afterward.
#[derive(Debug, Clone, Serialize)]
pub struct Student {
    pub registration_id: String,
    pub name: String,
    pub normalized_name: String,
    pub school: String,
    pub school_key: String,
    pub cpf: String,
    pub mother_name: String,
    pub father_name: String,
    pub class_label: String,
    pub phone: String,
    pub authorization_note: String,
    /// Source columns with no alias mapping, passed through untouched.
    pub extra: BTreeMap<String, String>,
}

/// One attendance sheet that yielded at least one date column.
#[derive(Debug, Clone, Serialize)]
pub struct WorkshopSchedule {
    pub workshop_name: String,
    pub total_sessions: u32,
}

/// Sparse sign-in observation: this name appeared under this date column.
/// Deduplicated on the full triple before unification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SignInFact {
    pub normalized_name: String,
    pub workshop_name: String,
    pub session_date: String,
}

/// Dense fact row. Every (usable student, scheduled workshop) pair produces
/// at least one record; attended pairs produce one record per distinct date.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceRecord {
    pub registration_id: String,
    pub student_name: String,
    pub school: String,
    pub normalized_name: String,
    pub workshop_name: String,
    pub total_sessions: u32,
    /// Empty when the pair has no sign-in.
    pub session_date: String,
    pub present: u32,
}

/// Aggregated attendance for one (student, workshop) pair.
#[derive(Debug, Clone, Serialize)]
pub struct FrequencyResult {
    pub registration_id: String,
    pub student_name: String,
    pub school: String,
    pub workshop_name: String,
    pub total_sessions: u32,
    pub sessions_attended: u32,
    pub percentage: f64,
}

/// Frequency answer for one matched student: one entry per workshop.
#[derive(Debug, Clone, Serialize)]
pub struct StudentDetail {
    pub registration_id: String,
    pub student_name: String,
    pub school: String,
    pub workshops: Vec<WorkshopAttendance>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkshopAttendance {
    pub workshop_name: String,
    pub total_sessions: u32,
    pub sessions_attended: u32,
    pub percentage: f64,
    pub attended_dates: Vec<String>,
}

/// Frequency answer for one matched workshop: per-student results plus the
/// day-by-day sign-in roster.
#[derive(Debug, Clone, Serialize)]
pub struct WorkshopDetail {
    pub workshop_name: String,
    pub total_sessions: u32,
    pub results: Vec<FrequencyResult>,
    pub daily_roster: Vec<DayRoster>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayRoster {
    pub session_date: String,
    pub present: Vec<String>,
}
