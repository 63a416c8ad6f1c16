use std::collections::{HashMap, HashSet};

use crate::models::{AttendanceRecord, SignInFact, Student, WorkshopSchedule};

/// Builds the dense fact table: the full cross product of usable students
/// and scheduled workshops, left-joined with the sign-in facts. Pairs with
/// no sign-in get a single zero row; attended pairs explode into one row per
/// distinct date. With no facts at all the output is still the full
/// zero-attendance cross product.
///
/// Cross-joining enrolled students against scheduled workshops (never raw
/// sign-in names) keeps the row count linear in students x workshops.
pub fn unify(
    students: &[Student],
    facts: &[SignInFact],
    schedules: &[WorkshopSchedule],
) -> Vec<AttendanceRecord> {
    let mut dates_by_pair: HashMap<(&str, &str), Vec<&str>> = HashMap::new();
    for fact in facts {
        dates_by_pair
            .entry((fact.normalized_name.as_str(), fact.workshop_name.as_str()))
            .or_default()
            .push(fact.session_date.as_str());
    }

    let mut seen_pairs = HashSet::new();
    let mut records = Vec::new();

    for student in students {
        if student.normalized_name.is_empty() {
            continue;
        }
        if !seen_pairs.insert((
            student.normalized_name.clone(),
            student.registration_id.clone(),
        )) {
            continue;
        }

        for schedule in schedules {
            let key = (
                student.normalized_name.as_str(),
                schedule.workshop_name.as_str(),
            );
            match dates_by_pair.get(&key) {
                Some(dates) => {
                    for date in dates {
                        records.push(record(student, schedule, date, 1));
                    }
                }
                None => records.push(record(student, schedule, "", 0)),
            }
        }
    }

    records
}

fn record(
    student: &Student,
    schedule: &WorkshopSchedule,
    session_date: &str,
    present: u32,
) -> AttendanceRecord {
    AttendanceRecord {
        registration_id: student.registration_id.clone(),
        student_name: student.name.clone(),
        school: student.school.clone(),
        normalized_name: student.normalized_name.clone(),
        workshop_name: schedule.workshop_name.clone(),
        total_sessions: schedule.total_sessions,
        session_date: session_date.to_string(),
        present,
    }
}
