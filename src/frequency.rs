use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::models::{
    AttendanceRecord, DayRoster, FrequencyResult, StudentDetail, WorkshopAttendance,
    WorkshopDetail,
};
use crate::normalize::normalize;

/// The closed set of frequency query modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrequencyQuery {
    StudentName(String),
    Registration(String),
    Workshop(String),
}

impl FrequencyQuery {
    pub fn value(&self) -> &str {
        match self {
            FrequencyQuery::StudentName(v)
            | FrequencyQuery::Registration(v)
            | FrequencyQuery::Workshop(v) => v,
        }
    }
}

/// Answer shape for a frequency query, chosen by the query mode.
#[derive(Debug, Clone, Serialize)]
pub enum FrequencyAnswer {
    Students(Vec<StudentDetail>),
    Workshops(Vec<WorkshopDetail>),
}

/// Groups dense rows by (registration, workshop), sums `present`, and turns
/// the sum into a percentage of the workshop's configured session total.
/// A workshop with zero configured sessions yields 0.0, never NaN.
pub fn aggregate<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> Vec<FrequencyResult> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut results: Vec<FrequencyResult> = Vec::new();

    for record in records {
        let key = (record.registration_id.clone(), record.workshop_name.clone());
        let slot = *index.entry(key).or_insert_with(|| {
            results.push(FrequencyResult {
                registration_id: record.registration_id.clone(),
                student_name: record.student_name.clone(),
                school: record.school.clone(),
                workshop_name: record.workshop_name.clone(),
                total_sessions: record.total_sessions,
                sessions_attended: 0,
                percentage: 0.0,
            });
            results.len() - 1
        });
        results[slot].sessions_attended += record.present;
    }

    for result in &mut results {
        result.percentage = percentage(result.sessions_attended, result.total_sessions);
    }
    results
}

pub fn percentage(attended: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = f64::from(attended) / f64::from(total) * 100.0;
    (raw * 10.0).round() / 10.0
}

fn filter_records<'a>(
    records: &'a [AttendanceRecord],
    query: &FrequencyQuery,
) -> Vec<&'a AttendanceRecord> {
    match query {
        FrequencyQuery::StudentName(value) => {
            let needle = normalize(value);
            records
                .iter()
                .filter(|r| r.normalized_name.contains(&needle))
                .collect()
        }
        FrequencyQuery::Registration(value) => {
            let needle = normalize(value);
            records
                .iter()
                .filter(|r| r.registration_id.to_lowercase().contains(&needle))
                .collect()
        }
        FrequencyQuery::Workshop(value) => {
            let needle = value.trim().to_lowercase();
            records
                .iter()
                .filter(|r| r.workshop_name.to_lowercase().contains(&needle))
                .collect()
        }
    }
}

/// One entry per matched student, carrying attendance for every workshop the
/// student is enrolled in plus the distinct dates actually attended.
pub fn student_details(
    records: &[AttendanceRecord],
    query: &FrequencyQuery,
) -> Vec<StudentDetail> {
    let matched = filter_records(records, query);

    let mut order: Vec<&str> = Vec::new();
    let mut by_student: HashMap<&str, Vec<&AttendanceRecord>> = HashMap::new();
    for record in matched {
        by_student
            .entry(record.registration_id.as_str())
            .or_insert_with(|| {
                order.push(record.registration_id.as_str());
                Vec::new()
            })
            .push(record);
    }

    order
        .into_iter()
        .map(|registration| {
            let rows = &by_student[registration];
            let workshops = aggregate(rows.iter().copied())
                .into_iter()
                .map(|summary| WorkshopAttendance {
                    attended_dates: attended_dates(rows, &summary.workshop_name),
                    workshop_name: summary.workshop_name,
                    total_sessions: summary.total_sessions,
                    sessions_attended: summary.sessions_attended,
                    percentage: summary.percentage,
                })
                .collect();
            StudentDetail {
                registration_id: registration.to_string(),
                student_name: rows[0].student_name.clone(),
                school: rows[0].school.clone(),
                workshops,
            }
        })
        .collect()
}

fn attended_dates(rows: &[&AttendanceRecord], workshop: &str) -> Vec<String> {
    let mut dates = Vec::new();
    for row in rows {
        if row.present == 1 && row.workshop_name == workshop && !dates.contains(&row.session_date)
        {
            dates.push(row.session_date.clone());
        }
    }
    dates
}

/// One entry per matched workshop: per-student frequency plus the roster of
/// everyone present on each session date.
pub fn workshop_details(
    records: &[AttendanceRecord],
    query: &FrequencyQuery,
) -> Vec<WorkshopDetail> {
    let matched = filter_records(records, query);

    let mut order: Vec<&str> = Vec::new();
    let mut by_workshop: HashMap<&str, Vec<&AttendanceRecord>> = HashMap::new();
    for record in matched {
        by_workshop
            .entry(record.workshop_name.as_str())
            .or_insert_with(|| {
                order.push(record.workshop_name.as_str());
                Vec::new()
            })
            .push(record);
    }

    order
        .into_iter()
        .map(|workshop| {
            let rows = &by_workshop[workshop];

            let mut roster: BTreeMap<&str, Vec<String>> = BTreeMap::new();
            for row in rows.iter().filter(|r| r.present == 1) {
                roster
                    .entry(row.session_date.as_str())
                    .or_default()
                    .push(row.student_name.clone());
            }

            WorkshopDetail {
                workshop_name: workshop.to_string(),
                total_sessions: rows[0].total_sessions,
                results: aggregate(rows.iter().copied()),
                daily_roster: roster
                    .into_iter()
                    .map(|(session_date, present)| DayRoster {
                        session_date: session_date.to_string(),
                        present,
                    })
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        registration: &str,
        name: &str,
        workshop: &str,
        total: u32,
        date: &str,
        present: u32,
    ) -> AttendanceRecord {
        AttendanceRecord {
            registration_id: registration.to_string(),
            student_name: name.to_string(),
            school: "Escola A".to_string(),
            normalized_name: normalize(name),
            workshop_name: workshop.to_string(),
            total_sessions: total,
            session_date: date.to_string(),
            present,
        }
    }

    #[test]
    fn attendance_over_three_sessions_rounds_to_one_decimal() {
        let records = vec![
            row("001", "José Da Silva", "Oficina X", 3, "2024-03-01", 1),
            row("001", "José Da Silva", "Oficina X", 3, "2024-03-08", 1),
        ];
        let answer = student_details(&records, &FrequencyQuery::Registration("001".into()));

        assert_eq!(answer.len(), 1);
        let workshop = &answer[0].workshops[0];
        assert_eq!(workshop.sessions_attended, 2);
        assert_eq!(workshop.total_sessions, 3);
        assert_eq!(workshop.percentage, 66.7);
        assert_eq!(workshop.attended_dates, vec!["2024-03-01", "2024-03-08"]);
    }

    #[test]
    fn never_attending_still_reports_zero_percent() {
        let records = vec![row("001", "Ana", "Oficina Y", 5, "", 0)];
        let results = aggregate(&records);
        assert_eq!(results[0].sessions_attended, 0);
        assert_eq!(results[0].total_sessions, 5);
        assert_eq!(results[0].percentage, 0.0);
    }

    #[test]
    fn zero_session_workshops_never_divide() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(3, 0), 0.0);
        assert!(percentage(3, 0).is_finite());
    }

    #[test]
    fn percentage_stays_within_bounds_for_well_formed_input() {
        for attended in 0..=4u32 {
            let value = percentage(attended, 4);
            assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn aggregate_sums_exploded_rows_per_pair() {
        let records = vec![
            row("001", "Ana", "Oficina X", 4, "2024-03-01", 1),
            row("001", "Ana", "Oficina X", 4, "2024-03-08", 1),
            row("002", "Bia", "Oficina X", 4, "", 0),
        ];
        let results = aggregate(&records);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].sessions_attended, 2);
        assert_eq!(results[1].sessions_attended, 0);
    }

    #[test]
    fn name_query_matches_accentless_substrings() {
        let records = vec![row("001", "José Da Silva", "Oficina X", 3, "", 0)];
        let answer = student_details(&records, &FrequencyQuery::StudentName("jose".into()));
        assert_eq!(answer.len(), 1);
        assert_eq!(answer[0].student_name, "José Da Silva");
    }

    #[test]
    fn workshop_query_groups_daily_roster_by_date() {
        let records = vec![
            row("001", "Ana", "Oficina X", 3, "2024-03-01", 1),
            row("002", "Bia", "Oficina X", 3, "2024-03-01", 1),
            row("002", "Bia", "Oficina X", 3, "2024-03-08", 1),
            row("003", "Caio", "Oficina X", 3, "", 0),
        ];
        let answer = workshop_details(&records, &FrequencyQuery::Workshop("oficina x".into()));

        assert_eq!(answer.len(), 1);
        let detail = &answer[0];
        assert_eq!(detail.results.len(), 3);
        assert_eq!(detail.daily_roster.len(), 2);
        assert_eq!(detail.daily_roster[0].session_date, "2024-03-01");
        assert_eq!(detail.daily_roster[0].present, vec!["Ana", "Bia"]);
        assert_eq!(detail.daily_roster[1].present, vec!["Bia"]);
    }

    #[test]
    fn multiple_matched_workshops_stay_separate() {
        let records = vec![
            row("001", "Ana", "Oficina X", 3, "", 0),
            row("001", "Ana", "Oficina Xis Grande", 2, "", 0),
        ];
        let answer = workshop_details(&records, &FrequencyQuery::Workshop("oficina x".into()));
        assert_eq!(answer.len(), 2);
    }
}
