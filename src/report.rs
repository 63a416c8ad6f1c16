use std::fmt::Write;

use crate::models::{Student, StudentDetail, WorkshopDetail};

/// Text block for a roster search, one section per matched student.
pub fn students_report(students: &[&Student], query: &str) -> String {
    let mut output = String::new();

    if students.is_empty() {
        let _ = writeln!(output, "No students found for '{query}'.");
        return output;
    }

    let _ = writeln!(
        output,
        "--- Found {} student(s) matching '{}' ---",
        students.len(),
        query
    );

    for (position, student) in students.iter().enumerate() {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "--- Student {} (registration {}) ---",
            position + 1,
            student.registration_id
        );
        let _ = writeln!(output, "Name: {}", student.name);
        let _ = writeln!(output, "Registration: {}", student.registration_id);
        let _ = writeln!(output, "CPF: {}", student.cpf);
        let _ = writeln!(output, "Mother: {}", student.mother_name);
        let _ = writeln!(output, "Father: {}", student.father_name);
        let _ = writeln!(output, "Class: {}", student.class_label);
        let _ = writeln!(output, "Phone: {}", student.phone);
        let _ = writeln!(output, "School: {}", student.school);
        let _ = writeln!(output, "Authorization: {}", student.authorization_note);
    }

    output
}

/// Text block for a by-student (or by-registration) frequency query.
pub fn student_frequency_report(details: &[StudentDetail], query: &str) -> String {
    let mut output = String::new();

    if details.is_empty() {
        let _ = writeln!(output, "No attendance records found for '{query}'.");
        return output;
    }

    for detail in details {
        let _ = writeln!(output, "--- Student details: {} ---", detail.student_name);
        let _ = writeln!(output, "School: {}", detail.school);
        let _ = writeln!(output, "Registration: {}", detail.registration_id);
        let _ = writeln!(output);
        let _ = writeln!(output, "--- Workshop attendance ---");

        for workshop in &detail.workshops {
            let _ = writeln!(
                output,
                "Workshop: {} | attendance {}/{} ({:.1}%)",
                workshop.workshop_name,
                workshop.sessions_attended,
                workshop.total_sessions,
                workshop.percentage
            );
            if workshop.attended_dates.is_empty() {
                let _ = writeln!(output, "Dates attended: none recorded");
            } else {
                let _ = writeln!(
                    output,
                    "Dates attended: {}",
                    workshop.attended_dates.join(", ")
                );
            }
        }
        let _ = writeln!(output);
    }

    output
}

/// Text block for a by-workshop frequency query: per-student percentages
/// followed by the full sign-in roster for each session date.
pub fn workshop_frequency_report(details: &[WorkshopDetail], query: &str) -> String {
    let mut output = String::new();

    if details.is_empty() {
        let _ = writeln!(output, "No attendance records found for '{query}'.");
        return output;
    }

    for detail in details {
        let _ = writeln!(output, "--- Workshop details: {} ---", detail.workshop_name);
        let _ = writeln!(output, "Total scheduled sessions: {}", detail.total_sessions);
        let _ = writeln!(output);
        let _ = writeln!(output, "--- Attendance per student ---");

        for result in &detail.results {
            let _ = writeln!(
                output,
                "Student: {} ({}) | {}/{} ({:.1}%)",
                result.student_name,
                result.school,
                result.sessions_attended,
                result.total_sessions,
                result.percentage
            );
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "--- Sign-ins per session ---");

        if detail.daily_roster.is_empty() {
            let _ = writeln!(output, "No sign-ins recorded.");
        } else {
            for day in &detail.daily_roster {
                let _ = writeln!(
                    output,
                    "Date {} ({} present)",
                    day.session_date,
                    day.present.len()
                );
                let _ = writeln!(output, "{}", day.present.join(", "));
            }
        }
        let _ = writeln!(output);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayRoster, FrequencyResult, WorkshopAttendance};
    use std::collections::BTreeMap;

    fn sample_student() -> Student {
        Student {
            registration_id: "001".to_string(),
            name: "José Da Silva".to_string(),
            normalized_name: "jose da silva".to_string(),
            school: "Escola A".to_string(),
            school_key: "escola_a".to_string(),
            cpf: "111.222.333-44".to_string(),
            mother_name: "Maria".to_string(),
            father_name: "João".to_string(),
            class_label: "3B".to_string(),
            phone: "9999-0000".to_string(),
            authorization_note: "Autorizado".to_string(),
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn students_report_lists_every_declared_field() {
        let student = sample_student();
        let output = students_report(&[&student], "jose");
        for fragment in [
            "Found 1 student(s)",
            "Name: José Da Silva",
            "Registration: 001",
            "CPF: 111.222.333-44",
            "Mother: Maria",
            "School: Escola A",
        ] {
            assert!(output.contains(fragment), "missing {fragment:?} in {output}");
        }
    }

    #[test]
    fn empty_search_renders_a_message_not_an_error() {
        let output = students_report(&[], "zé");
        assert!(output.contains("No students found for 'zé'."));
    }

    #[test]
    fn student_frequency_report_shows_ratio_and_dates() {
        let details = vec![StudentDetail {
            registration_id: "001".to_string(),
            student_name: "José Da Silva".to_string(),
            school: "Escola A".to_string(),
            workshops: vec![WorkshopAttendance {
                workshop_name: "Oficina X".to_string(),
                total_sessions: 3,
                sessions_attended: 2,
                percentage: 66.7,
                attended_dates: vec!["2024-03-01".to_string(), "2024-03-08".to_string()],
            }],
        }];
        let output = student_frequency_report(&details, "001");
        assert!(output.contains("Workshop: Oficina X | attendance 2/3 (66.7%)"));
        assert!(output.contains("Dates attended: 2024-03-01, 2024-03-08"));
    }

    #[test]
    fn workshop_frequency_report_includes_daily_roster() {
        let details = vec![WorkshopDetail {
            workshop_name: "Oficina X".to_string(),
            total_sessions: 3,
            results: vec![FrequencyResult {
                registration_id: "001".to_string(),
                student_name: "Ana".to_string(),
                school: "Escola A".to_string(),
                workshop_name: "Oficina X".to_string(),
                total_sessions: 3,
                sessions_attended: 0,
                percentage: 0.0,
            }],
            daily_roster: vec![DayRoster {
                session_date: "2024-03-01".to_string(),
                present: vec!["Ana".to_string(), "Bia".to_string()],
            }],
        }];
        let output = workshop_frequency_report(&details, "oficina x");
        assert!(output.contains("Total scheduled sessions: 3"));
        assert!(output.contains("Student: Ana (Escola A) | 0/3 (0.0%)"));
        assert!(output.contains("Date 2024-03-01 (2 present)"));
        assert!(output.contains("Ana, Bia"));
    }
}
