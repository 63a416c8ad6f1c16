use std::collections::HashSet;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::LoadError;
use crate::models::{SignInFact, WorkshopSchedule};
use crate::normalize::{cell_text, normalize_cell, title_case};
use crate::roster::SheetGrid;

/// Reads every sheet of the sign-in workbook. One sheet per workshop; the
/// first row holds the session dates, every later cell holds the free-text
/// name of a student present that day.
pub fn load_attendance(
    path: &Path,
) -> Result<(Vec<SignInFact>, Vec<WorkshopSchedule>), LoadError> {
    if !path.exists() {
        return Err(LoadError::ResourceNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut workbook = open_workbook_auto(path)?;
    let mut sheets = Vec::new();
    for name in workbook.sheet_names().to_vec() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| LoadError::Processing(format!("attendance sheet '{name}': {e}")))?;
        let grid: SheetGrid = range.rows().map(|row| row.to_vec()).collect();
        sheets.push((name, grid));
    }
    Ok(extract(&sheets))
}

/// Pure extraction over in-memory grids. Sheets too small to hold a header
/// plus data, or with no usable date column, contribute nothing. Exact
/// duplicate facts (same name, workshop, and date) collapse to one, so a
/// student signing twice on the same day counts once.
pub fn extract(sheets: &[(String, SheetGrid)]) -> (Vec<SignInFact>, Vec<WorkshopSchedule>) {
    let mut facts = Vec::new();
    let mut schedules = Vec::new();

    for (sheet_name, grid) in sheets {
        if let Some((schedule, sheet_facts)) = parse_attendance_sheet(sheet_name, grid) {
            schedules.push(schedule);
            facts.extend(sheet_facts);
        }
    }

    let mut seen = HashSet::new();
    facts.retain(|fact: &SignInFact| seen.insert(fact.clone()));
    (facts, schedules)
}

fn parse_attendance_sheet(
    sheet_name: &str,
    grid: &[Vec<Data>],
) -> Option<(WorkshopSchedule, Vec<SignInFact>)> {
    if grid.len() < 2 || grid[0].len() < 2 {
        return None;
    }

    // Every non-blank header cell marks a session column; timestamp headers
    // format as YYYY-MM-DD, anything else is used verbatim after trimming.
    let date_columns: Vec<(usize, String)> = grid[0]
        .iter()
        .enumerate()
        .filter_map(|(index, cell)| {
            let label = cell_text(cell);
            (!label.is_empty()).then_some((index, label))
        })
        .collect();

    if date_columns.is_empty() {
        return None;
    }

    let workshop_name = title_case(sheet_name);
    let mut facts = Vec::new();

    for row in &grid[1..] {
        for (column, session_date) in &date_columns {
            let name = row.get(*column).map(normalize_cell).unwrap_or_default();
            if !name.is_empty() {
                facts.push(SignInFact {
                    normalized_name: name,
                    workshop_name: workshop_name.clone(),
                    session_date: session_date.clone(),
                });
            }
        }
    }

    let schedule = WorkshopSchedule {
        workshop_name,
        total_sessions: date_columns.len() as u32,
    };
    Some((schedule, facts))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(value: &str) -> Data {
        Data::String(value.to_string())
    }

    #[test]
    fn extracts_facts_under_each_date_column() {
        let sheets = vec![(
            "Oficina_X".to_string(),
            vec![
                vec![s("2024-03-01"), s("2024-03-08"), s("2024-03-15")],
                vec![s("José Da Silva"), s("José Da Silva"), Data::Empty],
                vec![s("Maria Souza"), Data::Empty, Data::Empty],
            ],
        )];
        let (facts, schedules) = extract(&sheets);

        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].workshop_name, "Oficina X");
        assert_eq!(schedules[0].total_sessions, 3);
        assert_eq!(facts.len(), 3);
        assert_eq!(facts[0].normalized_name, "jose da silva");
        assert_eq!(facts[0].session_date, "2024-03-01");
    }

    #[test]
    fn timestamp_headers_format_as_iso_dates() {
        use calamine::{ExcelDateTime, ExcelDateTimeType};
        let sheets = vec![(
            "Oficina_X".to_string(),
            vec![
                vec![
                    Data::DateTime(ExcelDateTime::new(45352.0, ExcelDateTimeType::DateTime, false)),
                    s("aula extra"),
                ],
                vec![s("Ana"), Data::Empty],
            ],
        )];
        let (facts, schedules) = extract(&sheets);
        assert_eq!(schedules[0].total_sessions, 2);
        assert_eq!(facts[0].session_date, "2024-03-01");
    }

    #[test]
    fn duplicate_sign_ins_collapse_to_one_fact() {
        let sheets = vec![(
            "Oficina_X".to_string(),
            vec![
                vec![s("2024-03-01"), s("2024-03-01")],
                vec![s("Ana"), s("ANA ")],
            ],
        )];
        let (facts, _) = extract(&sheets);
        assert_eq!(facts.len(), 1);
    }

    #[test]
    fn skips_sheets_without_data_rows_or_columns() {
        let narrow = (
            "Oficina_A".to_string(),
            vec![vec![s("2024-03-01")], vec![s("Ana")]],
        );
        let short = ("Oficina_B".to_string(), vec![vec![s("2024-03-01"), s("2024-03-08")]]);
        let (facts, schedules) = extract(&[narrow, short]);
        assert!(facts.is_empty());
        assert!(schedules.is_empty());
    }

    #[test]
    fn blank_header_columns_do_not_count_as_sessions() {
        let sheets = vec![(
            "Oficina_X".to_string(),
            vec![
                vec![s("2024-03-01"), Data::Empty, s("2024-03-08")],
                vec![s("Ana"), s("ignored"), Data::Empty],
            ],
        )];
        let (facts, schedules) = extract(&sheets);
        assert_eq!(schedules[0].total_sessions, 2);
        // The cell under the blank header never becomes a fact.
        assert_eq!(facts.len(), 1);
    }

    #[test]
    fn sheet_with_no_date_columns_contributes_no_workshop() {
        let sheets = vec![(
            "Oficina_X".to_string(),
            vec![vec![Data::Empty, Data::Empty], vec![s("Ana"), s("Bia")]],
        )];
        let (facts, schedules) = extract(&sheets);
        assert!(schedules.is_empty());
        assert!(facts.is_empty());
    }

    #[test]
    fn schedule_counts_are_independent_of_sign_ins() {
        let sheets = vec![(
            "Oficina_X".to_string(),
            vec![
                vec![s("2024-03-01"), s("2024-03-08")],
                vec![Data::Empty, Data::Empty],
            ],
        )];
        let (facts, schedules) = extract(&sheets);
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].total_sessions, 2);
        assert!(facts.is_empty());
    }
}
