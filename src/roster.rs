use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use clap::ValueEnum;

use crate::error::LoadError;
use crate::models::Student;
use crate::normalize::{cell_text, collapse_whitespace, normalize, title_case, underscore_key};

/// Owned copy of one sheet's used area, row-major.
pub type SheetGrid = Vec<Vec<Data>>;

/// Roster fields exposed to the search interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SearchField {
    Name,
    Registration,
    Cpf,
    Mother,
    Father,
    Class,
    Phone,
    School,
}

/// Reads every sheet of the roster workbook. A missing file or an unreadable
/// sheet is fatal; sheets are never silently skipped.
pub fn load_roster(path: &Path) -> Result<Vec<Student>, LoadError> {
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
            .map_err(|e| LoadError::Processing(format!("roster sheet '{name}': {e}")))?;
        let grid: SheetGrid = range.rows().map(|row| row.to_vec()).collect();
        sheets.push((name, grid));
    }
    Ok(build_roster(&sheets))
}

/// Concatenates all sheets (one school per sheet) into the canonical student
/// table. Registration ids are trimmed and uppercased before the keep-first
/// dedup, so the same student exported into two sheets collapses to the row
/// from the earlier sheet. Rows with a blank name are retained; consumers
/// that need a matchable name filter on `normalized_name`.
pub fn build_roster(sheets: &[(String, SheetGrid)]) -> Vec<Student> {
    let mut students = Vec::new();
    for (sheet_name, grid) in sheets {
        parse_roster_sheet(sheet_name, grid, &mut students);
    }

    let mut seen = HashSet::new();
    students.retain(|student: &Student| seen.insert(student.registration_id.clone()));
    students
}

fn parse_roster_sheet(sheet_name: &str, grid: &[Vec<Data>], out: &mut Vec<Student>) {
    let Some((header, body)) = grid.split_first() else {
        return;
    };

    let columns: Vec<String> = header
        .iter()
        .map(|cell| clean_header(&cell_text(cell)))
        .collect();
    let school = title_case(sheet_name);
    let school_key = underscore_key(sheet_name);

    for row in body {
        let mut student = Student {
            registration_id: String::new(),
            name: String::new(),
            normalized_name: String::new(),
            school: school.clone(),
            school_key: school_key.clone(),
            cpf: String::new(),
            mother_name: String::new(),
            father_name: String::new(),
            class_label: String::new(),
            phone: String::new(),
            authorization_note: String::new(),
            extra: BTreeMap::new(),
        };

        for (column, cell) in columns.iter().zip(row.iter()) {
            let value = cell_text(cell);
            match column.as_str() {
                "aluno" => student.name = value,
                "matricula" => student.registration_id = value.to_uppercase(),
                "cpf" => student.cpf = value,
                "mae" => student.mother_name = value,
                "pai" => student.father_name = value,
                "turma" => student.class_label = value,
                "telefone" => student.phone = value,
                "direcao" => student.authorization_note = collapse_whitespace(&value),
                "" => {}
                other => {
                    student.extra.insert(other.to_string(), value);
                }
            }
        }

        student.normalized_name = normalize(&student.name);
        out.push(student);
    }
}

/// Header aliases are matched case- and spacing-insensitively.
fn clean_header(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// Accent/case-insensitive substring search over one roster field.
pub fn search_students<'a>(
    students: &'a [Student],
    field: SearchField,
    query: &str,
) -> Vec<&'a Student> {
    let needle = match field {
        SearchField::School => underscore_key(query),
        _ => normalize(query),
    };

    students
        .iter()
        .filter(|student| match field {
            SearchField::Name => student.normalized_name.contains(&needle),
            SearchField::Registration => {
                student.registration_id.to_lowercase().contains(&needle)
            }
            SearchField::Cpf => normalize(&student.cpf).contains(&needle),
            SearchField::Mother => normalize(&student.mother_name).contains(&needle),
            SearchField::Father => normalize(&student.father_name).contains(&needle),
            SearchField::Class => normalize(&student.class_label).contains(&needle),
            SearchField::Phone => normalize(&student.phone).contains(&needle),
            SearchField::School => student.school_key.contains(&needle),
        })
        .collect()
}
