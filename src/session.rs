use std::path::{Path, PathBuf};

use crate::attendance;
use crate::error::{LoadError, QueryError};
use crate::frequency::{self, FrequencyAnswer, FrequencyQuery};
use crate::models::{AttendanceRecord, FrequencyResult, Student};
use crate::roster::{self, SearchField};
use crate::unify;

#[derive(Debug, Clone)]
enum LoadStatus {
    NotLoaded { message: String },
    Loaded { warning: Option<String> },
}

/// Holds the reconciled tables and the load state for one run. Loading is
/// all-or-nothing: any failure leaves the session not-loaded with a stored
/// message and exposes no partial tables. Queries are read-only; the tables
/// never change after a successful load, and a re-load must be explicit.
#[derive(Debug)]
pub struct DataSession {
    roster_path: PathBuf,
    attendance_path: PathBuf,
    students: Vec<Student>,
    records: Vec<AttendanceRecord>,
    status: LoadStatus,
}

impl DataSession {
    /// Runs the whole pipeline: roster build, sign-in extraction,
    /// unification. Errors are captured into the session state rather than
    /// returned, so the caller always gets a session to inspect.
    pub fn load(roster_path: &Path, attendance_path: &Path) -> Self {
        let mut session = DataSession {
            roster_path: roster_path.to_path_buf(),
            attendance_path: attendance_path.to_path_buf(),
            students: Vec::new(),
            records: Vec::new(),
            status: LoadStatus::NotLoaded {
                message: "not loaded".to_string(),
            },
        };

        match session.try_load() {
            Ok(()) => {}
            Err(err) => {
                session.students.clear();
                session.records.clear();
                session.status = LoadStatus::NotLoaded {
                    message: err.to_string(),
                };
            }
        }
        session
    }

    fn try_load(&mut self) -> Result<(), LoadError> {
        // Both inputs are checked up front so one message covers the run.
        for path in [&self.roster_path, &self.attendance_path] {
            if !path.exists() {
                return Err(LoadError::ResourceNotFound {
                    path: path.clone(),
                });
            }
        }

        self.students = roster::load_roster(&self.roster_path)?;
        let (facts, schedules) = attendance::load_attendance(&self.attendance_path)?;
        self.records = unify::unify(&self.students, &facts, &schedules);

        if self.records.is_empty() && self.students.is_empty() {
            return Err(LoadError::Processing(
                "no roster or attendance data loaded".to_string(),
            ));
        }

        self.status = if self.records.is_empty() {
            LoadStatus::Loaded {
                warning: Some(
                    "roster loaded, but attendance unification produced no rows".to_string(),
                ),
            }
        } else {
            LoadStatus::Loaded { warning: None }
        };
        Ok(())
    }

    /// Discards every table and re-runs the load from the same paths.
    #[allow(dead_code)]
    pub fn reload(&mut self) {
        let roster_path = self.roster_path.clone();
        let attendance_path = self.attendance_path.clone();
        *self = DataSession::load(&roster_path, &attendance_path);
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.status, LoadStatus::Loaded { .. })
    }

    /// The stored load error, or the warning of a partially useful load.
    pub fn status_message(&self) -> Option<&str> {
        match &self.status {
            LoadStatus::NotLoaded { message } => Some(message),
            LoadStatus::Loaded { warning } => warning.as_deref(),
        }
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn search_students(
        &self,
        field: SearchField,
        query: &str,
    ) -> Result<Vec<&Student>, QueryError> {
        if !self.is_loaded() {
            return Err(QueryError::NotLoaded);
        }
        if query.trim().is_empty() {
            return Err(QueryError::EmptyQuery);
        }
        if self.students.is_empty() {
            return Err(QueryError::NoRosterData);
        }
        Ok(roster::search_students(&self.students, field, query))
    }

    pub fn frequency(&self, query: &FrequencyQuery) -> Result<FrequencyAnswer, QueryError> {
        if !self.is_loaded() {
            return Err(QueryError::NotLoaded);
        }
        if query.value().trim().is_empty() {
            return Err(QueryError::EmptyQuery);
        }
        if self.records.is_empty() {
            return Err(QueryError::NoAttendanceData);
        }
        let answer = match query {
            FrequencyQuery::Workshop(_) => {
                FrequencyAnswer::Workshops(frequency::workshop_details(&self.records, query))
            }
            _ => FrequencyAnswer::Students(frequency::student_details(&self.records, query)),
        };
        Ok(answer)
    }

    /// The full aggregated table, one row per (student, workshop) pair.
    pub fn frequency_table(&self) -> Result<Vec<FrequencyResult>, QueryError> {
        if !self.is_loaded() {
            return Err(QueryError::NotLoaded);
        }
        if self.records.is_empty() {
            return Err(QueryError::NoAttendanceData);
        }
        Ok(frequency::aggregate(&self.records))
    }
}
