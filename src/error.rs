use std::path::PathBuf;

use thiserror::Error;

/// Fatal load-time failures. Any of these leaves the session in the
/// not-loaded state with the rendered message; nothing partial is exposed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("spreadsheet not found: {} (check the 'dados/' paths)", path.display())]
    ResourceNotFound { path: PathBuf },

    #[error("failed to process spreadsheet data: {0}")]
    Processing(String),
}

impl From<calamine::Error> for LoadError {
    fn from(err: calamine::Error) -> Self {
        LoadError::Processing(err.to_string())
    }
}

/// Per-query failures. Reported as a result message at the CLI boundary;
/// never affect the loaded tables or subsequent queries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("no data loaded")]
    NotLoaded,

    #[error("search value is empty")]
    EmptyQuery,

    #[error("no roster data available")]
    NoRosterData,

    #[error("no attendance records available")]
    NoAttendanceData,
}
