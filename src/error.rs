use thiserror::Error;

/// Rejected user input. The operation that produced it made no change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("task title must not be empty")]
    EmptyTitle,
    #[error("end time {end} must be after start time {start}")]
    EndNotAfterStart { start: String, end: String },
    #[error("custom repeat needs at least one weekday")]
    EmptyWeekdays,
    #[error("weekday index {0} is out of range (0=Sun..6=Sat)")]
    WeekdayOutOfRange(u8),
    #[error("unknown weekday '{0}'")]
    UnknownWeekday(String),
    #[error("invalid color '{0}', expected #rgb or #rrggbb")]
    InvalidColor(String),
    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("unknown repeat '{0}', expected none, daily, weekly, monthly or custom")]
    UnknownRepeat(String),
    #[error("project name must not be empty")]
    EmptyProjectName,
    #[error("project '{0}' already exists")]
    DuplicateProject(String),
    #[error("project '{0}' is protected")]
    ProtectedProject(String),
}

/// Errors returned by [`crate::session::Session`] operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("task '{0}' not found")]
    TaskNotFound(String),
    #[error("task id '{0}' is ambiguous")]
    AmbiguousTask(String),
    #[error("project '{0}' not found")]
    ProjectNotFound(String),
}

/// Errors from reading or writing snapshot documents.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors talking to the remote document store.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("remote sync is not configured (missing {0})")]
    NotConfigured(&'static str),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("remote store answered {0}")]
    Status(u16),
    #[error("remote document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
