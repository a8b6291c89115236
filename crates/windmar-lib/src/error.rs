use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Convenient result alias for the WINDMAR library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a caller supplies out-of-range coordinates, speeds, distances
    /// or vessel parameters.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Raised when the search grid is exhausted without reaching the goal.
    #[error("no navigable route found from {start} to {end}")]
    RouteUnreachable { start: String, end: String },

    /// Raised when the search hits its expansion cap.
    #[error("search budget exceeded after {expansions} node expansions")]
    SearchBudgetExceeded { expansions: usize },

    /// Raised when the search passes its deadline.
    #[error("search deadline exceeded after {elapsed_ms} ms ({expansions} expansions)")]
    SearchDeadlineExceeded { elapsed_ms: u128, expansions: usize },

    /// Raised when weather-aware routing was required but no data could be supplied.
    #[error("weather data unavailable: {message}")]
    WeatherUnavailable { message: String },

    /// Raised when calibration input is too sparse or degenerate to fit.
    #[error("insufficient calibration data: {message}")]
    InsufficientData { message: String },

    /// Raised when a configuration file fails validation.
    #[error("invalid configuration in {path}: {message}")]
    InvalidConfig { path: String, message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for CSV parsing errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Wrapper for JSON parsing errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: message.into(),
        }
    }

    /// Classify the error for reporting at the boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput { .. } | Error::InvalidConfig { .. } => ErrorKind::InvalidInput,
            Error::RouteUnreachable { .. } => ErrorKind::RouteUnreachable,
            Error::SearchBudgetExceeded { .. } | Error::SearchDeadlineExceeded { .. } => {
                ErrorKind::SearchBudgetExceeded
            }
            Error::WeatherUnavailable { .. } => ErrorKind::WeatherUnavailable,
            Error::InsufficientData { .. } => ErrorKind::InsufficientData,
            Error::Io(_) => ErrorKind::Io,
            Error::Csv(_) | Error::Json(_) => ErrorKind::Parse,
        }
    }

    /// Structured kind+message pair suitable for serialising to a caller.
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Stable classification of library failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    RouteUnreachable,
    SearchBudgetExceeded,
    WeatherUnavailable,
    InsufficientData,
    Io,
    Parse,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::RouteUnreachable => "route_unreachable",
            ErrorKind::SearchBudgetExceeded => "search_budget_exceeded",
            ErrorKind::WeatherUnavailable => "weather_unavailable",
            ErrorKind::InsufficientData => "insufficient_data",
            ErrorKind::Io => "io",
            ErrorKind::Parse => "parse",
        };
        f.write_str(value)
    }
}

/// Error as it crosses the library boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}
