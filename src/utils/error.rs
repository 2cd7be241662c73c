//! Error types and handling
//!
//! Common error types used across the recorder.

use crate::recorder::sample::ParseSampleError;
use crate::storage::SlotId;
use thiserror::Error;

/// Recorder-wide error type
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("storage medium on slot {slot} failed, or not present: {source}")]
    MediumUnavailable {
        slot: SlotId,
        #[source]
        source: std::io::Error,
    },

    #[error("error opening {filename}: {source}")]
    OpenFailure {
        filename: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no free file name after {attempts} attempts")]
    NameExhausted { attempts: u32 },

    #[error("storage medium has not been initialized")]
    NotInitialized,

    #[error("no recording session has been started")]
    NotStarted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad sample on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: ParseSampleError,
    },
}

impl RecorderError {
    /// Stable code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            RecorderError::MediumUnavailable { .. } => "MEDIUM_UNAVAILABLE",
            RecorderError::OpenFailure { .. } => "OPEN_FAILURE",
            RecorderError::NameExhausted { .. } => "NAME_EXHAUSTED",
            RecorderError::NotInitialized => "NOT_INITIALIZED",
            RecorderError::NotStarted => "NOT_STARTED",
            RecorderError::Io(_) => "IO_ERROR",
            RecorderError::Parse { .. } => "PARSE_ERROR",
        }
    }

    /// Whether the caller may simply try again on its next tick
    pub fn is_transient(&self) -> bool {
        matches!(self, RecorderError::OpenFailure { .. } | RecorderError::Io(_))
    }
}

/// Result type alias using RecorderError
pub type RecorderResult<T> = Result<T, RecorderError>;
