//! Recording state management
//!
//! Defines the recorder state machine and session tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderState {
    /// Storage medium not mounted yet
    Uninitialized,
    /// Medium mounted, no session started
    Initialized,
    /// A session is active
    Recording,
}

impl Default for RecorderState {
    fn default() -> Self {
        Self::Uninitialized
    }
}

/// Information about a recording session
///
/// A new session is created by each call to `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session index (0, 1, 2, ...)
    pub index: usize,

    /// Log file the session appends to
    pub filename: String,

    /// Clock time the file name was accepted
    pub started_at_ms: u64,

    /// Clock time after which the session is finished
    pub deadline_ms: u64,

    /// Wall-clock start, for diagnostics
    pub started_at: DateTime<Utc>,

    /// Successful `record` calls so far
    pub records_written: u64,
}

impl Session {
    /// Create a session accepted at `now_ms` lasting `duration_secs`
    pub fn new(index: usize, filename: String, now_ms: u64, duration_secs: u32) -> Self {
        Self {
            index,
            filename,
            started_at_ms: now_ms,
            deadline_ms: now_ms.saturating_add(u64::from(duration_secs) * 1000),
            started_at: Utc::now(),
            records_written: 0,
        }
    }

    pub fn is_finished_at(&self, now_ms: u64) -> bool {
        now_ms > self.deadline_ms
    }

    pub fn remaining_ms_at(&self, now_ms: u64) -> u64 {
        self.deadline_ms.saturating_sub(now_ms)
    }
}

/// Result of starting a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStart {
    /// The session now active
    pub session: Session,

    /// The session it replaced, whose file stays on the medium
    pub superseded: Option<Session>,
}
