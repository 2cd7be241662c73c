//! Persisted sample lines
//!
//! Each line of a session file is `<millis-since-boot>\t<value>`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One recorded sensor reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// Clock time of the write
    pub timestamp_ms: u64,

    /// Raw sensor value
    pub value: i32,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseSampleError {
    #[error("expected two tab-separated fields, found {0}")]
    FieldCount(usize),

    #[error("invalid timestamp {0:?}")]
    Timestamp(String),

    #[error("invalid value {0:?}")]
    Value(String),
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.timestamp_ms, self.value)
    }
}

impl FromStr for Sample {
    type Err = ParseSampleError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let fields: Vec<&str> = line.split('\t').collect();
        let [timestamp, value] = fields.as_slice() else {
            return Err(ParseSampleError::FieldCount(fields.len()));
        };

        Ok(Sample {
            timestamp_ms: timestamp
                .parse()
                .map_err(|_| ParseSampleError::Timestamp(timestamp.to_string()))?,
            value: value
                .parse()
                .map_err(|_| ParseSampleError::Value(value.to_string()))?,
        })
    }
}

/// Parse a whole session file. On failure returns the 1-based line number.
pub fn parse_log(text: &str) -> Result<Vec<Sample>, (usize, ParseSampleError)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| line.parse().map_err(|e| (i + 1, e)))
        .collect()
}
