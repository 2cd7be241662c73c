//! Storage trait definitions
//!
//! Platform-agnostic interface to the removable storage medium.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};

/// Hardware selector addressing the storage medium (the chip-select line)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(pub u8);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for SlotId {
    fn from(pin: u8) -> Self {
        SlotId(pin)
    }
}

/// A block-storage medium holding a flat filesystem of log files
pub trait StorageMedium {
    /// Open file handle; bytes written to it are appended to the file
    type Handle: Write;

    /// Mount the medium behind `slot`. A single attempt, no retry.
    fn mount(&mut self, slot: SlotId) -> io::Result<()>;

    /// Whether a file with exactly this name exists
    fn exists(&self, name: &str) -> bool;

    /// Open a file for append, creating it if absent
    fn open_append(&mut self, name: &str) -> io::Result<Self::Handle>;

    /// Close a handle, committing what was written to it
    fn close(&mut self, handle: Self::Handle) -> io::Result<()>;

    /// Read a whole file back
    fn read_to_string(&self, name: &str) -> io::Result<String>;

    /// Names of all files in the root directory
    fn list(&self) -> io::Result<Vec<String>>;
}
