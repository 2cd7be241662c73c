//! Directory-backed storage medium
//!
//! Maps the card's flat filesystem onto a directory of the host, e.g. the
//! mount point of an SD card reader.

use super::traits::{SlotId, StorageMedium};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Storage medium rooted at a host directory
#[derive(Debug, Clone)]
pub struct FsMedium {
    root: PathBuf,
    slot: Option<SlotId>,
}

impl FsMedium {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            slot: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Slot of the last successful mount
    pub fn slot(&self) -> Option<SlotId> {
        self.slot
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl StorageMedium for FsMedium {
    type Handle = File;

    fn mount(&mut self, slot: SlotId) -> io::Result<()> {
        self.slot = None;
        let meta = fs::metadata(&self.root)?;
        if !meta.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", self.root.display()),
            ));
        }
        // Probe readability the way a card init touches the root directory
        fs::read_dir(&self.root)?;
        self.slot = Some(slot);
        tracing::debug!("Mounted {:?} on slot {}", self.root, slot);
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    fn open_append(&mut self, name: &str) -> io::Result<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(name))
    }

    fn close(&mut self, handle: File) -> io::Result<()> {
        handle.sync_data()
    }

    fn read_to_string(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.path(name))
    }

    fn list(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }
}
