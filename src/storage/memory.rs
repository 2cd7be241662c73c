//! In-memory storage medium
//!
//! Simulates a card for host-side runs and tests. Clones share the same card,
//! so one handle can be given to the recorder while another injects faults
//! and inspects contents.

use super::traits::{SlotId, StorageMedium};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::Arc;

#[derive(Debug)]
struct Card {
    wired_slot: SlotId,
    present: bool,
    fail_open: bool,
    fail_write: bool,
    fail_close: bool,
    files: BTreeMap<String, Vec<u8>>,
    open_count: usize,
    close_count: usize,
}

/// Shared in-memory card
#[derive(Debug, Clone)]
pub struct MemoryMedium {
    card: Arc<Mutex<Card>>,
}

impl MemoryMedium {
    /// A present card answering on `wired_slot` only
    pub fn new(wired_slot: SlotId) -> Self {
        Self {
            card: Arc::new(Mutex::new(Card {
                wired_slot,
                present: true,
                fail_open: false,
                fail_write: false,
                fail_close: false,
                files: BTreeMap::new(),
                open_count: 0,
                close_count: 0,
            })),
        }
    }

    /// Insert or remove the card
    pub fn set_present(&self, present: bool) {
        self.card.lock().present = present;
    }

    /// Make every following `open_append` fail until cleared
    pub fn set_open_failure(&self, fail: bool) {
        self.card.lock().fail_open = fail;
    }

    /// Make writes through open handles fail until cleared
    pub fn set_write_failure(&self, fail: bool) {
        self.card.lock().fail_write = fail;
    }

    /// Make `close` report an error until cleared. The handle is still released.
    pub fn set_close_failure(&self, fail: bool) {
        self.card.lock().fail_close = fail;
    }

    /// Pre-create a file, e.g. to force a name collision
    pub fn seed_file(&self, name: &str, contents: &str) {
        self.card
            .lock()
            .files
            .insert(name.to_string(), contents.as_bytes().to_vec());
    }

    /// Names of all files on the card, sorted
    pub fn file_names(&self) -> Vec<String> {
        self.card.lock().files.keys().cloned().collect()
    }

    /// Contents of a file as text, if it exists
    pub fn contents(&self, name: &str) -> Option<String> {
        self.card
            .lock()
            .files
            .get(name)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn open_count(&self) -> usize {
        self.card.lock().open_count
    }

    pub fn close_count(&self) -> usize {
        self.card.lock().close_count
    }

    fn not_present() -> io::Error {
        io::Error::new(io::ErrorKind::NotFound, "card not present")
    }
}

/// Write handle into a file of a [`MemoryMedium`]
#[derive(Debug)]
pub struct MemoryHandle {
    card: Arc<Mutex<Card>>,
    name: String,
}

impl Write for MemoryHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut card = self.card.lock();
        if !card.present {
            return Err(MemoryMedium::not_present());
        }
        if card.fail_write {
            return Err(io::Error::new(io::ErrorKind::Other, "write failed"));
        }
        card.files
            .entry(self.name.clone())
            .or_default()
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl StorageMedium for MemoryMedium {
    type Handle = MemoryHandle;

    fn mount(&mut self, slot: SlotId) -> io::Result<()> {
        let card = self.card.lock();
        if !card.present {
            return Err(Self::not_present());
        }
        if card.wired_slot != slot {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("no response on slot {slot}"),
            ));
        }
        Ok(())
    }

    fn exists(&self, name: &str) -> bool {
        self.card.lock().files.contains_key(name)
    }

    fn open_append(&mut self, name: &str) -> io::Result<MemoryHandle> {
        let mut card = self.card.lock();
        if !card.present {
            return Err(Self::not_present());
        }
        if card.fail_open {
            return Err(io::Error::new(io::ErrorKind::Other, "open failed"));
        }
        card.open_count += 1;
        card.files.entry(name.to_string()).or_default();
        Ok(MemoryHandle {
            card: Arc::clone(&self.card),
            name: name.to_string(),
        })
    }

    fn close(&mut self, _handle: MemoryHandle) -> io::Result<()> {
        let mut card = self.card.lock();
        card.close_count += 1;
        if card.fail_close {
            return Err(io::Error::new(io::ErrorKind::Other, "close failed"));
        }
        Ok(())
    }

    fn read_to_string(&self, name: &str) -> io::Result<String> {
        self.contents(name)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, name.to_string()))
    }

    fn list(&self) -> io::Result<Vec<String>> {
        if !self.card.lock().present {
            return Err(Self::not_present());
        }
        Ok(self.file_names())
    }
}
