//! History stores: a bounded in-memory ring and an append-only JSONL file.

use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::traits::HistoryStore;
use crate::types::HistoryEntry;

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    m.lock().map_err(|_| Error::Storage("history lock poisoned".into()))
}

/// Keeps the most recent `capacity` entries; older ones are evicted.
pub struct InMemoryHistory {
    entries: Mutex<VecDeque<HistoryEntry>>,
    capacity: usize,
}

impl InMemoryHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { entries: Mutex::new(VecDeque::with_capacity(capacity)), capacity }
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self { Self::new(50) }
}

impl HistoryStore for InMemoryHistory {
    fn append(&self, entry: HistoryEntry) -> Result<()> {
        let mut entries = lock(&self.entries)?;
        if entries.len() == self.capacity { entries.pop_front(); }
        entries.push_back(entry);
        Ok(())
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        Ok(lock(&self.entries)?.iter().rev().take(limit).cloned().collect())
    }

    fn len(&self) -> Result<usize> { Ok(lock(&self.entries)?.len()) }

    fn clear(&self) -> Result<()> {
        lock(&self.entries)?.clear();
        Ok(())
    }
}

/// One JSON object per line. Appends and `clear` are serialized by an
/// internal mutex; reads take no lock.
pub struct JsonlHistory {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlHistory {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::Storage(format!("{}: {e}", parent.display())))?;
        }
        Ok(Self { path, write_lock: Mutex::new(()) })
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Every complete line currently in the file. Appends are single
    /// whole-line writes, so a reader never needs the write lock; a trailing
    /// line still being written is left for the next read.
    fn read_all(&self) -> Result<Vec<HistoryEntry>> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::Storage(format!("{}: {e}", self.path.display()))),
        };
        let complete = bytes.iter().rposition(|b| *b == b'\n').map_or(0, |i| i + 1);
        let mut out = Vec::new();
        for (lineno, line) in String::from_utf8_lossy(&bytes[..complete]).lines().enumerate() {
            if line.trim().is_empty() { continue; }
            match serde_json::from_str::<HistoryEntry>(line) {
                Ok(entry) => out.push(entry),
                Err(e) => tracing::warn!(path = %self.path.display(), line = lineno + 1, error = %e, "skipping malformed history line"),
            }
        }
        Ok(out)
    }
}

impl HistoryStore for JsonlHistory {
    fn append(&self, entry: HistoryEntry) -> Result<()> {
        let mut line = serde_json::to_string(&entry).map_err(|e| Error::Storage(e.to_string()))?;
        line.push('\n');
        let _guard = lock(&self.write_lock)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::Storage(format!("{}: {e}", self.path.display())))?;
        file.write_all(line.as_bytes()).map_err(|e| Error::Storage(e.to_string()))
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let mut all = self.read_all()?;
        all.reverse();
        all.truncate(limit);
        Ok(all)
    }

    fn len(&self) -> Result<usize> { Ok(self.read_all()?.len()) }

    fn clear(&self) -> Result<()> {
        let _guard = lock(&self.write_lock)?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!("{}: {e}", self.path.display()))),
        }
    }
}
