//! Concrete side effects plugged into the write and update operations.
//!
//! Failures here are logged, never surfaced as outcomes: an operation that
//! finished its wait has completed as far as the batch is concerned.

use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use cutoff_core::RecordEffect;
use cutoff_types::RecordIndex;

/// Appends one `record N` line per completed write.
///
/// The append is a single small blocking write plus flush on the calling
/// worker thread.
#[derive(Debug)]
pub struct FileAppendEffect {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileAppendEffect {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordEffect for FileAppendEffect {
    fn apply(&self, record: RecordIndex) {
        let mut file = lock(&self.file);
        if let Err(e) = writeln!(file, "record {record}").and_then(|()| file.flush()) {
            tracing::warn!(%record, path = %self.path.display(), "Failed to append record: {e}");
        }
    }
}

/// In-memory stand-in for the database: remembers which records were updated.
#[derive(Debug, Default)]
pub struct UpdateLedger {
    updated: Mutex<BTreeSet<RecordIndex>>,
}

impl UpdateLedger {
    pub fn updated_records(&self) -> Vec<RecordIndex> {
        lock(&self.updated).iter().copied().collect()
    }
}

impl RecordEffect for UpdateLedger {
    fn apply(&self, record: RecordIndex) {
        if !lock(&self.updated).insert(record) {
            tracing::warn!(%record, "Record updated more than once");
        }
    }
}

// A panic while holding the lock leaves plain data behind; keep using it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
