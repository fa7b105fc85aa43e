//! Durable event store backed by an append-only JSON Lines file.
//!
//! Each stored event is one line:
//!
//! ```json
//! {"_id":"67e55044-10b1-426f-9247-bb680e5fe0c8","type":"push","author":"alice","to_branch":"main","timestamp":"2024-01-15T10:00:00Z"}
//! ```
//!
//! # Recovery
//!
//! On open the whole file is replayed into memory. Reads are served from that
//! index; the file is only ever appended to.
//!
//! A crash mid-write can leave a partial final line. Replay stops at the first
//! line that does not parse and truncates the file there, so the log is
//! always a valid prefix of what was written.
//!
//! # fsync Strategy
//!
//! Every insert is fsync'd before it is acknowledged. A new file also gets its
//! parent directory fsync'd so the directory entry survives power loss.
//!
//! A failed write is rolled back by truncating to the length before it. If the
//! rollback itself fails the file may end in a partial line, and the next open
//! would truncate everything written after it. The store then refuses further
//! inserts with [`StoreError::Unavailable`] until it is reopened.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::{EventStore, Result, StoreError, newest_first};
use crate::types::{Event, EventId, StoredEvent};

/// Event store persisted to a JSON Lines file.
#[derive(Clone)]
pub struct JsonlEventStore {
    inner: Arc<JsonlInner>,
}

struct JsonlInner {
    path: PathBuf,
    /// Append handle. Held for the whole write so lines never interleave.
    writer: Mutex<Writer>,
    /// Every record in the file, in file order.
    records: RwLock<Vec<StoredEvent>>,
}

struct Writer {
    file: File,
    /// Set when a failed write could not be rolled back.
    broken: Option<String>,
}

impl JsonlEventStore {
    /// Opens the store at `path`, creating it (and its parent directories) if
    /// needed, and replays existing records.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let existed = path.exists();
        let records = replay(&path)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&path)?;

        if !existed {
            file.sync_all()?;
            fsync_parent(&path)?;
        }

        debug!(
            path = %path.display(),
            records = records.len(),
            "Opened event store"
        );

        Ok(JsonlEventStore {
            inner: Arc::new(JsonlInner {
                path,
                writer: Mutex::new(Writer { file, broken: None }),
                records: RwLock::new(records),
            }),
        })
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.inner.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.records.read().is_empty()
    }
}

impl JsonlInner {
    fn append(&self, event: Event) -> Result<EventId> {
        let record = StoredEvent {
            id: EventId::generate(),
            event,
        };

        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut writer = self.writer.lock();
        if let Some(reason) = &writer.broken {
            return Err(StoreError::Unavailable(reason.clone()));
        }

        let file = &mut writer.file;
        let len_before = file.metadata()?.len();

        if let Err(e) = file.write_all(line.as_bytes()).and_then(|_| file.sync_all()) {
            // Drop whatever part of the line made it to disk so the next
            // append starts on a clean line.
            if let Err(truncate_err) = file.set_len(len_before) {
                error!(
                    path = %self.path.display(),
                    error = %e,
                    rollback_error = %truncate_err,
                    "Failed to roll back partial write; refusing further inserts"
                );
                writer.broken = Some(format!(
                    "event log {} may hold a partial record: {truncate_err}",
                    self.path.display()
                ));
            }
            return Err(e.into());
        }

        let id = record.id;
        // Still under the file lock: index order matches file order.
        self.records.write().push(record);
        Ok(id)
    }
}

#[async_trait]
impl EventStore for JsonlEventStore {
    async fn insert(&self, event: Event) -> Result<EventId> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.append(event))
            .await
            .map_err(|e| StoreError::Unavailable(format!("write task failed: {e}")))?
    }

    async fn list_all(&self) -> Result<Vec<StoredEvent>> {
        Ok(newest_first(self.inner.records.read().iter()))
    }
}

/// Reads every complete record from `path`, truncating a torn or corrupt tail.
///
/// A missing file replays as empty. If the last valid line lacks its trailing
/// newline, one is appended so the next write starts a fresh line.
fn replay(path: &Path) -> Result<Vec<StoredEvent>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let file_len = file.metadata()?.len();

    let mut reader = BufReader::new(file);
    let mut records = Vec::new();
    let mut valid_len: u64 = 0;
    let mut missing_newline = false;

    loop {
        let mut line = String::new();
        let bytes_read = match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(n) => n,
            // Invalid UTF-8: treat like any other corrupt line.
            Err(e) if e.kind() == io::ErrorKind::InvalidData => break,
            Err(e) => return Err(e.into()),
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            valid_len += bytes_read as u64;
            continue;
        }

        match serde_json::from_str::<StoredEvent>(trimmed) {
            Ok(record) => {
                records.push(record);
                valid_len += bytes_read as u64;
                missing_newline = !line.ends_with('\n');
            }
            Err(_) => break,
        }
    }

    if valid_len < file_len {
        warn!(
            path = %path.display(),
            kept_bytes = valid_len,
            dropped_bytes = file_len - valid_len,
            "Truncating corrupt tail of event store"
        );
        let file = OpenOptions::new().write(true).open(path)?;
        file.set_len(valid_len)?;
        file.sync_all()?;
    }

    if missing_newline {
        let mut file = OpenOptions::new().append(true).open(path)?;
        file.write_all(b"\n")?;
        file.sync_all()?;
    }

    Ok(records)
}

/// Syncs the directory containing `path` so a newly created file's entry is durable.
fn fsync_parent(path: &Path) -> io::Result<()> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) => File::open(dir)?.sync_all(),
        None => Ok(()),
    }
}
