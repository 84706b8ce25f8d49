//! Journal Writer: append-only book event journal with checksums
//!
//! # Binary Format (per record)
//! ```text
//! [body_len:  u32]
//! [sequence:  u64]
//! [timestamp: i64]   // unix millis at write time
//! [payload:   bytes] // bincode BookEvent, body_len - 20 bytes
//! [checksum:  u32]   // CRC32C over sequence+timestamp+payload
//! ```
//! All integers little-endian. Sequences start at 0 and are gapless.

use crc32c::crc32c;
use matching_engine::BookEvent;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use tracing::warn;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Length prefix size
pub(crate) const LEN_PREFIX: usize = 4;
/// sequence + timestamp + checksum
pub(crate) const FIXED_BODY: usize = 8 + 8 + 4;
/// Upper bound on one record; anything larger is corruption
pub(crate) const MAX_BODY_LEN: usize = 16 * 1024 * 1024;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Checksum mismatch at byte offset {offset}: seq={sequence}")]
    ChecksumMismatch { offset: u64, sequence: u64 },

    #[error("Corruption detected at byte offset {offset}: {detail}")]
    Corruption { offset: u64, detail: String },

    #[error("Sequence gap: expected {expected}, got {got}")]
    SequenceGap { expected: u64, got: u64 },
}

impl From<bincode::Error> for JournalError {
    fn from(e: bincode::Error) -> Self {
        JournalError::Serialization(e.to_string())
    }
}

// ── Journal Record ──────────────────────────────────────────────────

/// One persisted book mutation
#[derive(Debug, Clone, PartialEq)]
pub struct JournalRecord {
    pub sequence: u64,
    pub timestamp: i64,
    pub event: BookEvent,
}

impl JournalRecord {
    /// Encode to the framed wire format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, JournalError> {
        let payload = bincode::serialize(&self.event)?;
        let body_len = FIXED_BODY + payload.len();
        if body_len > MAX_BODY_LEN {
            return Err(JournalError::Serialization(format!(
                "record body of {} bytes exceeds limit",
                body_len
            )));
        }

        let mut buf = Vec::with_capacity(LEN_PREFIX + body_len);
        buf.extend_from_slice(&(body_len as u32).to_le_bytes());
        buf.extend_from_slice(&self.sequence.to_le_bytes());
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(&payload);
        buf.extend_from_slice(&checksum(self.sequence, self.timestamp, &payload).to_le_bytes());
        Ok(buf)
    }
}

/// CRC32C over (sequence ++ timestamp ++ payload).
pub(crate) fn checksum(sequence: u64, timestamp: i64, payload: &[u8]) -> u32 {
    let mut buf = Vec::with_capacity(16 + payload.len());
    buf.extend_from_slice(&sequence.to_le_bytes());
    buf.extend_from_slice(&timestamp.to_le_bytes());
    buf.extend_from_slice(payload);
    crc32c(&buf)
}

// ── Journal Writer ──────────────────────────────────────────────────

/// Append-only journal writer.
///
/// Every append is written straight to the file and `fsync`ed before it
/// returns, so an acknowledged mutation survives a crash. A failed append
/// leaves nothing behind: the file is cut back to its last good length and
/// the sequence is not consumed.
pub struct JournalWriter {
    file: File,
    path: PathBuf,
    next_sequence: u64,
    /// Byte length of the journal after the last acknowledged record
    durable_len: u64,
}

impl JournalWriter {
    /// Open `path` for appending, continuing at `next_sequence`.
    ///
    /// The file must already be a valid journal (see `reader::recover`).
    pub fn open(path: impl AsRef<Path>, next_sequence: u64) -> Result<Self, JournalError> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let durable_len = file.metadata()?.len();

        Ok(Self {
            file,
            path,
            next_sequence,
            durable_len,
        })
    }

    /// Append one event durably. Returns the sequence it was written at.
    pub fn append(&mut self, event: BookEvent, timestamp: i64) -> Result<u64, JournalError> {
        let record = JournalRecord {
            sequence: self.next_sequence,
            timestamp,
            event,
        };
        let bytes = record.to_bytes()?;

        if let Err(e) = self.write_durably(&bytes) {
            self.roll_back();
            return Err(e.into());
        }

        self.durable_len += bytes.len() as u64;
        self.next_sequence += 1;
        Ok(record.sequence)
    }

    fn write_durably(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.file.write_all(bytes)?;
        self.file.sync_data()
    }

    /// Drop any partially written record.
    fn roll_back(&mut self) {
        let truncated = self
            .file
            .set_len(self.durable_len)
            .and_then(|()| self.file.sync_data());
        if let Err(e) = truncated {
            // replay still treats a torn tail as recoverable
            warn!(
                path = %self.path.display(),
                durable_len = self.durable_len,
                error = %e,
                "Failed to truncate journal after a failed append"
            );
        }
    }

    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write `events` to a fresh journal at `path`, replacing any existing file.
///
/// The new journal is written to a sibling temp file, synced, then renamed
/// over `path`. Returns a writer positioned after the last event.
pub fn rewrite(
    path: impl AsRef<Path>,
    events: impl IntoIterator<Item = BookEvent>,
    timestamp: i64,
) -> Result<JournalWriter, JournalError> {
    let path = path.as_ref();
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".compact");
    let tmp = PathBuf::from(tmp);

    {
        let mut file = BufWriter::new(File::create(&tmp)?);
        for (sequence, event) in events.into_iter().enumerate() {
            let record = JournalRecord {
                sequence: sequence as u64,
                timestamp,
                event,
            };
            file.write_all(&record.to_bytes()?)?;
        }
        file.flush()?;
        file.get_ref().sync_all()?;
    }
    std::fs::rename(&tmp, path)?;

    let next_sequence = crate::reader::read_journal(path)?.records.len() as u64;
    JournalWriter::open(path, next_sequence)
}
