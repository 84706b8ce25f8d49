//! Journal Reader: sequential replay with corruption detection
//!
//! A crash can leave a partly written record at the end of the journal.
//! Such a torn tail is reported and cut off by `recover`. Damage anywhere
//! before the tail, or a break in the sequence, is an error: silently
//! skipping a record could resurrect a claimed order.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use tracing::warn;

use crate::journal::{checksum, JournalError, JournalRecord, FIXED_BODY, LEN_PREFIX, MAX_BODY_LEN};

/// Result of reading a journal file
#[derive(Debug, Default)]
pub struct Replay {
    /// Valid records in sequence order
    pub records: Vec<JournalRecord>,
    /// Byte length of the valid prefix
    pub valid_len: u64,
    /// Bytes after the valid prefix belonging to a torn record
    pub torn_bytes: u64,
}

enum Frame {
    Record(JournalRecord, usize),
    Torn,
}

/// Read and validate every record in `path`. A missing file is empty.
pub fn read_journal(path: impl AsRef<Path>) -> Result<Replay, JournalError> {
    let data = match std::fs::read(path.as_ref()) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Replay::default()),
        Err(e) => return Err(e.into()),
    };

    let mut replay = Replay::default();
    let mut pos = 0usize;

    while pos < data.len() {
        match decode_frame(&data[pos..], pos as u64)? {
            Frame::Record(record, consumed) => {
                let expected = replay.records.len() as u64;
                if record.sequence != expected {
                    return Err(JournalError::SequenceGap {
                        expected,
                        got: record.sequence,
                    });
                }
                replay.records.push(record);
                pos += consumed;
            }
            Frame::Torn => break,
        }
    }

    replay.valid_len = pos as u64;
    replay.torn_bytes = (data.len() - pos) as u64;
    Ok(replay)
}

/// Read `path` and truncate a torn tail so the file can be appended to.
pub fn recover(path: impl AsRef<Path>) -> Result<Replay, JournalError> {
    let path = path.as_ref();
    let replay = read_journal(path)?;

    if replay.torn_bytes > 0 {
        warn!(
            path = %path.display(),
            torn_bytes = replay.torn_bytes,
            valid_len = replay.valid_len,
            "Truncating torn journal tail"
        );
        let file = OpenOptions::new().write(true).open(path)?;
        file.set_len(replay.valid_len)?;
        file.sync_all()?;
    }
    Ok(replay)
}

/// Decode one frame from the start of `data`.
///
/// `offset` is the absolute file position of `data[0]`, for error reports.
fn decode_frame(data: &[u8], offset: u64) -> Result<Frame, JournalError> {
    if data.len() < LEN_PREFIX {
        return Ok(Frame::Torn);
    }
    let body_len = read_u32(&data[..4]) as usize;
    let total = LEN_PREFIX + body_len;

    // a frame running to or past EOF is the last write; a bad one there is torn
    let reaches_eof = total >= data.len();

    if !(FIXED_BODY..=MAX_BODY_LEN).contains(&body_len) {
        if reaches_eof {
            return Ok(Frame::Torn);
        }
        return Err(JournalError::Corruption {
            offset,
            detail: format!("implausible body length {}", body_len),
        });
    }
    if data.len() < total {
        return Ok(Frame::Torn);
    }

    let body = &data[LEN_PREFIX..total];
    let sequence = read_u64(&body[0..8]);
    let timestamp = read_u64(&body[8..16]) as i64;
    let payload = &body[16..body_len - 4];
    let stored = read_u32(&body[body_len - 4..]);

    if stored != checksum(sequence, timestamp, payload) {
        if reaches_eof {
            return Ok(Frame::Torn);
        }
        return Err(JournalError::ChecksumMismatch { offset, sequence });
    }

    let event = bincode::deserialize(payload).map_err(|e| JournalError::Corruption {
        offset,
        detail: format!("undecodable payload for seq={}: {}", sequence, e),
    })?;

    Ok(Frame::Record(
        JournalRecord {
            sequence,
            timestamp,
            event,
        },
        total,
    ))
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(buf)
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(buf)
}
