//! Persistence Service
//!
//! Durable backing for the order book: an append-only, checksummed journal
//! of book events and a `JournaledOrderBook` that rebuilds itself from it.
//!
//! # Guarantees
//! - Every acknowledged mutation is flushed and fsynced
//! - Records carry a gapless sequence and a CRC32C checksum
//! - A torn tail from a crash is truncated on open; other damage fails loudly
//! - A claimed order is never recovered as open

pub mod book;
pub mod journal;
pub mod reader;

pub use book::JournaledOrderBook;
pub use journal::{JournalError, JournalRecord, JournalWriter};
pub use reader::{read_journal, recover, Replay};
