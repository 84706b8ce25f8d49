//! Settlement for matched card trades
//!
//! Matched pairs leave the venue here. An authority finalizes the trade and
//! returns a durable reference; the dispatcher bounds the call and converts
//! the outcome into a `SettlementResult`.
//!
//! # Modules
//! - `authority`: the `SettlementAuthority` seam
//! - `ledger`: in-process ledger authority (signature, expiry and replay checks)
//! - `http`: remote authority over HTTP
//! - `scripted`: canned-outcome authority for failure injection
//! - `dispatcher`: timeout, expiry re-check, outcome mapping
//! - `errors`: settlement error taxonomy

pub mod authority;
pub mod dispatcher;
pub mod errors;
pub mod http;
pub mod ledger;
pub mod scripted;

pub use authority::SettlementAuthority;
pub use dispatcher::{SettlementDispatcher, DEFAULT_SETTLEMENT_TIMEOUT};
pub use errors::SettlementError;
pub use http::HttpSettlementAuthority;
pub use ledger::{Fill, LedgerAuthority};
pub use scripted::ScriptedAuthority;
