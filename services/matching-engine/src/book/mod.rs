//! Order book storage
//!
//! `OrderBookStore` is the seam between matching and storage. Implementations
//! must make `claim_match` atomic: find-and-remove happens in one critical
//! section so a resting order can be claimed by at most one intake.

pub mod memory;

use thiserror::Error;
use types::ids::OrderId;
use types::order::SignedOrder;

pub use memory::InMemoryOrderBook;

/// Collection of unmatched, signed orders awaiting a counterparty.
pub trait OrderBookStore: Send + Sync {
    /// Insert a resting order. Fails if an order with the same id is present.
    fn add(&self, order: SignedOrder) -> Result<(), BookError>;

    /// Remove an order by id, returning it if it was resting.
    fn remove(&self, order_id: &OrderId) -> Result<Option<SignedOrder>, BookError>;

    /// Peek at the resting order `incoming` would match. Read-only.
    fn find_match(
        &self,
        incoming: &SignedOrder,
        now_secs: i64,
    ) -> Result<Option<SignedOrder>, BookError>;

    /// Atomically find and remove the resting order `incoming` matches.
    fn claim_match(
        &self,
        incoming: &SignedOrder,
        now_secs: i64,
    ) -> Result<Option<SignedOrder>, BookError>;

    /// Snapshot of the open book in store iteration order.
    fn list_open(&self) -> Result<Vec<SignedOrder>, BookError>;

    /// Remove and return every order expired at `now_secs`.
    fn evict_expired(&self, now_secs: i64) -> Result<Vec<SignedOrder>, BookError>;
}

/// Order book storage errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("Order already resting: {0}")]
    Duplicate(OrderId),

    #[error("Storage error: {0}")]
    Storage(String),
}
