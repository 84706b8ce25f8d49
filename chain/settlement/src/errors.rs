//! Settlement error types
//!
//! One taxonomy for every authority. Each variant is recoverable from the
//! venue's point of view: the orders go back to the book.

use signing::SigningError;
use std::time::Duration;
use thiserror::Error;
use types::errors::OrderError;
use types::ids::{OrderId, SignerAddress};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettlementError {
    #[error("Invalid signature on order {order_id}: {source}")]
    InvalidSignature {
        order_id: OrderId,
        #[source]
        source: SigningError,
    },

    #[error(transparent)]
    InvalidPair(#[from] OrderError),

    #[error("Order {order_id} expired at {expiry}")]
    Expired { order_id: OrderId, expiry: i64 },

    #[error("Order {order_id} already settled: maker {maker}, nonce {nonce}")]
    AlreadySettled {
        order_id: OrderId,
        maker: SignerAddress,
        nonce: u64,
    },

    #[error("Settlement rejected by authority: {0}")]
    Rejected(String),

    #[error("Settlement authority unreachable: {0}")]
    Unreachable(String),

    #[error("Settlement timed out after {0:?}")]
    Timeout(Duration),
}
