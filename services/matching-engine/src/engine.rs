//! Matching engine core
//!
//! Coordinates the order book store and the matching rules. The engine never
//! talks to settlement: it hands out validated `MatchedPair`s and takes them
//! back through `restore` when settlement fails.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use types::errors::OrderError;
use types::order::{MatchedPair, SignedOrder};

use crate::book::{BookError, OrderBookStore};

/// Main matching engine
#[derive(Clone)]
pub struct MatchingEngine {
    store: Arc<dyn OrderBookStore>,
}

/// Result of claiming a counterparty for an incoming order
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// A resting order was taken out of the book and paired
    Matched(MatchedPair),
    /// Nothing eligible; the incoming order is handed back untouched
    Unmatched(SignedOrder),
}

impl MatchingEngine {
    pub fn new(store: Arc<dyn OrderBookStore>) -> Self {
        Self { store }
    }

    /// Claim a counterparty for `incoming`.
    ///
    /// The resting order is removed from the book atomically with its
    /// selection. The incoming order is never added by this call.
    pub fn claim(&self, incoming: SignedOrder, now_secs: i64) -> Result<ClaimOutcome, EngineError> {
        let Some(resting) = self.store.claim_match(&incoming, now_secs)? else {
            return Ok(ClaimOutcome::Unmatched(incoming));
        };

        let resting_id = resting.id;
        let pair = MatchedPair::new(incoming, resting);
        if let Err(e) = pair.validate() {
            // selection and validation disagree; put the resting order back
            let (buy, sell) = pair.into_orders();
            let resting = if buy.id == resting_id { buy } else { sell };
            warn!(order_id = %resting_id, error = %e, "Claimed pair failed validation, restoring");
            self.store.add(resting)?;
            return Err(EngineError::InvalidPair(e));
        }

        info!(
            buy_id = %pair.buy().id,
            sell_id = %pair.sell().id,
            asset_id = %pair.buy().order.asset_id,
            "Claimed counterparty"
        );
        Ok(ClaimOutcome::Matched(pair))
    }

    /// Add an unmatched order to the book.
    pub fn rest(&self, order: SignedOrder) -> Result<(), EngineError> {
        debug!(order_id = %order.id, side = ?order.side(), "Order resting");
        self.store.add(order)?;
        Ok(())
    }

    /// Return both legs of a pair to the book after a failed settlement.
    ///
    /// Idempotent: a leg already resting is left as is. Restored legs are
    /// appended like new orders, so under `MatchPolicy::FirstFit` a
    /// previously resting leg queues behind orders that arrived while it was
    /// claimed. The open set is unchanged; only its scan order differs.
    pub fn restore(&self, pair: MatchedPair) -> Result<(), EngineError> {
        let (buy, sell) = pair.into_orders();
        info!(buy_id = %buy.id, sell_id = %sell.id, "Restoring matched orders");
        for order in [buy, sell] {
            match self.store.add(order) {
                Ok(()) | Err(BookError::Duplicate(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Open orders sorted by submission time.
    pub fn open_orders(&self) -> Result<Vec<SignedOrder>, EngineError> {
        let mut orders = self.store.list_open()?;
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(orders)
    }

    /// Evict every order expired at `now_secs`.
    pub fn evict_expired(&self, now_secs: i64) -> Result<Vec<SignedOrder>, EngineError> {
        let evicted = self.store.evict_expired(now_secs)?;
        for order in &evicted {
            info!(
                order_id = %order.id,
                signer = %order.order.maker.short(),
                expiry = order.order.expiry,
                "Evicted expired order"
            );
        }
        Ok(evicted)
    }
}

/// Matching engine errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Book(#[from] BookError),

    #[error("Invalid match: {0}")]
    InvalidPair(OrderError),
}
