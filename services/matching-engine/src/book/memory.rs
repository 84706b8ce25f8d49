//! In-memory order book
//!
//! A single `Vec` in submission order behind a mutex. Linear scans are fine
//! at the scale of a collectibles venue; the mutex is what makes
//! `claim_match` atomic.

use std::sync::{Mutex, MutexGuard, PoisonError};
use types::ids::OrderId;
use types::order::SignedOrder;

use super::{BookError, OrderBookStore};
use crate::matching::{select_match, MatchPolicy};

/// Process-local order book
#[derive(Debug, Default)]
pub struct InMemoryOrderBook {
    orders: Mutex<Vec<SignedOrder>>,
    policy: MatchPolicy,
}

impl InMemoryOrderBook {
    pub fn new(policy: MatchPolicy) -> Self {
        Self {
            orders: Mutex::new(Vec::new()),
            policy,
        }
    }

    /// Build a book already holding `orders`, in the given order.
    ///
    /// Used when rebuilding state from durable storage.
    pub fn from_orders(policy: MatchPolicy, orders: Vec<SignedOrder>) -> Self {
        Self {
            orders: Mutex::new(orders),
            policy,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.lock().iter().any(|o| o.id == *order_id)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SignedOrder>> {
        // a panic while holding the lock cannot leave the Vec half-updated
        self.orders.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OrderBookStore for InMemoryOrderBook {
    fn add(&self, order: SignedOrder) -> Result<(), BookError> {
        let mut orders = self.lock();
        if orders.iter().any(|o| o.id == order.id) {
            return Err(BookError::Duplicate(order.id));
        }
        orders.push(order);
        Ok(())
    }

    fn remove(&self, order_id: &OrderId) -> Result<Option<SignedOrder>, BookError> {
        let mut orders = self.lock();
        Ok(orders
            .iter()
            .position(|o| o.id == *order_id)
            .map(|index| orders.remove(index)))
    }

    fn find_match(
        &self,
        incoming: &SignedOrder,
        now_secs: i64,
    ) -> Result<Option<SignedOrder>, BookError> {
        let orders = self.lock();
        Ok(select_match(incoming, &orders, now_secs, self.policy).map(|index| orders[index].clone()))
    }

    fn claim_match(
        &self,
        incoming: &SignedOrder,
        now_secs: i64,
    ) -> Result<Option<SignedOrder>, BookError> {
        let mut orders = self.lock();
        Ok(select_match(incoming, &orders, now_secs, self.policy).map(|index| orders.remove(index)))
    }

    fn list_open(&self) -> Result<Vec<SignedOrder>, BookError> {
        Ok(self.lock().clone())
    }

    fn evict_expired(&self, now_secs: i64) -> Result<Vec<SignedOrder>, BookError> {
        let mut orders = self.lock();
        let (expired, live): (Vec<_>, Vec<_>) = std::mem::take(&mut *orders)
            .into_iter()
            .partition(|o| o.is_expired(now_secs));
        *orders = live;
        Ok(expired)
    }
}
