//! Durable order book
//!
//! Same matching behaviour as `InMemoryOrderBook`, with every mutation
//! journaled before it is applied. The journal write and the in-memory change
//! happen under one lock, so the file order is the book order.

use chrono::Utc;
use matching_engine::book::{BookError, OrderBookStore};
use matching_engine::events::apply_event;
use matching_engine::matching::{select_match, MatchPolicy};
use matching_engine::BookEvent;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{error, info};
use types::ids::OrderId;
use types::order::SignedOrder;

use crate::journal::{self, JournalError, JournalWriter};
use crate::reader;

struct State {
    orders: Vec<SignedOrder>,
    journal: JournalWriter,
}

impl State {
    fn record(&mut self, event: BookEvent) -> Result<(), BookError> {
        self.journal
            .append(event, Utc::now().timestamp_millis())
            .map(|_| ())
            .map_err(|e| {
                error!(error = %e, path = %self.journal.path().display(), "Journal append failed");
                BookError::Storage(e.to_string())
            })
    }
}

/// Order book backed by an append-only journal
pub struct JournaledOrderBook {
    state: Mutex<State>,
    policy: MatchPolicy,
}

impl JournaledOrderBook {
    /// Open the journal at `path`, replaying it to rebuild the open book.
    ///
    /// Creates an empty journal if none exists. A torn tail left by a crash is
    /// truncated; any other damage is an error.
    pub fn open(path: impl AsRef<Path>, policy: MatchPolicy) -> Result<Self, JournalError> {
        let path = path.as_ref();
        let replay = reader::recover(path)?;

        let records = replay.records.len();
        let mut orders = Vec::new();
        for record in replay.records {
            apply_event(&mut orders, record.event);
        }
        info!(
            path = %path.display(),
            records,
            open_orders = orders.len(),
            "Replayed order book journal"
        );

        let journal = JournalWriter::open(path, records as u64)?;
        Ok(Self {
            state: Mutex::new(State { orders, journal }),
            policy,
        })
    }

    /// Rewrite the journal so it holds only the currently open orders.
    pub fn compact(&self) -> Result<(), JournalError> {
        let mut state = self.lock();
        let path = state.journal.path().to_path_buf();
        let events = state.orders.iter().cloned().map(BookEvent::Added);
        let journal = journal::rewrite(&path, events, Utc::now().timestamp_millis())?;
        info!(
            path = %path.display(),
            open_orders = state.orders.len(),
            "Compacted order book journal"
        );
        state.journal = journal;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().orders.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OrderBookStore for JournaledOrderBook {
    fn add(&self, order: SignedOrder) -> Result<(), BookError> {
        let mut state = self.lock();
        if state.orders.iter().any(|o| o.id == order.id) {
            return Err(BookError::Duplicate(order.id));
        }
        state.record(BookEvent::Added(order.clone()))?;
        state.orders.push(order);
        Ok(())
    }

    fn remove(&self, order_id: &OrderId) -> Result<Option<SignedOrder>, BookError> {
        let mut state = self.lock();
        let Some(index) = state.orders.iter().position(|o| o.id == *order_id) else {
            return Ok(None);
        };
        state.record(BookEvent::Removed(*order_id))?;
        Ok(Some(state.orders.remove(index)))
    }

    fn find_match(
        &self,
        incoming: &SignedOrder,
        now_secs: i64,
    ) -> Result<Option<SignedOrder>, BookError> {
        let state = self.lock();
        Ok(select_match(incoming, &state.orders, now_secs, self.policy)
            .map(|index| state.orders[index].clone()))
    }

    fn claim_match(
        &self,
        incoming: &SignedOrder,
        now_secs: i64,
    ) -> Result<Option<SignedOrder>, BookError> {
        let mut state = self.lock();
        let Some(index) = select_match(incoming, &state.orders, now_secs, self.policy) else {
            return Ok(None);
        };
        // journal first: if the write fails the order stays resting
        let id = state.orders[index].id;
        state.record(BookEvent::Removed(id))?;
        Ok(Some(state.orders.remove(index)))
    }

    fn list_open(&self) -> Result<Vec<SignedOrder>, BookError> {
        Ok(self.lock().orders.clone())
    }

    fn evict_expired(&self, now_secs: i64) -> Result<Vec<SignedOrder>, BookError> {
        let mut state = self.lock();
        let expired: Vec<OrderId> = state
            .orders
            .iter()
            .filter(|o| o.is_expired(now_secs))
            .map(|o| o.id)
            .collect();

        let mut evicted = Vec::with_capacity(expired.len());
        for id in expired {
            state.record(BookEvent::Removed(id))?;
            if let Some(index) = state.orders.iter().position(|o| o.id == id) {
                evicted.push(state.orders.remove(index));
            }
        }
        Ok(evicted)
    }
}
