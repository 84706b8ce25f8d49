//! Book mutation events
//!
//! Every change to the open book is one of these. Durable stores append them
//! to a journal and replay them to rebuild the book.

use serde::{Deserialize, Serialize};
use types::ids::OrderId;
use types::order::SignedOrder;

/// A single mutation of the open book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BookEvent {
    /// Order began resting (new, or restored after a failed settlement)
    Added(SignedOrder),
    /// Order left the book: claimed by a match, removed, or expired
    Removed(OrderId),
}

impl BookEvent {
    pub fn order_id(&self) -> OrderId {
        match self {
            BookEvent::Added(order) => order.id,
            BookEvent::Removed(id) => *id,
        }
    }
}

/// Apply `event` to an ordered list of open orders.
///
/// Replaying a journal from empty with this function yields the book as it
/// was when the last event was written.
pub fn apply_event(orders: &mut Vec<SignedOrder>, event: BookEvent) {
    match event {
        BookEvent::Added(order) => {
            if !orders.iter().any(|o| o.id == order.id) {
                orders.push(order);
            }
        }
        BookEvent::Removed(id) => orders.retain(|o| o.id != id),
    }
}
