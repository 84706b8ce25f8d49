//! Crossing detection logic
//!
//! Determines when a bid and ask can match based on price compatibility

use types::numeric::Price;
use types::order::Side;

/// A bid crosses an ask when it is at or above it.
pub fn can_match(bid_price: Price, ask_price: Price) -> bool {
    bid_price >= ask_price
}

/// Check if an incoming order crosses a resting order on the other side.
pub fn incoming_can_match(incoming_side: Side, incoming_price: Price, resting_price: Price) -> bool {
    match incoming_side {
        Side::Buy => can_match(incoming_price, resting_price),
        Side::Sell => can_match(resting_price, incoming_price),
    }
}
