//! Matching rules
//!
//! A resting order is eligible for an incoming one when it trades the same
//! asset on the opposite side, for exactly the same quantity, at a crossing
//! price, and has not expired. Among eligible orders the `MatchPolicy`
//! decides which one is taken.

pub mod crossing;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use types::order::{Order, Side, SignedOrder};

pub use crossing::can_match;

/// How to choose among several eligible resting orders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchPolicy {
    /// First eligible order in book iteration order
    #[default]
    FirstFit,
    /// Best price for the incoming side, then earliest submission
    PriceTime,
}

/// Eligibility predicate, ignoring expiry.
pub fn is_eligible(incoming: &Order, resting: &Order) -> bool {
    resting.asset_id == incoming.asset_id
        && resting.side == incoming.side.opposite()
        && resting.quantity == incoming.quantity
        && crossing::incoming_can_match(incoming.side, incoming.price, resting.price)
}

/// Index of the resting order `incoming` should match, if any.
///
/// Expired resting orders are never selected.
pub fn select_match(
    incoming: &SignedOrder,
    resting: &[SignedOrder],
    now_secs: i64,
    policy: MatchPolicy,
) -> Option<usize> {
    let mut candidates = resting.iter().enumerate().filter(|(_, candidate)| {
        candidate.id != incoming.id
            && !candidate.is_expired(now_secs)
            && is_eligible(&incoming.order, &candidate.order)
    });

    match policy {
        MatchPolicy::FirstFit => candidates.next().map(|(index, _)| index),
        MatchPolicy::PriceTime => candidates
            .min_by(|(_, a), (_, b)| priority(incoming.side(), a, b))
            .map(|(index, _)| index),
    }
}

fn priority(incoming_side: Side, a: &SignedOrder, b: &SignedOrder) -> Ordering {
    let by_price = match incoming_side {
        // a buyer wants the cheapest ask
        Side::Buy => a.order.price.cmp(&b.order.price),
        // a seller wants the highest bid
        Side::Sell => b.order.price.cmp(&a.order.price),
    };
    by_price
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}
