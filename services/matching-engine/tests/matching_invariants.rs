//! Matching invariants
//!
//! Every pair the engine hands out satisfies the pairing rules, whatever the
//! book looks like, and a resting order is never claimed twice even when many
//! intakes race for it.

use chrono::{TimeZone, Utc};
use matching_engine::{ClaimOutcome, InMemoryOrderBook, MatchPolicy, MatchingEngine};
use rust_decimal::Decimal;
use std::sync::{Arc, Barrier};
use std::thread;
use types::ids::{AssetId, SignerAddress, SubmitterId};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side, SignedOrder};

const NOW: i64 = 1_708_123_456;

fn signed(side: Side, asset: u64, units: u64, qty: u64, expiry: i64) -> SignedOrder {
    SignedOrder::new(
        Order {
            maker: SignerAddress::from_hex("cd".repeat(32)),
            asset_id: AssetId(asset),
            price: Price::from_units(units),
            side,
            quantity: Quantity::try_new(qty).unwrap(),
            nonce: 1,
            expiry,
        },
        String::new(),
        SubmitterId::try_new("trader").unwrap(),
        "PSA 10 Charizard".into(),
        Decimal::ZERO,
        Utc.timestamp_opt(NOW, 0).unwrap(),
    )
}

#[test]
fn test_concurrent_intakes_claim_each_resting_order_once() {
    let book = Arc::new(InMemoryOrderBook::default());
    let engine = MatchingEngine::new(book.clone());

    let resting = 8;
    for _ in 0..resting {
        engine.rest(signed(Side::Sell, 1, 100, 1, NOW + 60)).unwrap();
    }

    let intakes = 32;
    let barrier = Arc::new(Barrier::new(intakes));
    let handles: Vec<_> = (0..intakes)
        .map(|_| {
            let engine = engine.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let bid = signed(Side::Buy, 1, 100, 1, NOW + 60);
                barrier.wait();
                match engine.claim(bid, NOW).unwrap() {
                    ClaimOutcome::Matched(pair) => Some(pair.sell().id),
                    ClaimOutcome::Unmatched(_) => None,
                }
            })
        })
        .collect();

    let mut claimed: Vec<_> = handles
        .into_iter()
        .filter_map(|h| h.join().unwrap())
        .collect();
    assert_eq!(claimed.len(), resting);

    claimed.sort();
    claimed.dedup();
    assert_eq!(claimed.len(), resting, "no resting order claimed twice");
    assert!(book.is_empty());
}

#[test]
fn test_restore_after_failed_settlement_keeps_orders_matchable() {
    let engine = MatchingEngine::new(Arc::new(InMemoryOrderBook::default()));
    engine.rest(signed(Side::Sell, 1, 100, 1, NOW + 60)).unwrap();

    let ClaimOutcome::Matched(pair) = engine
        .claim(signed(Side::Buy, 1, 100, 1, NOW + 60), NOW)
        .unwrap()
    else {
        panic!("expected a match");
    };
    engine.restore(pair).unwrap();

    // a fresh seller can now match the restored buy
    let outcome = engine.claim(signed(Side::Sell, 1, 100, 1, NOW + 60), NOW).unwrap();
    assert!(matches!(outcome, ClaimOutcome::Matched(_)));
}

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn side() -> impl Strategy<Value = Side> {
        prop_oneof![Just(Side::Buy), Just(Side::Sell)]
    }

    fn policy() -> impl Strategy<Value = MatchPolicy> {
        prop_oneof![Just(MatchPolicy::FirstFit), Just(MatchPolicy::PriceTime)]
    }

    /// (side, asset, price units, quantity, expired)
    fn resting_shape() -> impl Strategy<Value = (Side, u64, u64, u64, bool)> {
        (side(), 1u64..=3, 1u64..=200, 1u64..=3, any::<bool>())
    }

    proptest! {
        /// Invariant: any pair handed out is valid, unexpired and was resting.
        #[test]
        fn fuzz_claimed_pairs_are_valid(
            book_shapes in prop::collection::vec(resting_shape(), 0..25),
            incoming in (side(), 1u64..=3, 1u64..=200, 1u64..=3),
            policy in policy(),
        ) {
            let book = Arc::new(InMemoryOrderBook::new(policy));
            let engine = MatchingEngine::new(book.clone());
            for (side, asset, units, qty, expired) in book_shapes {
                let expiry = if expired { NOW - 1 } else { NOW + 60 };
                engine.rest(signed(side, asset, units, qty, expiry)).unwrap();
            }
            let before = book.len();

            let (side, asset, units, qty) = incoming;
            let incoming = signed(side, asset, units, qty, NOW + 60);
            match engine.claim(incoming.clone(), NOW).unwrap() {
                ClaimOutcome::Matched(pair) => {
                    prop_assert!(pair.validate().is_ok());
                    prop_assert!(!pair.buy().is_expired(NOW));
                    prop_assert!(!pair.sell().is_expired(NOW));
                    prop_assert!(pair.buy().id == incoming.id || pair.sell().id == incoming.id);
                    prop_assert_eq!(book.len(), before - 1);
                }
                ClaimOutcome::Unmatched(order) => {
                    prop_assert_eq!(order, incoming);
                    prop_assert_eq!(book.len(), before);
                }
            }
        }
    }
}
