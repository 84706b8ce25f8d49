//! Background maintenance: eviction of expired resting orders and pruning
//! of idle rate-limit buckets

use chrono::Utc;
use crate::rate_limit::RateLimiter;
use matching_engine::MatchingEngine;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Evict orders expired at `now_secs`. Returns how many were removed.
pub fn sweep_once(engine: &MatchingEngine, now_secs: i64) -> usize {
    match engine.evict_expired(now_secs) {
        Ok(evicted) => {
            if !evicted.is_empty() {
                tracing::info!(count = evicted.len(), "Expiry sweep evicted orders");
            }
            evicted.len()
        }
        Err(e) => {
            tracing::error!(error = %e, "Expiry sweep failed");
            0
        }
    }
}

/// Forget submitters whose buckets have refilled.
pub fn prune_rate_limits(limiter: &RateLimiter, now: Instant) -> usize {
    let pruned = limiter.prune_idle(now);
    if pruned > 0 {
        tracing::debug!(pruned, remaining = limiter.tracked_submitters(), "Pruned idle rate limit buckets");
    }
    pruned
}

pub fn spawn_expiry_sweep(
    engine: MatchingEngine,
    rate_limiter: Arc<RateLimiter>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick fires immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            sweep_once(&engine, Utc::now().timestamp());
            prune_rate_limits(&rate_limiter, Instant::now());
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use matching_engine::InMemoryOrderBook;
    use rust_decimal::Decimal;
    use types::ids::{AssetId, SignerAddress, SubmitterId};
    use types::numeric::{Price, Quantity};
    use types::order::{Order, Side, SignedOrder};

    fn order(expiry: i64) -> SignedOrder {
        SignedOrder::new(
            Order {
                maker: SignerAddress::from_hex("aa"),
                asset_id: AssetId(1),
                price: Price::from_units(1),
                side: Side::Sell,
                quantity: Quantity::try_new(1).unwrap(),
                nonce: 1,
                expiry,
            },
            String::new(),
            SubmitterId::try_new("u").unwrap(),
            String::new(),
            Decimal::ONE,
            Utc.timestamp_opt(0, 0).unwrap(),
        )
    }

    #[test]
    fn test_sweep_once_evicts_expired() {
        let engine = MatchingEngine::new(Arc::new(InMemoryOrderBook::default()));
        engine.rest(order(100)).unwrap();
        engine.rest(order(300)).unwrap();

        assert_eq!(sweep_once(&engine, 200), 1);
        assert_eq!(sweep_once(&engine, 200), 0);
        assert_eq!(engine.open_orders().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_spawned_sweep_runs() {
        let engine = MatchingEngine::new(Arc::new(InMemoryOrderBook::default()));
        engine.rest(order(0)).unwrap();

        let limiter = Arc::new(RateLimiter::new(1, 1000.0));
        assert!(limiter.check(&SubmitterId::try_new("alice").unwrap()).is_ok());

        let handle = spawn_expiry_sweep(engine.clone(), Arc::clone(&limiter), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        assert!(engine.open_orders().unwrap().is_empty());
        assert_eq!(limiter.tracked_submitters(), 0);
    }

    #[test]
    fn test_prune_rate_limits_counts_dropped() {
        let limiter = RateLimiter::new(1, 1.0);
        let now = Instant::now();
        assert!(limiter.try_acquire_at(&SubmitterId::try_new("alice").unwrap(), now));
        assert_eq!(prune_rate_limits(&limiter, now), 0);
        assert_eq!(prune_rate_limits(&limiter, now + Duration::from_secs(2)), 1);
    }
}
