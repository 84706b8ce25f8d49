use crate::error::AppError;
use dashmap::DashMap;
use std::time::Instant;
use types::ids::SubmitterId;

#[derive(Debug, Clone)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket per submitter for order intake
pub struct RateLimiter {
    buckets: DashMap<SubmitterId, Bucket>,
    capacity: f64,
    refill_per_sec: f64,
}

impl RateLimiter {
    pub fn new(capacity: u32, refill_per_sec: f64) -> Self {
        Self {
            buckets: DashMap::new(),
            capacity: capacity as f64,
            refill_per_sec: refill_per_sec.max(0.0),
        }
    }

    pub fn check(&self, submitter: &SubmitterId) -> Result<(), AppError> {
        if self.try_acquire_at(submitter, Instant::now()) {
            Ok(())
        } else {
            Err(AppError::RateLimitExceeded(format!(
                "too many orders from {submitter}"
            )))
        }
    }

    /// Take one token for `submitter` as of `now`.
    pub fn try_acquire_at(&self, submitter: &SubmitterId, now: Instant) -> bool {
        let mut bucket = self
            .buckets
            .entry(submitter.clone())
            .or_insert_with(|| Bucket {
                tokens: self.capacity,
                last_refill: now,
            });

        let elapsed = now.saturating_duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = f64::min(self.capacity, bucket.tokens + elapsed * self.refill_per_sec);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Drop buckets that have refilled to capacity as of `now`. A dropped
    /// bucket is recreated full on the submitter's next order, so pruning
    /// never changes a rate decision. Returns how many were dropped.
    pub fn prune_idle(&self, now: Instant) -> usize {
        let before = self.buckets.len();
        self.buckets.retain(|_, bucket| {
            let elapsed = now.saturating_duration_since(bucket.last_refill).as_secs_f64();
            bucket.tokens + elapsed * self.refill_per_sec < self.capacity
        });
        before.saturating_sub(self.buckets.len())
    }

    pub fn tracked_submitters(&self) -> usize {
        self.buckets.len()
    }
}
