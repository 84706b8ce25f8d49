use crate::intake::OrderIntakeService;
use crate::rate_limit::RateLimiter;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub intake: Arc<OrderIntakeService>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(intake: OrderIntakeService, rate_limiter: RateLimiter) -> Self {
        Self {
            intake: Arc::new(intake),
            rate_limiter: Arc::new(rate_limiter),
        }
    }
}
