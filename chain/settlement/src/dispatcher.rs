//! Settlement dispatcher
//!
//! Hands a matched pair to the authority and turns whatever happens into a
//! `SettlementResult`. It never touches the order book: on failure the
//! caller restores both orders.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use types::order::MatchedPair;
use types::settlement::SettlementResult;

use crate::authority::SettlementAuthority;
use crate::errors::SettlementError;

/// Default bound on one settlement call
pub const DEFAULT_SETTLEMENT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct SettlementDispatcher {
    authority: Arc<dyn SettlementAuthority>,
    timeout: Duration,
}

impl SettlementDispatcher {
    pub fn new(authority: Arc<dyn SettlementAuthority>, timeout: Duration) -> Self {
        Self { authority, timeout }
    }

    /// Attempt settlement of `pair` as of `now_secs`.
    ///
    /// Expired legs are refused without calling the authority.
    pub async fn dispatch(&self, pair: &MatchedPair, now_secs: i64) -> SettlementResult {
        match self.try_settle(pair, now_secs).await {
            Ok(reference) => {
                info!(
                    reference = %reference,
                    buy_id = %pair.buy().id,
                    sell_id = %pair.sell().id,
                    "Settlement succeeded"
                );
                SettlementResult::Settled { reference }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    buy_id = %pair.buy().id,
                    sell_id = %pair.sell().id,
                    asset_id = %pair.buy().order.asset_id,
                    "Settlement failed"
                );
                SettlementResult::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn try_settle(
        &self,
        pair: &MatchedPair,
        now_secs: i64,
    ) -> Result<types::ids::SettlementReference, SettlementError> {
        for order in [pair.buy(), pair.sell()] {
            if order.is_expired(now_secs) {
                return Err(SettlementError::Expired {
                    order_id: order.id,
                    expiry: order.order.expiry,
                });
            }
        }

        tokio::time::timeout(self.timeout, self.authority.settle(pair))
            .await
            .map_err(|_| SettlementError::Timeout(self.timeout))?
    }
}
