//! Settlement authority seam

use async_trait::async_trait;
use types::ids::SettlementReference;
use types::order::MatchedPair;

use crate::errors::SettlementError;

/// External system of record that finalizes matched trades.
///
/// Implementations receive both signed orders and either return a durable
/// reference proving settlement or explain why they refused.
#[async_trait]
pub trait SettlementAuthority: Send + Sync {
    async fn settle(&self, pair: &MatchedPair) -> Result<SettlementReference, SettlementError>;
}
