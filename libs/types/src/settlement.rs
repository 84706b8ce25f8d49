//! Settlement outcome types

use serde::{Deserialize, Serialize};

use crate::ids::SettlementReference;

/// Outcome of handing a matched pair to the settlement authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SettlementResult {
    /// Durable proof that the trade was finalized
    Settled { reference: SettlementReference },
    /// The authority rejected the pair or could not be reached
    Failed { reason: String },
}

impl SettlementResult {
    pub fn is_settled(&self) -> bool {
        matches!(self, SettlementResult::Settled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settlement_result_json_shape() {
        let settled = SettlementResult::Settled {
            reference: SettlementReference::new("0xabc"),
        };
        let json = serde_json::to_value(&settled).unwrap();
        assert_eq!(json["outcome"], "settled");
        assert_eq!(json["reference"], "0xabc");
        assert!(settled.is_settled());

        let failed = SettlementResult::Failed {
            reason: "timeout".into(),
        };
        assert!(!failed.is_settled());
    }
}
