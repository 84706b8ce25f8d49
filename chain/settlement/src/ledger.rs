//! In-process settlement ledger
//!
//! Plays the part of the settlement contract: checks both signatures against
//! the venue domain, the pairing invariant, expiry and replay, then records
//! the fill and issues a reference derived from the two order digests.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use signing::{signing_digest, verify_order, NonceTracker, SigningDomain};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};
use types::ids::{AssetId, OrderId, SettlementReference};
use types::numeric::{Price, Quantity};
use types::order::{MatchedPair, SignedOrder};

use crate::authority::SettlementAuthority;
use crate::errors::SettlementError;

/// A settled trade as recorded by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub sequence: u64,
    pub reference: SettlementReference,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub asset_id: AssetId,
    pub quantity: Quantity,
    pub bid: Price,
    pub ask: Price,
    pub settled_at: i64,
}

#[derive(Debug, Default)]
struct LedgerState {
    nonces: NonceTracker,
    fills: Vec<Fill>,
}

/// Settlement authority living inside the venue process
#[derive(Debug)]
pub struct LedgerAuthority {
    domain: SigningDomain,
    state: Mutex<LedgerState>,
}

impl LedgerAuthority {
    pub fn new(domain: SigningDomain) -> Self {
        Self {
            domain,
            state: Mutex::new(LedgerState::default()),
        }
    }

    /// Settle `pair` as of `now_secs`.
    ///
    /// All checks happen before anything is recorded, so a refusal leaves the
    /// ledger untouched.
    pub fn settle_at(
        &self,
        pair: &MatchedPair,
        now_secs: i64,
    ) -> Result<SettlementReference, SettlementError> {
        pair.validate()?;
        for order in [pair.buy(), pair.sell()] {
            self.check_order(order, now_secs)?;
        }

        let mut state = self.lock();
        for order in [pair.buy(), pair.sell()] {
            if state.nonces.is_used(&order.order.maker, order.order.nonce) {
                return Err(SettlementError::AlreadySettled {
                    order_id: order.id,
                    maker: order.order.maker.clone(),
                    nonce: order.order.nonce,
                });
            }
        }
        state
            .nonces
            .use_nonce(pair.buy().order.maker.clone(), pair.buy().order.nonce);
        state
            .nonces
            .use_nonce(pair.sell().order.maker.clone(), pair.sell().order.nonce);

        let sequence = state.fills.len() as u64;
        let reference = self.reference_for(pair, sequence);
        let (buy, sell) = (pair.buy(), pair.sell());
        state.fills.push(Fill {
            sequence,
            reference: reference.clone(),
            buy_order_id: buy.id,
            sell_order_id: sell.id,
            asset_id: buy.order.asset_id,
            quantity: buy.order.quantity,
            bid: buy.order.price,
            ask: sell.order.price,
            settled_at: now_secs,
        });

        info!(
            reference = %reference,
            sequence,
            buy_id = %buy.id,
            sell_id = %sell.id,
            "Ledger recorded fill"
        );
        Ok(reference)
    }

    pub fn fills(&self) -> Vec<Fill> {
        self.lock().fills.clone()
    }

    pub fn domain(&self) -> &SigningDomain {
        &self.domain
    }

    fn check_order(&self, order: &SignedOrder, now_secs: i64) -> Result<(), SettlementError> {
        verify_order(&self.domain, &order.order, &order.signature).map_err(|source| {
            debug!(order_id = %order.id, error = %source, "Signature check failed");
            SettlementError::InvalidSignature {
                order_id: order.id,
                source,
            }
        })?;
        if order.is_expired(now_secs) {
            return Err(SettlementError::Expired {
                order_id: order.id,
                expiry: order.order.expiry,
            });
        }
        Ok(())
    }

    /// `0x` + hex(SHA256(buy digest ‖ sell digest ‖ sequence)).
    fn reference_for(&self, pair: &MatchedPair, sequence: u64) -> SettlementReference {
        let hash = Sha256::new()
            .chain_update(signing_digest(&self.domain, &pair.buy().order))
            .chain_update(signing_digest(&self.domain, &pair.sell().order))
            .chain_update(sequence.to_be_bytes())
            .finalize();
        SettlementReference::new(format!("0x{}", hex::encode(hash)))
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SettlementAuthority for LedgerAuthority {
    async fn settle(&self, pair: &MatchedPair) -> Result<SettlementReference, SettlementError> {
        self.settle_at(pair, Utc::now().timestamp())
    }
}
