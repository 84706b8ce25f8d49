//! Order intake
//!
//! Drives one submission through its lifecycle:
//! `Received -> Signed -> (Matched | Resting) -> (Settled | SettlementFailed -> Resting)`.
//! Claiming the counterparty is atomic in the book; settlement runs after
//! the claim, outside any lock.

use chrono::Utc;
use matching_engine::{ClaimOutcome, EngineError, MatchingEngine};
use rust_decimal::Decimal;
use settlement::SettlementDispatcher;
use signing::{NonceGenerator, OrderSigner, SigningError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use types::errors::OrderError;
use types::ids::{AssetId, SettlementReference, SignerAddress, SubmitterId};
use types::order::{Order, Side, SignedOrder};
use types::settlement::SettlementResult;

pub const QUEUED_MESSAGE: &str = "Order queued, awaiting counterparty";
pub const SETTLEMENT_PENDING_MESSAGE: &str = "Matched; settlement pending";

/// A validated order submission
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSubmission {
    pub submitter_id: SubmitterId,
    pub asset_id: AssetId,
    pub display_price: Decimal,
    pub side: Side,
    pub quantity: u64,
    pub display_name: String,
}

/// Terminal outcome of one submission
#[derive(Debug, Clone, PartialEq)]
pub enum IntakeOutcome {
    Settled {
        reference: SettlementReference,
        signer_address: SignerAddress,
    },
    Queued {
        signer_address: SignerAddress,
        message: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Signing failed: {0}")]
    Signing(#[from] SigningError),

    #[error("Order book failure: {0}")]
    Engine(#[from] EngineError),
}

impl From<OrderError> for IntakeError {
    fn from(e: OrderError) -> Self {
        IntakeError::InvalidRequest(e.to_string())
    }
}

pub struct OrderIntakeService {
    signer: Arc<dyn OrderSigner>,
    engine: MatchingEngine,
    dispatcher: SettlementDispatcher,
    nonces: NonceGenerator,
}

impl OrderIntakeService {
    pub fn new(
        signer: Arc<dyn OrderSigner>,
        engine: MatchingEngine,
        dispatcher: SettlementDispatcher,
    ) -> Self {
        Self {
            signer,
            engine,
            dispatcher,
            nonces: NonceGenerator::new(),
        }
    }

    pub async fn submit(&self, submission: OrderSubmission) -> Result<IntakeOutcome, IntakeError> {
        let OrderSubmission {
            submitter_id,
            asset_id,
            display_price,
            side,
            quantity,
            display_name,
        } = submission;
        let now = Utc::now();
        info!(submitter = %submitter_id, asset_id = %asset_id, ?side, quantity, "Order received");

        let signer_address = self.signer.signer_for(&submitter_id)?;
        let nonce = self.nonces.next_at(now.timestamp_millis().max(0) as u64);
        let order = Order::build(
            signer_address.clone(),
            asset_id,
            display_price,
            side,
            quantity,
            nonce,
            now,
        )?;
        let signature = self.signer.sign(&submitter_id, &order)?;
        debug!(signer = %signer_address.short(), nonce, "Order signed");

        let signed = SignedOrder::new(order, signature, submitter_id, display_name, display_price, now);
        let pair = match self.engine.claim(signed, now.timestamp())? {
            ClaimOutcome::Unmatched(order) => {
                self.engine.rest(order)?;
                return Ok(IntakeOutcome::Queued {
                    signer_address,
                    message: QUEUED_MESSAGE,
                });
            }
            ClaimOutcome::Matched(pair) => pair,
        };

        match self.dispatcher.dispatch(&pair, Utc::now().timestamp()).await {
            SettlementResult::Settled { reference } => Ok(IntakeOutcome::Settled {
                reference,
                signer_address,
            }),
            SettlementResult::Failed { .. } => {
                // the dispatcher logged the authority's reason
                self.engine.restore(pair)?;
                Ok(IntakeOutcome::Queued {
                    signer_address,
                    message: SETTLEMENT_PENDING_MESSAGE,
                })
            }
        }
    }

    /// Open orders, oldest first.
    pub fn open_orders(&self) -> Result<Vec<SignedOrder>, IntakeError> {
        Ok(self.engine.open_orders()?)
    }
}
