use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use types::ids::{AssetId, SubmitterId};
use types::order::{Side, SignedOrder};

use crate::intake::{IntakeError, IntakeOutcome, OrderSubmission};

/// Intake request body. Every field is optional at the wire level so a
/// missing field is reported by name instead of as a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub submitter_id: Option<String>,
    pub asset_id: Option<u64>,
    /// JSON number or decimal string. Only the string form keeps the scale
    /// as typed (`"1250.50"`); a number is read as the shortest decimal
    /// for its value (`1250.50` becomes `1250.5`).
    pub display_price: Option<Value>,
    pub is_buy: Option<bool>,
    pub quantity: Option<u64>,
    pub display_name: Option<String>,
}

fn required<T>(field: Option<T>, name: &str) -> Result<T, IntakeError> {
    field.ok_or_else(|| IntakeError::InvalidRequest(format!("{name} is required")))
}

fn parse_display_price(value: Value) -> Result<Decimal, IntakeError> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s,
        _ => return Err(IntakeError::InvalidRequest("displayPrice must be a decimal number".into())),
    };
    Decimal::from_str(text.trim())
        .or_else(|_| Decimal::from_scientific(text.trim()))
        .map_err(|_| IntakeError::InvalidRequest(format!("displayPrice {text:?} is not a decimal number")))
}

impl TryFrom<CreateOrderRequest> for OrderSubmission {
    type Error = IntakeError;

    fn try_from(request: CreateOrderRequest) -> Result<Self, Self::Error> {
        let submitter_id = SubmitterId::try_new(required(request.submitter_id, "submitterId")?)
            .ok_or_else(|| IntakeError::InvalidRequest("submitterId must not be blank".into()))?;
        let asset_id = AssetId(required(request.asset_id, "assetId")?);
        let display_price = parse_display_price(required(request.display_price, "displayPrice")?)?;
        let side = Side::from_is_buy(required(request.is_buy, "isBuy")?);
        let quantity = required(request.quantity, "quantity")?;
        let display_name = request
            .display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("Asset #{asset_id}"));

        Ok(OrderSubmission {
            submitter_id,
            asset_id,
            display_price,
            side,
            quantity,
            display_name,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum OrderResponse {
    Settled {
        settlement_reference: String,
        signer_address: String,
    },
    Queued {
        signer_address: String,
        message: String,
    },
}

impl From<IntakeOutcome> for OrderResponse {
    fn from(outcome: IntakeOutcome) -> Self {
        match outcome {
            IntakeOutcome::Settled {
                reference,
                signer_address,
            } => OrderResponse::Settled {
                settlement_reference: reference.to_string(),
                signer_address: signer_address.to_string(),
            },
            IntakeOutcome::Queued {
                signer_address,
                message,
            } => OrderResponse::Queued {
                signer_address: signer_address.to_string(),
                message: message.to_string(),
            },
        }
    }
}

/// Listing projection of a resting order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenOrderView {
    pub display_name: String,
    pub side: Side,
    pub display_price: Decimal,
    pub quantity: u64,
    pub signer_short: String,
    pub created_at: DateTime<Utc>,
}

impl From<&SignedOrder> for OpenOrderView {
    fn from(order: &SignedOrder) -> Self {
        Self {
            display_name: order.display_name.clone(),
            side: order.side(),
            display_price: order.display_price,
            quantity: order.order.quantity.get(),
            signer_short: order.order.maker.short(),
            created_at: order.created_at,
        }
    }
}
