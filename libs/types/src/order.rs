//! Order model: unsigned orders, signed resting orders and matched pairs
//!
//! An `Order` carries exactly the fields covered by the maker's signature.
//! `SignedOrder` adds the signature and the bookkeeping the venue keeps for
//! listings and audit. `MatchedPair` lives only for one settlement attempt.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::OrderError;
use crate::ids::{AssetId, OrderId, SignerAddress, SubmitterId};
use crate::numeric::{Price, Quantity};

/// Lifetime of a freshly built order (24 hours)
pub const ORDER_TTL_SECS: i64 = 24 * 60 * 60;

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn from_is_buy(is_buy: bool) -> Self {
        if is_buy {
            Side::Buy
        } else {
            Side::Sell
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, Side::Buy)
    }

    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// The signable part of an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub maker: SignerAddress,
    pub asset_id: AssetId,
    pub price: Price,
    pub side: Side,
    pub quantity: Quantity,
    /// Unique per maker; prevents replay at settlement
    pub nonce: u64,
    /// Unix seconds after which the order is void
    pub expiry: i64,
}

impl Order {
    /// Build an order from human input.
    ///
    /// Converts the display price to settlement units and sets the expiry
    /// `ORDER_TTL_SECS` after `now`. Zero quantities and non-positive prices
    /// are rejected before anything is constructed.
    pub fn build(
        maker: SignerAddress,
        asset_id: AssetId,
        display_price: Decimal,
        side: Side,
        quantity: u64,
        nonce: u64,
        now: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        let quantity = Quantity::try_new(quantity)?;
        let price = Price::from_display(display_price)?;

        Ok(Self {
            maker,
            asset_id,
            price,
            side,
            quantity,
            nonce,
            expiry: now.timestamp() + ORDER_TTL_SECS,
        })
    }

    pub fn is_expired(&self, now_secs: i64) -> bool {
        now_secs > self.expiry
    }
}

/// An order plus its signature and venue bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedOrder {
    pub id: OrderId,
    pub order: Order,
    /// Hex-encoded Ed25519 signature over the domain-separated order digest
    pub signature: String,
    pub created_at: DateTime<Utc>,
    pub submitter_id: SubmitterId,
    /// Human-readable asset label, for observability only
    pub display_name: String,
    /// Price exactly as entered, kept for audit since `order.price` is rounded
    pub display_price: Decimal,
}

impl SignedOrder {
    pub fn new(
        order: Order,
        signature: String,
        submitter_id: SubmitterId,
        display_name: String,
        display_price: Decimal,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            order,
            signature,
            created_at,
            submitter_id,
            display_name,
            display_price,
        }
    }

    pub fn side(&self) -> Side {
        self.order.side
    }

    pub fn is_expired(&self, now_secs: i64) -> bool {
        self.order.is_expired(now_secs)
    }
}

/// A (buy, sell) pair selected for one settlement attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    buy: SignedOrder,
    sell: SignedOrder,
}

impl MatchedPair {
    /// Orient two orders into buy and sell legs.
    ///
    /// Orientation only; call [`MatchedPair::validate`] before settling.
    pub fn new(incoming: SignedOrder, resting: SignedOrder) -> Self {
        if incoming.side().is_buy() {
            Self { buy: incoming, sell: resting }
        } else {
            Self { buy: resting, sell: incoming }
        }
    }

    pub fn buy(&self) -> &SignedOrder {
        &self.buy
    }

    pub fn sell(&self) -> &SignedOrder {
        &self.sell
    }

    /// Check the pairing invariant: same asset, opposite sides, equal
    /// quantity, and the bid at or above the ask.
    pub fn validate(&self) -> Result<(), OrderError> {
        let (buy, sell) = (&self.buy.order, &self.sell.order);

        if self.buy.id == self.sell.id {
            return Err(OrderError::InvalidPair("order matched against itself".into()));
        }
        if buy.side != Side::Buy || sell.side != Side::Sell {
            return Err(OrderError::InvalidPair("both orders are on the same side".into()));
        }
        if buy.asset_id != sell.asset_id {
            return Err(OrderError::InvalidPair(format!(
                "asset {} does not match asset {}",
                buy.asset_id, sell.asset_id
            )));
        }
        if buy.quantity != sell.quantity {
            return Err(OrderError::InvalidPair(format!(
                "quantity {} does not match quantity {}",
                buy.quantity, sell.quantity
            )));
        }
        if buy.price < sell.price {
            return Err(OrderError::InvalidPair(format!(
                "bid {} is below ask {}",
                buy.price, sell.price
            )));
        }
        Ok(())
    }

    pub fn into_orders(self) -> (SignedOrder, SignedOrder) {
        (self.buy, self.sell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_708_123_456, 0).unwrap()
    }

    fn signed(side: Side, asset: u64, price: &str, qty: u64) -> SignedOrder {
        let display_price = Decimal::from_str(price).unwrap();
        let order = Order::build(
            SignerAddress::from_hex("ab".repeat(32)),
            AssetId(asset),
            display_price,
            side,
            qty,
            1,
            now(),
        )
        .unwrap();
        SignedOrder::new(
            order,
            "00".repeat(64),
            SubmitterId::try_new("user-1").unwrap(),
            "Charizard PSA 10".to_owned(),
            display_price,
            now(),
        )
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
        assert_eq!(Side::from_is_buy(true), Side::Buy);
        assert!(!Side::Sell.is_buy());
    }

    #[test]
    fn test_build_sets_expiry_one_day_ahead() {
        let order = signed(Side::Buy, 7, "100", 1).order;
        assert_eq!(order.expiry, now().timestamp() + ORDER_TTL_SECS);
        assert_eq!(order.price.units(), 100_000_000);
        assert!(!order.is_expired(now().timestamp()));
        assert!(!order.is_expired(order.expiry));
        assert!(order.is_expired(order.expiry + 1));
    }

    #[test]
    fn test_build_rejects_invalid_input() {
        let maker = SignerAddress::from_hex("ab".repeat(32));
        let zero_qty = Order::build(maker.clone(), AssetId(1), Decimal::ONE, Side::Buy, 0, 1, now());
        assert!(matches!(zero_qty, Err(OrderError::InvalidOrderInput(_))));

        let zero_price = Order::build(maker, AssetId(1), Decimal::ZERO, Side::Buy, 1, 1, now());
        assert!(matches!(zero_price, Err(OrderError::InvalidOrderInput(_))));
    }

    #[test]
    fn test_pair_orients_by_side() {
        let sell = signed(Side::Sell, 7, "100", 1);
        let buy = signed(Side::Buy, 7, "100", 1);

        let pair = MatchedPair::new(sell.clone(), buy.clone());
        assert_eq!(pair.buy().id, buy.id);
        assert_eq!(pair.sell().id, sell.id);
        assert!(pair.validate().is_ok());

        let (b, s) = pair.into_orders();
        assert_eq!((b.id, s.id), (buy.id, sell.id));
    }

    #[test]
    fn test_pair_rejects_mismatches() {
        let buy = signed(Side::Buy, 7, "100", 1);

        let other_asset = signed(Side::Sell, 8, "100", 1);
        assert!(MatchedPair::new(buy.clone(), other_asset).validate().is_err());

        let other_qty = signed(Side::Sell, 7, "100", 2);
        assert!(MatchedPair::new(buy.clone(), other_qty).validate().is_err());

        let pricier = signed(Side::Sell, 7, "100.000001", 1);
        assert!(MatchedPair::new(buy.clone(), pricier).validate().is_err());

        let same_side = signed(Side::Buy, 7, "100", 1);
        assert!(MatchedPair::new(buy.clone(), same_side).validate().is_err());

        assert!(MatchedPair::new(buy.clone(), buy).validate().is_err());
    }

    #[test]
    fn test_signed_order_serialization() {
        let order = signed(Side::Sell, 3, "3000.50", 2);
        let json = serde_json::to_string(&order).unwrap();
        let restored: SignedOrder = serde_json::from_str(&json).unwrap();
        assert_eq!(order, restored);
        assert!(json.contains("\"SELL\""));
    }
}
