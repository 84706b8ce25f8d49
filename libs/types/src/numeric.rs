//! Fixed-point settlement units for prices, and order quantities
//!
//! Prices are entered by humans in display currency and settled as integers in
//! the settlement currency's smallest unit (6 decimals). Conversion rounds to
//! the nearest unit, midpoints away from zero.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::OrderError;

/// Decimal places of the settlement currency (micro-units)
pub const SETTLEMENT_DECIMALS: u32 = 6;

const UNITS_PER_WHOLE: u64 = 1_000_000;

/// Price in settlement units. Always positive once constructed from display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Wrap a raw settlement-unit amount. Used by decoders and tests.
    pub const fn from_units(units: u64) -> Self {
        Self(units)
    }

    pub const fn units(&self) -> u64 {
        self.0
    }

    /// Convert a display-currency price into settlement units.
    ///
    /// Rejects non-positive prices, prices that overflow `u64` units and
    /// prices that round down to zero units.
    pub fn from_display(display: Decimal) -> Result<Self, OrderError> {
        if display <= Decimal::ZERO {
            return Err(OrderError::InvalidOrderInput(format!(
                "price must be positive, got {display}"
            )));
        }

        let scaled = display
            .checked_mul(Decimal::from(UNITS_PER_WHOLE))
            .ok_or_else(|| OrderError::InvalidOrderInput(format!("price {display} is too large")))?;

        let units = scaled
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
            .ok_or_else(|| OrderError::InvalidOrderInput(format!("price {display} is too large")))?;

        if units == 0 {
            return Err(OrderError::InvalidOrderInput(format!(
                "price {display} is below one settlement unit"
            )));
        }

        Ok(Self(units))
    }

    /// Convert back into display currency (normalized, no trailing zeros).
    pub fn to_display(&self) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(self.0), SETTLEMENT_DECIMALS).normalize()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display())
    }
}

/// Count of identical copies in an order. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u64);

impl Quantity {
    pub fn try_new(count: u64) -> Result<Self, OrderError> {
        if count == 0 {
            return Err(OrderError::InvalidOrderInput(
                "quantity must be positive".to_owned(),
            ));
        }
        Ok(Self(count))
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
