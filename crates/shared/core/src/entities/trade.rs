use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Side;
use crate::values::{Pair, Price, TimestampMs, Volume};

/// Exchange-assigned trade identifier (unique per exchange)
pub type TradeId = String;

/// Exchange-assigned order identifier, shared by every fill of one order
pub type OrderId = String;

/// One fill execution, in canonical form.
///
/// Produced by a normalizer from an exchange-specific payload and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub order_id: OrderId,
    pub pair: Pair,
    /// Execution time, milliseconds since the Unix epoch
    pub timestamp: TimestampMs,
    pub side: Side,
    /// Exchange order type ("limit", "market", ...); empty when unknown
    #[serde(default)]
    pub order_type: String,
    pub price: Price,
    /// Quote amount paid or received (price * volume unless the exchange says otherwise)
    #[serde(default)]
    pub cost: Decimal,
    #[serde(default)]
    pub fee: Decimal,
    pub volume: Volume,
    #[serde(default)]
    pub exchange: String,
}

/// Why a trade cannot take part in aggregation
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDefect {
    #[error("volume must be positive, got {0}")]
    NonPositiveVolume(Decimal),

    #[error("price must be positive, got {0}")]
    NonPositivePrice(Decimal),

    #[error("cost must not be negative, got {0}")]
    NegativeCost(Decimal),

    #[error("fee must not be negative, got {0}")]
    NegativeFee(Decimal),

    #[error("price {price} x volume {volume} is not representable")]
    Overflow { price: Decimal, volume: Decimal },

    #[error("missing required field `{0}`")]
    MissingField(String),

    #[error("side {found} conflicts with side {expected} of its order")]
    SideMismatch { expected: Side, found: Side },

    #[error("pair {found} conflicts with pair {expected} of its order")]
    PairMismatch { expected: Pair, found: Pair },
}

impl Trade {
    /// Create a trade; cost defaults to `price * volume`, fee to zero.
    pub fn new(
        id: impl Into<TradeId>,
        order_id: impl Into<OrderId>,
        pair: impl Into<Pair>,
        side: Side,
        price: Price,
        volume: Volume,
        timestamp: TimestampMs,
    ) -> Self {
        Self {
            id: id.into(),
            order_id: order_id.into(),
            pair: pair.into(),
            timestamp,
            side,
            order_type: String::new(),
            price,
            // an unrepresentable notional is rejected by `validate`
            cost: price.checked_mul(volume).unwrap_or_default(),
            fee: Decimal::ZERO,
            volume,
            exchange: String::new(),
        }
    }

    pub fn with_fee(mut self, fee: Decimal) -> Self {
        self.fee = fee;
        self
    }

    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = exchange.into();
        self
    }

    /// Notional value (price * volume); `None` when it overflows
    pub fn notional(&self) -> Option<Decimal> {
        self.price.checked_mul(self.volume)
    }

    /// Check the record-level invariants.
    ///
    /// Only the first defect found is reported.
    pub fn validate(&self) -> Result<(), TradeDefect> {
        if self.order_id.trim().is_empty() {
            return Err(TradeDefect::MissingField("order_id".to_string()));
        }
        if self.pair.trim().is_empty() {
            return Err(TradeDefect::MissingField("pair".to_string()));
        }
        if self.volume <= Decimal::ZERO {
            return Err(TradeDefect::NonPositiveVolume(self.volume));
        }
        if self.price <= Decimal::ZERO {
            return Err(TradeDefect::NonPositivePrice(self.price));
        }
        if self.notional().is_none() {
            return Err(TradeDefect::Overflow {
                price: self.price,
                volume: self.volume,
            });
        }
        if self.cost < Decimal::ZERO {
            return Err(TradeDefect::NegativeCost(self.cost));
        }
        if self.fee < Decimal::ZERO {
            return Err(TradeDefect::NegativeFee(self.fee));
        }
        Ok(())
    }
}
