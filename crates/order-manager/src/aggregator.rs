//! Trade Aggregation
//!
//! Groups canonical trades (fills) by order id into one [`OrderAggregate`]
//! per order.
//!
//! ## Running Average
//!
//! Each fill updates the volume-weighted average price using the volume
//! accumulated *before* the fill:
//!
//! ```text
//! avg' = (avg * old_volume + price * volume) / (old_volume + volume)
//! ```
//!
//! - Order 42: fill 10 @ 100 -> avg 100
//! - Order 42: fill 30 @ 110 -> avg (100*10 + 110*30) / 40 = 107.5
//!
//! Bad records never abort a batch: a trade that fails validation is
//! dropped and reported as a [`Diagnostic`].

use crate::diagnostics::Diagnostic;
use log::{debug, info, warn};
use std::collections::HashMap;
use tradebook_core::{OrderAggregate, OrderId, Price, Trade, TradeDefect, Volume};

/// Result of one aggregation pass
#[derive(Debug, Clone, Default)]
pub struct AggregationOutcome {
    /// One aggregate per order id, in order of first appearance
    pub orders: Vec<OrderAggregate>,
    /// Trades that were dropped
    pub skipped: Vec<Diagnostic>,
}

impl AggregationOutcome {
    pub fn order(&self, order_id: &str) -> Option<&OrderAggregate> {
        self.orders.iter().find(|o| o.order_id == order_id)
    }
}

/// Incremental trade -> order aggregator
#[derive(Debug, Default)]
pub struct OrderAggregator {
    /// Aggregates in first-seen order
    orders: Vec<OrderAggregate>,
    /// order_id -> position in `orders`
    index: HashMap<OrderId, usize>,
    skipped: Vec<Diagnostic>,
    accepted: usize,
}

impl OrderAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one trade into its order.
    ///
    /// Returns `false` when the trade was rejected; the aggregate is left
    /// untouched in that case and a diagnostic is recorded.
    pub fn add_trade(&mut self, trade: &Trade) -> bool {
        let existing = self.index.get(&trade.order_id).copied();

        // Everything is checked before the aggregate is touched
        let update = trade.validate().and_then(|_| match existing {
            Some(idx) => fold(&self.orders[idx], trade).map(|folded| Some((idx, folded))),
            None => Ok(None),
        });

        match update {
            Err(defect) => {
                warn!(
                    "Skipping trade {} of order {}: {}",
                    trade.id, trade.order_id, defect
                );
                self.skipped.push(Diagnostic::new(trade, defect));
                return false;
            }
            Ok(Some((idx, folded))) => {
                let order = &mut self.orders[idx];
                folded.apply(order, trade);
                debug!(
                    "Order {} += {} @ {} (total={}, avg={})",
                    order.order_id, trade.volume, trade.price, order.total_volume, order.average_price
                );
            }
            Ok(None) => {
                debug!(
                    "Order {} opened by trade {} ({} {} {} @ {})",
                    trade.order_id, trade.id, trade.side, trade.volume, trade.pair, trade.price
                );
                self.index.insert(trade.order_id.clone(), self.orders.len());
                self.orders.push(open_order(trade));
            }
        }

        self.accepted += 1;
        true
    }

    /// Get the current aggregate for an order id
    pub fn order(&self, order_id: &str) -> Option<&OrderAggregate> {
        self.index.get(order_id).map(|&idx| &self.orders[idx])
    }

    /// Diagnostics recorded so far
    pub fn skipped(&self) -> &[Diagnostic] {
        &self.skipped
    }

    /// Complete the pass and hand over the aggregates
    pub fn finish(self) -> AggregationOutcome {
        info!(
            "Aggregated {} trades into {} orders ({} skipped)",
            self.accepted,
            self.orders.len(),
            self.skipped.len()
        );
        AggregationOutcome {
            orders: self.orders,
            skipped: self.skipped,
        }
    }
}

/// Aggregate a batch of trades, processed in input order
pub fn aggregate_trades(trades: &[Trade]) -> AggregationOutcome {
    let mut aggregator = OrderAggregator::new();
    for trade in trades {
        aggregator.add_trade(trade);
    }
    aggregator.finish()
}

/// A fill may not change the side or pair of the order it belongs to
fn check_consistent(order: &OrderAggregate, trade: &Trade) -> Result<(), TradeDefect> {
    if order.side != trade.side {
        return Err(TradeDefect::SideMismatch {
            expected: order.side,
            found: trade.side,
        });
    }
    if order.pair != trade.pair {
        return Err(TradeDefect::PairMismatch {
            expected: order.pair.clone(),
            found: trade.pair.clone(),
        });
    }
    Ok(())
}

fn open_order(trade: &Trade) -> OrderAggregate {
    OrderAggregate {
        order_id: trade.order_id.clone(),
        pair: trade.pair.clone(),
        side: trade.side,
        open_time: trade.timestamp,
        total_volume: trade.volume,
        highest_price: trade.price,
        lowest_price: trade.price,
        average_price: trade.price,
        exchange: trade.exchange.clone(),
        trades: vec![trade.clone()],
    }
}

/// Order totals after folding in one more fill
struct Folded {
    total_volume: Volume,
    average_price: Price,
    highest_price: Price,
    lowest_price: Price,
}

impl Folded {
    fn apply(self, order: &mut OrderAggregate, trade: &Trade) {
        order.total_volume = self.total_volume;
        order.average_price = self.average_price;
        order.highest_price = self.highest_price;
        order.lowest_price = self.lowest_price;
        order.trades.push(trade.clone());
    }
}

fn fold(order: &OrderAggregate, trade: &Trade) -> Result<Folded, TradeDefect> {
    check_consistent(order, trade)?;

    let overflow = || TradeDefect::Overflow {
        price: trade.price,
        volume: trade.volume,
    };
    let highest_price = order.highest_price.max(trade.price);
    let lowest_price = order.lowest_price.min(trade.price);

    // Weight by the volume accumulated before this fill
    let total_volume = order
        .total_volume
        .checked_add(trade.volume)
        .ok_or_else(overflow)?;
    let weighted = order
        .average_price
        .checked_mul(order.total_volume)
        .zip(trade.notional())
        .and_then(|(before, fill)| before.checked_add(fill))
        .ok_or_else(overflow)?;
    let average = weighted.checked_div(total_volume).ok_or_else(overflow)?;
    // Rounding in the last decimal place must not break lowest <= avg <= highest
    let average_price = average.clamp(lowest_price, highest_price);

    // The matcher needs the order's cost
    average_price
        .checked_mul(total_volume)
        .ok_or_else(overflow)?;

    Ok(Folded {
        total_volume,
        average_price,
        highest_price,
        lowest_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tradebook_core::Side;

    fn fill(id: &str, order: &str, side: Side, price: Decimal, volume: Decimal) -> Trade {
        Trade::new(id, order, "BTC/USDT", side, price, volume, 1_000)
    }

    #[test]
    fn test_weighted_average() {
        let outcome = aggregate_trades(&[
            fill("t-1", "o-1", Side::Buy, dec!(100), dec!(10)),
            fill("t-2", "o-1", Side::Buy, dec!(110), dec!(30)),
        ]);

        assert_eq!(outcome.orders.len(), 1);
        let order = &outcome.orders[0];
        assert_eq!(order.average_price, dec!(107.5));
        assert_eq!(order.total_volume, dec!(40));
        assert_eq!(order.highest_price, dec!(110));
        assert_eq!(order.lowest_price, dec!(100));
        assert_eq!(order.trades.len(), 2);
    }

    #[test]
    fn test_first_trade_initializes_order() {
        let trade = fill("t-1", "o-1", Side::Sell, dec!(2.14), dec!(4833.1))
            .with_exchange("Binance");
        let outcome = aggregate_trades(std::slice::from_ref(&trade));

        let order = &outcome.orders[0];
        assert_eq!(order.order_id, "o-1");
        assert_eq!(order.side, Side::Sell);
        assert_eq!(order.open_time, 1_000);
        assert_eq!(order.highest_price, dec!(2.14));
        assert_eq!(order.lowest_price, dec!(2.14));
        assert_eq!(order.average_price, dec!(2.14));
        assert_eq!(order.exchange, "Binance");
        assert_eq!(order.trades, vec![trade]);
    }

    #[test]
    fn test_non_contiguous_fills_keep_first_seen_order() {
        let outcome = aggregate_trades(&[
            fill("t-1", "o-1", Side::Buy, dec!(10), dec!(1)),
            fill("t-2", "o-2", Side::Sell, dec!(11), dec!(1)),
            fill("t-3", "o-1", Side::Buy, dec!(12), dec!(1)),
            fill("t-4", "o-3", Side::Buy, dec!(13), dec!(1)),
            fill("t-5", "o-2", Side::Sell, dec!(9), dec!(3)),
        ]);

        let ids: Vec<&str> = outcome.orders.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, vec!["o-1", "o-2", "o-3"]);

        let o1 = outcome.order("o-1").unwrap();
        assert_eq!(o1.total_volume, dec!(2));
        assert_eq!(o1.average_price, dec!(11));
        let trade_ids: Vec<&str> = o1.trades.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(trade_ids, vec!["t-1", "t-3"]);

        let o2 = outcome.order("o-2").unwrap();
        assert_eq!(o2.total_volume, dec!(4));
        assert_eq!(o2.average_price, dec!(9.5));
        assert_eq!(o2.lowest_price, dec!(9));
    }

    #[test]
    fn test_open_time_is_first_arrival_not_earliest() {
        let mut late = fill("t-1", "o-1", Side::Buy, dec!(10), dec!(1));
        late.timestamp = 5_000;
        let mut early = fill("t-2", "o-1", Side::Buy, dec!(10), dec!(1));
        early.timestamp = 1_000;

        let outcome = aggregate_trades(&[late, early]);
        assert_eq!(outcome.orders[0].open_time, 5_000);
        assert_eq!(outcome.orders[0].trades[0].id, "t-1");
    }

    #[test]
    fn test_malformed_trades_are_skipped() {
        let mut zero_volume = fill("t-2", "o-1", Side::Buy, dec!(10), dec!(1));
        zero_volume.volume = dec!(0);
        let negative_price = fill("t-3", "o-2", Side::Buy, dec!(-5), dec!(1));

        let outcome = aggregate_trades(&[
            fill("t-1", "o-1", Side::Buy, dec!(10), dec!(2)),
            zero_volume,
            negative_price,
            fill("t-4", "o-1", Side::Buy, dec!(13), dec!(1)),
        ]);

        assert_eq!(outcome.orders.len(), 1);
        assert_eq!(outcome.orders[0].total_volume, dec!(3));
        assert_eq!(outcome.orders[0].average_price, dec!(11));

        assert_eq!(outcome.skipped.len(), 2);
        assert_eq!(outcome.skipped[0].trade_id, "t-2");
        assert_eq!(
            outcome.skipped[0].defect,
            TradeDefect::NonPositiveVolume(dec!(0))
        );
        assert_eq!(outcome.skipped[1].trade_id, "t-3");
        assert_eq!(
            outcome.skipped[1].defect,
            TradeDefect::NonPositivePrice(dec!(-5))
        );
    }

    #[test]
    fn test_side_mismatch_leaves_order_untouched() {
        let mut aggregator = OrderAggregator::new();
        assert!(aggregator.add_trade(&fill("t-1", "o-1", Side::Buy, dec!(10), dec!(1))));
        assert!(!aggregator.add_trade(&fill("t-2", "o-1", Side::Sell, dec!(20), dec!(5))));

        let order = aggregator.order("o-1").unwrap();
        assert_eq!(order.total_volume, dec!(1));
        assert_eq!(order.highest_price, dec!(10));
        assert_eq!(order.trades.len(), 1);
        assert_eq!(
            aggregator.skipped()[0].defect,
            TradeDefect::SideMismatch {
                expected: Side::Buy,
                found: Side::Sell
            }
        );
    }

    #[test]
    fn test_pair_mismatch_is_skipped() {
        let mut other_pair = fill("t-2", "o-1", Side::Buy, dec!(10), dec!(1));
        other_pair.pair = "ETH/USDT".to_string();

        let outcome = aggregate_trades(&[fill("t-1", "o-1", Side::Buy, dec!(10), dec!(1)), other_pair]);
        assert_eq!(outcome.orders[0].trades.len(), 1);
        assert!(matches!(
            outcome.skipped[0].defect,
            TradeDefect::PairMismatch { .. }
        ));
    }

    #[test]
    fn test_unrepresentable_fills_are_skipped() {
        let outcome = aggregate_trades(&[
            // 1e15 * 1e14 does not fit in a Decimal
            fill("t-1", "o-1", Side::Buy, dec!(1000000000000000), dec!(100000000000000)),
            // 1e14 * 5e14 = 5e28 fits, but a second such fill overflows the weighted sum
            fill("t-2", "o-2", Side::Buy, dec!(100000000000000), dec!(500000000000000)),
            fill("t-3", "o-2", Side::Buy, dec!(100000000000000), dec!(500000000000000)),
        ]);

        assert_eq!(outcome.orders.len(), 1);
        let order = &outcome.orders[0];
        assert_eq!(order.order_id, "o-2");
        assert_eq!(order.total_volume, dec!(500000000000000));
        assert_eq!(order.trades.len(), 1);

        let skipped: Vec<&str> = outcome.skipped.iter().map(|d| d.trade_id.as_str()).collect();
        assert_eq!(skipped, vec!["t-1", "t-3"]);
        assert!(outcome
            .skipped
            .iter()
            .all(|d| matches!(d.defect, TradeDefect::Overflow { .. })));
    }

    #[test]
    fn test_empty_input() {
        let outcome = aggregate_trades(&[]);
        assert!(outcome.orders.is_empty());
        assert!(outcome.skipped.is_empty());
    }
}
