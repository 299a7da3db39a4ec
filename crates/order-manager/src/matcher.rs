//! Position Matching
//!
//! Turns a chronological stream of order aggregates into closed round-trip
//! positions, one pair at a time.
//!
//! For every order the pair's [`PairAccumulator`] adds the order's volume
//! and cost to its side, then runs the volume-balance test:
//!
//! ```text
//! |buy - sell| / ((buy + sell) / 2) * 100 <= tolerance_percent
//! ```
//!
//! When the test passes the pending orders become one [`Position`] and the
//! accumulator resets. When it never passes (e.g. a buy whose sell has not
//! happened yet) the orders stay pending and are reported as
//! [`OpenExposure`], never as a position.
//!
//! ## Example
//!
//! - buy 50 @ 10, buy 50 @ 12 -> 200% imbalance, keep accumulating
//! - sell 100 @ 11            -> 0% imbalance, close:
//!   long, buy_cost 1100, sell_cost 1100, profit 0

use crate::accumulator::{OpenExposure, PairAccumulator};
use crate::error::{Error, Result};
use log::{debug, info};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tradebook_core::{OrderAggregate, Pair, Position};

/// Configuration for position matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Maximum buy/sell volume imbalance (percent of mean volume) that still
    /// counts as a closed round-trip
    pub tolerance_percent: Decimal,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            tolerance_percent: dec!(2.0),
        }
    }
}

impl MatcherConfig {
    pub fn with_tolerance(tolerance_percent: Decimal) -> Self {
        Self { tolerance_percent }
    }

    pub fn validate(&self) -> Result<()> {
        if self.tolerance_percent < Decimal::ZERO {
            return Err(Error::InvalidTolerance(self.tolerance_percent));
        }
        Ok(())
    }
}

/// Result of one matching pass
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// Closed positions: grouped by pair (first-encounter order), each
    /// pair's positions in the order their closing order was processed
    pub positions: Vec<Position>,
    /// Pairs with unmatched orders left over
    pub open: Vec<OpenExposure>,
    /// Every pair seen, in first-encounter order
    pub pairs: Vec<Pair>,
}

impl MatchOutcome {
    pub fn positions_for<'a>(&'a self, pair: &'a str) -> impl Iterator<Item = &'a Position> + 'a {
        self.positions.iter().filter(move |p| p.pair == pair)
    }

    pub fn open_for(&self, pair: &str) -> Option<&OpenExposure> {
        self.open.iter().find(|o| o.pair == pair)
    }
}

/// Incremental order -> position matcher.
///
/// Feeding orders one at a time emits positions in processing order;
/// pairs never share accumulator state.
#[derive(Debug)]
pub struct PositionMatcher {
    config: MatcherConfig,
    /// Accumulators in first-encounter order
    accumulators: Vec<(Pair, PairAccumulator)>,
    /// pair -> position in `accumulators`
    index: HashMap<Pair, usize>,
    emitted: usize,
}

impl PositionMatcher {
    pub fn new(config: MatcherConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            accumulators: Vec::new(),
            index: HashMap::new(),
            emitted: 0,
        })
    }

    /// Process the next order of its pair.
    ///
    /// Returns the closed position when this order balanced the run.
    pub fn process(&mut self, order: OrderAggregate) -> Result<Option<Position>> {
        let idx = match self.index.get(&order.pair) {
            Some(&idx) => idx,
            None => {
                let idx = self.accumulators.len();
                self.index.insert(order.pair.clone(), idx);
                self.accumulators
                    .push((order.pair.clone(), PairAccumulator::new()));
                idx
            }
        };
        let (pair, acc) = &mut self.accumulators[idx];

        debug!(
            "[{}] {} order {}: {} @ {}",
            pair, order.side, order.order_id, order.total_volume, order.average_price
        );
        acc.add(order)?;

        let balanced = acc
            .is_balanced(self.config.tolerance_percent)
            .ok_or_else(|| Error::DegenerateBalance { pair: pair.clone() })?;

        if !balanced {
            return Ok(None);
        }

        let position = close_run(pair, acc);
        self.emitted += 1;
        info!(
            "[{}] Closed {:?} position over {} orders: buy_cost={}, sell_cost={}, pnl={}",
            position.pair,
            position.position_type,
            position.orders.len(),
            position.buy_cost,
            position.sell_cost,
            position.profit_loss
        );
        Ok(Some(position))
    }

    /// Current accumulator for a pair
    pub fn accumulator(&self, pair: &str) -> Option<&PairAccumulator> {
        self.index.get(pair).map(|&idx| &self.accumulators[idx].1)
    }

    /// Pairs that currently hold pending orders
    pub fn open_exposure(&self) -> Vec<OpenExposure> {
        self.accumulators
            .iter()
            .filter(|(_, acc)| !acc.is_empty())
            .map(|(pair, acc)| acc.snapshot(pair))
            .collect()
    }

    /// Pairs seen so far, in first-encounter order
    pub fn pairs(&self) -> Vec<Pair> {
        self.accumulators.iter().map(|(pair, _)| pair.clone()).collect()
    }

    /// Number of positions emitted so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Stop matching. Trailing unmatched orders are reported, not flushed.
    pub fn finish(self) -> Vec<OpenExposure> {
        self.open_exposure()
    }
}

/// Match a batch of orders.
///
/// Orders are partitioned by pair (arrival order preserved within a pair)
/// and each pair is matched in turn, pairs taken in first-encounter order.
pub fn match_positions(orders: &[OrderAggregate], config: &MatcherConfig) -> Result<MatchOutcome> {
    let mut matcher = PositionMatcher::new(config.clone())?;

    let mut groups: Vec<Vec<&OrderAggregate>> = Vec::new();
    let mut group_index: HashMap<&str, usize> = HashMap::new();
    for order in orders {
        let idx = *group_index.entry(order.pair.as_str()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[idx].push(order);
    }

    let mut positions = Vec::new();
    for group in groups {
        for order in group {
            if let Some(position) = matcher.process(order.clone())? {
                positions.push(position);
            }
        }
    }

    let pairs = matcher.pairs();
    let open = matcher.finish();
    info!(
        "Matched {} orders across {} pairs into {} positions ({} pairs still open)",
        orders.len(),
        pairs.len(),
        positions.len(),
        open.len()
    );

    Ok(MatchOutcome {
        positions,
        open,
        pairs,
    })
}

/// Build the position for a balanced run and reset the accumulator
fn close_run(pair: &str, acc: &mut PairAccumulator) -> Position {
    let position_type = acc.position_type();
    let buy_cost = acc.buy_cost;
    let sell_cost = acc.sell_cost;
    let orders = acc.reset();

    // Reference time and price come from the first fill of the first order in the run
    let (open_time, price) = orders
        .first()
        .map(|first| match first.first_trade() {
            Some(trade) => (trade.timestamp, trade.price),
            None => (first.open_time, first.average_price),
        })
        .unwrap_or_default();

    Position {
        pair: pair.to_string(),
        open_time,
        position_type,
        buy_cost,
        sell_cost,
        profit_loss: position_type.profit_loss(buy_cost, sell_cost),
        price,
        orders,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradebook_core::{PositionType, Side, Trade};

    fn order(id: &str, pair: &str, side: Side, volume: Decimal, price: Decimal, time: i64) -> OrderAggregate {
        OrderAggregate {
            order_id: id.to_string(),
            pair: pair.to_string(),
            side,
            open_time: time,
            total_volume: volume,
            highest_price: price,
            lowest_price: price,
            average_price: price,
            exchange: String::new(),
            trades: vec![Trade::new(format!("{id}-1"), id, pair, side, price, volume, time)],
        }
    }

    #[test]
    fn test_simple_full_match() {
        let orders = vec![
            order("o-1", "X/Y", Side::Buy, dec!(100), dec!(10), 1_000),
            order("o-2", "X/Y", Side::Sell, dec!(100), dec!(11), 2_000),
        ];

        let outcome = match_positions(&orders, &MatcherConfig::default()).unwrap();
        assert_eq!(outcome.positions.len(), 1);

        let position = &outcome.positions[0];
        assert_eq!(position.position_type, PositionType::Long);
        assert_eq!(position.buy_cost, dec!(1000));
        assert_eq!(position.sell_cost, dec!(1100));
        assert_eq!(position.profit_loss, dec!(100));
        assert_eq!(position.open_time, 1_000);
        assert_eq!(position.price, dec!(10));
        assert_eq!(position.orders.len(), 2);
        assert!(outcome.open.is_empty());
    }

    #[test]
    fn test_short_round_trip() {
        let orders = vec![
            order("o-1", "X/Y", Side::Sell, dec!(10), dec!(50), 1_000),
            order("o-2", "X/Y", Side::Buy, dec!(10), dec!(45), 2_000),
        ];

        let outcome = match_positions(&orders, &MatcherConfig::default()).unwrap();
        let position = &outcome.positions[0];
        assert_eq!(position.position_type, PositionType::Short);
        // Short runs report buy_cost - sell_cost
        assert_eq!(position.profit_loss, dec!(-50));
        assert_eq!(position.price, dec!(50));
    }

    #[test]
    fn test_no_match_leaves_open_exposure() {
        let orders = vec![order("o-1", "X/Y", Side::Buy, dec!(100), dec!(10), 1_000)];

        let outcome = match_positions(&orders, &MatcherConfig::default()).unwrap();
        assert!(outcome.positions.is_empty());

        let open = outcome.open_for("X/Y").unwrap();
        assert_eq!(open.buy_volume, dec!(100));
        assert_eq!(open.pending_orders.len(), 1);
        assert_eq!(open.pending_orders[0].order_id, "o-1");
    }

    #[test]
    fn test_partial_accumulation_then_match() {
        let mut matcher = PositionMatcher::new(MatcherConfig::default()).unwrap();

        assert!(matcher
            .process(order("b1", "X/Y", Side::Buy, dec!(50), dec!(10), 1_000))
            .unwrap()
            .is_none());
        assert!(matcher
            .process(order("b2", "X/Y", Side::Buy, dec!(50), dec!(12), 2_000))
            .unwrap()
            .is_none());
        assert_eq!(matcher.accumulator("X/Y").unwrap().buy_volume, dec!(100));

        let position = matcher
            .process(order("s1", "X/Y", Side::Sell, dec!(100), dec!(11), 3_000))
            .unwrap()
            .expect("run should close");

        assert_eq!(position.orders.len(), 3);
        assert_eq!(position.buy_cost, dec!(1100));
        assert_eq!(position.sell_cost, dec!(1100));
        assert_eq!(position.profit_loss, dec!(0));
        assert_eq!(position.open_time, 1_000);
        assert_eq!(position.price, dec!(10));
        assert!(matcher.accumulator("X/Y").unwrap().is_empty());
    }

    #[test]
    fn test_reset_after_emission() {
        let orders = vec![
            order("o-1", "X/Y", Side::Buy, dec!(100), dec!(10), 1_000),
            order("o-2", "X/Y", Side::Sell, dec!(100), dec!(11), 2_000),
            order("o-3", "X/Y", Side::Buy, dec!(5), dec!(20), 3_000),
            order("o-4", "X/Y", Side::Sell, dec!(5), dec!(19), 4_000),
        ];

        let outcome = match_positions(&orders, &MatcherConfig::default()).unwrap();
        assert_eq!(outcome.positions.len(), 2);

        let second = &outcome.positions[1];
        assert_eq!(second.buy_cost, dec!(100));
        assert_eq!(second.sell_cost, dec!(95));
        assert_eq!(second.profit_loss, dec!(-5));
        assert_eq!(second.open_time, 3_000);
        assert_eq!(second.price, dec!(20));
        assert_eq!(second.orders.len(), 2);
    }

    #[test]
    fn test_threshold_boundary() {
        let failing = vec![
            order("o-1", "X/Y", Side::Buy, dec!(100), dec!(1), 1_000),
            order("o-2", "X/Y", Side::Sell, dec!(98), dec!(1), 2_000),
        ];
        let outcome = match_positions(&failing, &MatcherConfig::default()).unwrap();
        assert!(outcome.positions.is_empty());

        let passing = vec![
            order("o-1", "X/Y", Side::Buy, dec!(100), dec!(1), 1_000),
            order("o-2", "X/Y", Side::Sell, dec!(98.1), dec!(1), 2_000),
        ];
        let outcome = match_positions(&passing, &MatcherConfig::default()).unwrap();
        assert_eq!(outcome.positions.len(), 1);
        assert_eq!(outcome.positions[0].position_type, PositionType::Long);
    }

    #[test]
    fn test_custom_tolerance() {
        let orders = vec![
            order("o-1", "X/Y", Side::Buy, dec!(100), dec!(1), 1_000),
            order("o-2", "X/Y", Side::Sell, dec!(90), dec!(1), 2_000),
        ];

        let strict = match_positions(&orders, &MatcherConfig::default()).unwrap();
        assert!(strict.positions.is_empty());

        let loose = match_positions(&orders, &MatcherConfig::with_tolerance(dec!(15))).unwrap();
        assert_eq!(loose.positions.len(), 1);
    }

    #[test]
    fn test_pairs_are_independent_and_grouped() {
        let orders = vec![
            order("a1", "A/USD", Side::Buy, dec!(1), dec!(10), 1_000),
            order("b1", "B/USD", Side::Buy, dec!(2), dec!(20), 1_100),
            order("b2", "B/USD", Side::Sell, dec!(2), dec!(21), 1_200),
            order("a2", "A/USD", Side::Sell, dec!(1), dec!(12), 1_300),
        ];

        let outcome = match_positions(&orders, &MatcherConfig::default()).unwrap();
        let pairs: Vec<&str> = outcome.positions.iter().map(|p| p.pair.as_str()).collect();
        // Grouped by first-encountered pair, not by closing time
        assert_eq!(pairs, vec!["A/USD", "B/USD"]);
        assert_eq!(outcome.positions[0].profit_loss, dec!(2));
        assert_eq!(outcome.positions[1].profit_loss, dec!(2));
        assert_eq!(outcome.pairs, vec!["A/USD".to_string(), "B/USD".to_string()]);
    }

    #[test]
    fn test_incremental_matcher_emits_in_processing_order() {
        let mut matcher = PositionMatcher::new(MatcherConfig::default()).unwrap();
        let mut closed = Vec::new();
        for o in [
            order("a1", "A/USD", Side::Buy, dec!(1), dec!(10), 1_000),
            order("b1", "B/USD", Side::Buy, dec!(2), dec!(20), 1_100),
            order("b2", "B/USD", Side::Sell, dec!(2), dec!(21), 1_200),
            order("a2", "A/USD", Side::Sell, dec!(1), dec!(12), 1_300),
        ] {
            if let Some(p) = matcher.process(o).unwrap() {
                closed.push(p.pair);
            }
        }
        assert_eq!(closed, vec!["B/USD".to_string(), "A/USD".to_string()]);
        assert_eq!(matcher.emitted(), 2);
        assert!(matcher.finish().is_empty());
    }

    #[test]
    fn test_unknown_pair_is_accepted() {
        let orders = vec![
            order("o-1", "???", Side::Sell, dec!(3), dec!(1), 1_000),
            order("o-2", "???", Side::Buy, dec!(3), dec!(1), 2_000),
        ];
        let outcome = match_positions(&orders, &MatcherConfig::default()).unwrap();
        assert_eq!(outcome.positions.len(), 1);
        assert_eq!(outcome.positions[0].pair, "???");
    }

    #[test]
    fn test_first_trade_of_first_order_sets_reference() {
        let mut first = order("o-1", "X/Y", Side::Buy, dec!(2), dec!(10), 1_000);
        first.trades.push(Trade::new("o-1-2", "o-1", "X/Y", Side::Buy, dec!(12), dec!(1), 900));
        first.total_volume = dec!(3);
        let orders = vec![first, order("o-2", "X/Y", Side::Sell, dec!(3), dec!(11), 2_000)];

        let outcome = match_positions(&orders, &MatcherConfig::default()).unwrap();
        assert_eq!(outcome.positions[0].open_time, 1_000);
        assert_eq!(outcome.positions[0].price, dec!(10));
    }

    #[test]
    fn test_zero_volume_order_is_fatal() {
        let mut degenerate = order("o-1", "X/Y", Side::Buy, dec!(0), dec!(10), 1_000);
        degenerate.trades.clear();

        let err = match_positions(&[degenerate], &MatcherConfig::default()).unwrap_err();
        assert_eq!(
            err,
            Error::DegenerateBalance {
                pair: "X/Y".to_string()
            }
        );
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let err = PositionMatcher::new(MatcherConfig::with_tolerance(dec!(-1))).unwrap_err();
        assert_eq!(err, Error::InvalidTolerance(dec!(-1)));
    }

    #[test]
    fn test_empty_input() {
        let outcome = match_positions(&[], &MatcherConfig::default()).unwrap();
        assert!(outcome.positions.is_empty());
        assert!(outcome.open.is_empty());
        assert!(outcome.pairs.is_empty());
    }
}
