//! Portfolio rollups
//!
//! Summarizes a matching pass per pair and for the whole portfolio, the
//! shape reporting sinks persist alongside individual positions.

use crate::matcher::MatchOutcome;
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tradebook_core::{PairSummary, PortfolioRollup, TimestampMs};

/// Build the rollup for one matching pass.
///
/// `generated_at` (ms) becomes the rollup's idempotence key.
pub fn build_rollup(outcome: &MatchOutcome, generated_at: TimestampMs) -> PortfolioRollup {
    let mut summaries: Vec<PairSummary> = outcome
        .pairs
        .iter()
        .map(|pair| PairSummary::new(pair.clone()))
        .collect();
    let index: HashMap<&str, usize> = outcome
        .pairs
        .iter()
        .enumerate()
        .map(|(i, pair)| (pair.as_str(), i))
        .collect();

    for position in &outcome.positions {
        let Some(&idx) = index.get(position.pair.as_str()) else {
            continue;
        };
        let summary = &mut summaries[idx];
        summary.position_count += 1;
        if position.is_profitable() {
            summary.winning += 1;
        } else if position.profit_loss < Decimal::ZERO {
            summary.losing += 1;
        }
        summary.total_profit_loss += position.profit_loss;
        summary.total_fees += position.total_fees();
    }

    for open in &outcome.open {
        if let Some(&idx) = index.get(open.pair.as_str()) {
            summaries[idx].open_orders = open.pending_orders.len();
        }
    }

    let rollup = PortfolioRollup {
        generated_at,
        position_count: summaries.iter().map(|s| s.position_count).sum(),
        total_profit_loss: summaries.iter().map(|s| s.total_profit_loss).sum(),
        total_fees: summaries.iter().map(|s| s.total_fees).sum(),
        open_pairs: summaries.iter().filter(|s| s.open_orders > 0).count(),
        pairs: summaries,
    };

    debug!(
        "Rollup: {} positions, pnl={}, fees={}, {} open pairs",
        rollup.position_count, rollup.total_profit_loss, rollup.total_fees, rollup.open_pairs
    );
    rollup
}
