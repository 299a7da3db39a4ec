//! Pipeline - trades to orders to positions to reports
//!
//! ```text
//! TradeSource ─► aggregate_trades ─► sort by open_time ─► match_positions
//!                                                              │
//!              ReportingSink ◄── build_rollup ◄────────────────┘
//! ```
//!
//! Orders are handed to the matcher in chronological order of their first
//! fill. The sort is stable, so orders opened in the same millisecond keep
//! the order the source delivered them in.

use chrono::{DateTime, Utc};
use log::info;
use rust_decimal::Decimal;
use std::fmt;
use tradebook_core::{
    OrderAggregate, PortfolioRollup, Position, TimestampMs, timestamp_to_datetime,
};
use tradebook_order_manager::{
    Diagnostic, MatcherConfig, OpenExposure, aggregate_trades, build_rollup, match_positions,
};
use tradebook_ports::{NormalizeError, ReportingSink, SinkSummary, TradeSource};

use crate::config::RunnerConfig;
use crate::error::Result;
use crate::sink::{JsonFileSink, MemorySink};
use crate::source::JsonFileSource;

/// Everything one run produced
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Trades delivered by the source
    pub trades_read: usize,
    /// Payload entries the normalizer could not turn into trades
    pub rejected: Vec<NormalizeError>,
    /// Trades dropped by aggregation
    pub diagnostics: Vec<Diagnostic>,
    /// Order aggregates, chronological
    pub orders: Vec<OrderAggregate>,
    pub positions: Vec<Position>,
    pub open: Vec<OpenExposure>,
    pub rollup: PortfolioRollup,
    /// What the sink did with orders
    pub orders_recorded: SinkSummary,
    /// What the sink did with positions
    pub positions_recorded: SinkSummary,
}

impl RunReport {
    pub fn total_profit_loss(&self) -> Decimal {
        self.rollup.total_profit_loss
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Trades: {} read, {} rejected, {} skipped",
            self.trades_read,
            self.rejected.len(),
            self.diagnostics.len()
        )?;
        writeln!(
            f,
            "Orders: {} ({} new, {} already recorded)",
            self.orders.len(),
            self.orders_recorded.inserted,
            self.orders_recorded.skipped
        )?;
        writeln!(
            f,
            "Positions: {} ({} new, {} already recorded)",
            self.positions.len(),
            self.positions_recorded.inserted,
            self.positions_recorded.skipped
        )?;

        for position in &self.positions {
            writeln!(
                f,
                "  {:<14} {:<5} opened {} closed {} pnl={}",
                position.pair,
                format!("{:?}", position.position_type).to_lowercase(),
                format_time(position.open_date()),
                format_time(position.close_time().and_then(timestamp_to_datetime)),
                position.profit_loss
            )?;
        }

        for pair in &self.rollup.pairs {
            let win_rate = pair
                .win_rate()
                .map(|rate| format!("{}%", (rate * Decimal::ONE_HUNDRED).round_dp(1)))
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                f,
                "  {:<14} positions={:<4} won={:<4} lost={:<4} win_rate={:<6} pnl={} fees={} open_orders={}",
                pair.pair,
                pair.position_count,
                pair.winning,
                pair.losing,
                win_rate,
                pair.total_profit_loss,
                pair.total_fees,
                pair.open_orders
            )?;
        }

        for open in &self.open {
            writeln!(
                f,
                "  {:<14} open: {} pending orders, net volume {}",
                open.pair,
                open.pending_orders.len(),
                open.net_volume()
            )?;
        }

        write!(
            f,
            "Total P&L: {} (fees {}, net {}), {} pairs open",
            self.rollup.total_profit_loss,
            self.rollup.total_fees,
            self.rollup.net_profit_loss(),
            self.rollup.open_pairs
        )
    }
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Run the reduction over one source into one sink.
///
/// Skipped trades never abort the run; a degenerate accumulator or a sink
/// failure does.
pub fn run(
    source: &mut dyn TradeSource,
    sink: &mut dyn ReportingSink,
    matcher: &MatcherConfig,
    generated_at: TimestampMs,
) -> Result<RunReport> {
    let trades = source.fetch_trades()?;
    info!("{}: {} trades", source.name(), trades.len());

    let aggregated = aggregate_trades(&trades);
    let mut orders = aggregated.orders;
    orders.sort_by_key(|o| o.open_time);

    let mut orders_recorded = SinkSummary::default();
    for order in &orders {
        orders_recorded.add(sink.record_order(order)?);
    }

    let outcome = match_positions(&orders, matcher)?;

    let mut positions_recorded = SinkSummary::default();
    for position in &outcome.positions {
        positions_recorded.add(sink.record_position(position)?);
    }

    let rollup = build_rollup(&outcome, generated_at);
    sink.record_portfolio(&rollup)?;
    sink.flush()?;

    info!(
        "Run complete: {} orders, {} positions, P&L {}",
        orders.len(),
        outcome.positions.len(),
        rollup.total_profit_loss
    );

    Ok(RunReport {
        trades_read: trades.len(),
        rejected: Vec::new(),
        diagnostics: aggregated.skipped,
        orders,
        positions: outcome.positions,
        open: outcome.open,
        rollup,
        orders_recorded,
        positions_recorded,
    })
}

/// Build the configured source and sink and run the pipeline
pub fn run_with_config(config: &RunnerConfig) -> Result<RunReport> {
    config.validate()?;

    let mut source = match config.normalizer() {
        Some(normalizer) => JsonFileSource::normalized(&config.input.path, normalizer),
        None => JsonFileSource::canonical(&config.input.path),
    };
    info!(
        "Reading {} trades from {}",
        config.input.format,
        config.input.path.display()
    );

    let matcher = config.matcher_config();
    let generated_at = Utc::now().timestamp_millis();

    let mut report = match &config.output.path {
        Some(path) => {
            let mut sink = JsonFileSink::open(path)?;
            run(&mut source, &mut sink, &matcher, generated_at)?
        }
        None => {
            let mut sink = MemorySink::new();
            run(&mut source, &mut sink, &matcher, generated_at)?
        }
    };

    report.rejected = source.rejected().to_vec();
    Ok(report)
}
