//! Reporting sinks
//!
//! Both sinks keep a [`Ledger`] of everything recorded and skip records whose
//! key is already present, so replaying a run is a no-op:
//! - order aggregates by `order_id`
//! - positions by `pair@open_time`
//! - portfolio rollups by `generated_at`

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tradebook_core::{OrderAggregate, PortfolioRollup, Position};
use tradebook_ports::{RecordOutcome, ReportingSink, SinkError};

/// Everything a sink has accepted, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub orders: Vec<OrderAggregate>,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub portfolios: Vec<PortfolioRollup>,
}

/// Key sets mirroring a [`Ledger`]
#[derive(Debug, Default)]
struct LedgerIndex {
    orders: HashSet<String>,
    positions: HashSet<String>,
    portfolios: HashSet<i64>,
}

impl LedgerIndex {
    fn build(ledger: &Ledger) -> Self {
        Self {
            orders: ledger.orders.iter().map(|o| o.order_id.clone()).collect(),
            positions: ledger.positions.iter().map(Position::key).collect(),
            portfolios: ledger.portfolios.iter().map(|r| r.generated_at).collect(),
        }
    }
}

/// Idempotent in-memory store shared by both sinks
#[derive(Debug, Default)]
struct Store {
    ledger: Ledger,
    index: LedgerIndex,
}

impl Store {
    fn from_ledger(ledger: Ledger) -> Self {
        let index = LedgerIndex::build(&ledger);
        Self { ledger, index }
    }

    fn order(&mut self, order: &OrderAggregate) -> RecordOutcome {
        if !self.index.orders.insert(order.order_id.clone()) {
            debug!("Order {} already recorded, skipping", order.order_id);
            return RecordOutcome::Skipped;
        }
        self.ledger.orders.push(order.clone());
        RecordOutcome::Inserted
    }

    fn position(&mut self, position: &Position) -> RecordOutcome {
        let key = position.key();
        if !self.index.positions.insert(key.clone()) {
            debug!("Position {key} already recorded, skipping");
            return RecordOutcome::Skipped;
        }
        self.ledger.positions.push(position.clone());
        RecordOutcome::Inserted
    }

    fn portfolio(&mut self, rollup: &PortfolioRollup) -> RecordOutcome {
        if !self.index.portfolios.insert(rollup.generated_at) {
            debug!("Rollup {} already recorded, skipping", rollup.generated_at);
            return RecordOutcome::Skipped;
        }
        self.ledger.portfolios.push(rollup.clone());
        RecordOutcome::Inserted
    }
}

/// Sink that keeps records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    store: Store,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.store.ledger
    }

    pub fn into_ledger(self) -> Ledger {
        self.store.ledger
    }
}

impl ReportingSink for MemorySink {
    fn record_order(&mut self, order: &OrderAggregate) -> Result<RecordOutcome, SinkError> {
        Ok(self.store.order(order))
    }

    fn record_position(&mut self, position: &Position) -> Result<RecordOutcome, SinkError> {
        Ok(self.store.position(position))
    }

    fn record_portfolio(&mut self, rollup: &PortfolioRollup) -> Result<RecordOutcome, SinkError> {
        Ok(self.store.portfolio(rollup))
    }
}

/// Sink backed by a JSON report file.
///
/// An existing report is loaded on open, so records from earlier runs are
/// skipped. Writes are buffered until [`flush`](ReportingSink::flush).
#[derive(Debug)]
pub struct JsonFileSink {
    path: PathBuf,
    store: Store,
    dirty: bool,
}

impl JsonFileSink {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let path = path.into();
        let ledger = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let ledger: Ledger = serde_json::from_str(&content)?;
            info!(
                "Loaded report {} ({} orders, {} positions)",
                path.display(),
                ledger.orders.len(),
                ledger.positions.len()
            );
            ledger
        } else {
            Ledger::default()
        };

        Ok(Self {
            path,
            store: Store::from_ledger(ledger),
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ledger(&self) -> &Ledger {
        &self.store.ledger
    }

    fn track(&mut self, outcome: RecordOutcome) -> RecordOutcome {
        if outcome == RecordOutcome::Inserted {
            self.dirty = true;
        }
        outcome
    }
}

impl ReportingSink for JsonFileSink {
    fn record_order(&mut self, order: &OrderAggregate) -> Result<RecordOutcome, SinkError> {
        let outcome = self.store.order(order);
        Ok(self.track(outcome))
    }

    fn record_position(&mut self, position: &Position) -> Result<RecordOutcome, SinkError> {
        let outcome = self.store.position(position);
        Ok(self.track(outcome))
    }

    fn record_portfolio(&mut self, rollup: &PortfolioRollup) -> Result<RecordOutcome, SinkError> {
        let outcome = self.store.portfolio(rollup);
        Ok(self.track(outcome))
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.store.ledger)?;
        std::fs::write(&self.path, json)?;
        self.dirty = false;
        info!("Wrote report to {}", self.path.display());
        Ok(())
    }
}
