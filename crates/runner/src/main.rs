//! tradebook - reduce exchange fills into orders, positions and P&L.

use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tradebook_runner::{InputFormat, load_config, load_default_config, run_with_config};

#[derive(Parser)]
#[command(
    name = "tradebook",
    about = "Aggregate exchange fills into orders and match them into closed positions"
)]
struct Cli {
    /// Path to a JSON runner config. Defaults to the embedded config.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Trade file to read (overrides the config).
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Trade file format: canonical, ccxt or kraken.
    #[arg(long)]
    format: Option<InputFormat>,

    /// Exchange name stamped onto ccxt trades.
    #[arg(long)]
    exchange: Option<String>,

    /// Rewrite Kraken pairs to BASE/QUOTE symbols.
    #[arg(long, default_value_t = false)]
    unify_pairs: bool,

    /// Volume-balance tolerance in percent.
    #[arg(long, short)]
    tolerance: Option<Decimal>,

    /// JSON report file; records already in it are not written twice.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => load_default_config().context("loading embedded config")?,
    };

    if let Some(input) = cli.input {
        config.input.path = input;
    }
    if let Some(format) = cli.format {
        config.input.format = format;
    }
    if let Some(exchange) = cli.exchange {
        config.input.exchange = Some(exchange);
    }
    if cli.unify_pairs {
        config.input.unify_pairs = true;
    }
    if let Some(tolerance) = cli.tolerance {
        config.tolerance_percent = tolerance;
    }
    if let Some(output) = cli.output {
        config.output.path = Some(output);
    }

    let report = run_with_config(&config)?;

    for diagnostic in &report.diagnostics {
        eprintln!("skipped {diagnostic}");
    }
    for rejected in &report.rejected {
        eprintln!("rejected {rejected}");
    }
    println!("{report}");

    Ok(())
}
