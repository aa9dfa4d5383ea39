//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::align::align;
use crate::domain::allocation::AllocationPolicy;
use crate::domain::comparison::{run_comparison, ComparisonResult, StrategyOutcome, Winner};
use crate::domain::config::{ComparisonConfig, DEFAULT_PRINCIPAL, DEFAULT_WEIGHTS};
use crate::domain::config_validation::{universe_from_config, validate_comparison_config};
use crate::domain::error::DuelError;
use crate::domain::period::Period;
use crate::domain::tax::TaxDragModel;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(
    name = "valueduel",
    about = "Compare a single fund against a weighted two-fund combination"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the comparison
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory holding one <SYMBOL>.csv per symbol
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// YTD, 3mo, 6mo, 1y, 2y or max
        #[arg(long)]
        period: Option<Period>,
        /// Constituent ratio such as 60/40
        #[arg(long)]
        weights: Option<String>,
        /// Amount invested in each strategy, in the quote currency
        #[arg(long)]
        principal: Option<f64>,
        /// Apply the tax drag estimate
        #[arg(long, conflicts_with = "no_tax")]
        tax: bool,
        /// Ignore the tax drag estimate
        #[arg(long)]
        no_tax: bool,
        /// Write the value curves as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a comparison configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show data range for each configured symbol
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct CompareOverrides {
    pub data_dir: Option<PathBuf>,
    pub period: Option<Period>,
    pub weights: Option<String>,
    pub principal: Option<f64>,
    pub tax: Option<bool>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Compare {
            config,
            data_dir,
            period,
            weights,
            principal,
            tax,
            no_tax,
            output,
        } => {
            let overrides = CompareOverrides {
                data_dir,
                period,
                weights,
                principal,
                tax: match (tax, no_tax) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
            };
            run_compare(&config, &overrides, output.as_deref())
        }
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, data_dir } => run_info(&config, data_dir.as_deref()),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    tracing::info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

fn run_compare(config_path: &Path, overrides: &CompareOverrides, output: Option<&Path>) -> ExitCode {
    // Stage 1: Load and validate config
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_comparison_config(&adapter) {
        return fail(&e);
    }

    // Stage 2: Resolve parameters
    let config = match build_comparison_config(&adapter, overrides) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let data_dir = resolve_data_dir(overrides.data_dir.as_deref(), &adapter);

    // Stage 3: Fetch, align, simulate
    let data_port = CsvAdapter::new(data_dir);
    let result = match run_comparison_pipeline(&data_port, &config) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    // Stage 4: Report
    println!("{}", render_summary(&result, &config));

    if let Some(path) = output {
        if let Err(e) = CsvReportAdapter.write(&result, path) {
            return fail(&e);
        }
        eprintln!("\nReport written to: {}", path.display());
    }

    ExitCode::SUCCESS
}

/// Merges the config file with `overrides` into one validated run.
pub fn build_comparison_config(
    adapter: &dyn ConfigPort,
    overrides: &CompareOverrides,
) -> Result<ComparisonConfig, DuelError> {
    let universe = universe_from_config(adapter)?;

    let period = match overrides.period {
        Some(p) => p,
        None => match adapter.get_nonblank("comparison", "period") {
            Some(raw) => raw.parse::<Period>().map_err(|e| {
                DuelError::ConfigInvalid {
                    section: "comparison".into(),
                    key: "period".into(),
                    reason: e.to_string(),
                }
            })?,
            None => Period::default(),
        },
    };

    let principal = overrides
        .principal
        .unwrap_or_else(|| adapter.get_double("comparison", "principal", DEFAULT_PRINCIPAL));
    if !principal.is_finite() || principal <= 0.0 {
        return Err(DuelError::ConfigInvalid {
            section: "comparison".into(),
            key: "principal".into(),
            reason: format!("principal must be a positive number, got {principal}"),
        });
    }

    let ratio = overrides
        .weights
        .clone()
        .or_else(|| adapter.get_nonblank("comparison", "weights"))
        .unwrap_or_else(|| DEFAULT_WEIGHTS.to_string());
    let policy = AllocationPolicy::from_ratio(&universe.constituents, &ratio)?;

    let tax_enabled = overrides
        .tax
        .unwrap_or_else(|| adapter.get_bool("tax", "enabled", false));

    let mut tax_model = TaxDragModel::for_constituents(&universe.constituents);
    for symbol in universe.instruments() {
        if adapter.get_nonblank("tax", symbol).is_some() {
            let rate = adapter.get_double("tax", symbol, f64::NAN);
            tax_model = tax_model.with_rate(symbol, rate)?;
        }
    }

    Ok(ComparisonConfig {
        universe,
        period,
        principal,
        policy,
        tax_enabled,
        tax_model,
    })
}

/// `--data-dir`, then `[comparison] data_dir`, then `./data`.
pub fn resolve_data_dir(data_dir_override: Option<&Path>, config: &dyn ConfigPort) -> PathBuf {
    match data_dir_override {
        Some(dir) => dir.to_path_buf(),
        None => config
            .get_nonblank("comparison", "data_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
    }
}

/// Fetch, align and compare. Everything after the data port is pure.
pub fn run_comparison_pipeline(
    data_port: &dyn MarketDataPort,
    config: &ComparisonConfig,
) -> Result<ComparisonResult, DuelError> {
    let symbols = config.universe.symbols();
    tracing::info!(
        symbols = %symbols.join(", "),
        period = %config.period,
        "fetching daily prices"
    );
    let raw = data_port.fetch_daily_prices(&symbols, config.period)?;

    let aligned = align(&raw, &config.universe)?;
    if let (Some(first), Some(last)) = (aligned.first_date(), aligned.last_date()) {
        tracing::info!(%first, %last, days = aligned.len(), "aligned price history");
    }

    run_comparison(
        &aligned,
        &config.universe,
        &config.policy,
        config.active_tax_model(),
        config.principal,
    )
}

/// Plain-text summary: quotes, verdict, per-strategy stats, breakdown.
pub fn render_summary(result: &ComparisonResult, config: &ComparisonConfig) -> String {
    let fx = &config.universe.fx;
    let mut lines = Vec::new();

    if let Some(q) = &result.quotes {
        lines.push(format!("=== Latest Quotes ({}) ===", q.date));
        lines.push(format!("{:<24} {:>12.4}", fx, q.fx_rate));
        for quote in [&q.primary, &q.combination] {
            lines.push(format!(
                "{:<24} {:>12.2} {:>14.2}",
                quote.label, quote.base_price, quote.target_price
            ));
        }
        lines.push(String::new());
    }

    lines.push(format!(
        "=== Comparison ({}, {}) ===",
        config.period,
        if config.tax_enabled { "tax drag on" } else { "tax drag off" }
    ));
    lines.push(format!("Invested:         {:.2}", result.principal));
    let verdict = match (result.winner, result.is_tie()) {
        (_, true) => format!("tie, resolved to {}", result.combination.label),
        (Winner::Primary, false) => result.primary.label.clone(),
        (Winner::Combination, false) => result.combination.label.clone(),
    };
    lines.push(format!("Winner:           {}", verdict));
    lines.push(format!(
        "Gap:              {:.2} ({:.2} pts)",
        result.gap_value, result.gap_pct
    ));
    lines.push(String::new());

    lines.push(format!(
        "{:<24} {:>14} {:>9} {:>9} {:>9} {:>8}",
        "Strategy", "Final", "Return", "Ann.", "MaxDD", "Sharpe"
    ));
    for outcome in [&result.primary, &result.combination] {
        lines.push(strategy_row(outcome));
    }
    lines.push(String::new());

    lines.push("=== Allocation Breakdown ===".to_string());
    for row in &result.breakdown {
        lines.push(format!(
            "{:<8} {:>14.2} {:>8.2}%{}",
            row.policy.label(),
            row.final_value,
            row.return_pct,
            if row.selected { "  <- selected" } else { "" }
        ));
    }

    lines.join("\n")
}

fn strategy_row(outcome: &StrategyOutcome) -> String {
    format!(
        "{:<24} {:>14.2} {:>8.2}% {:>8.2}% {:>9} {:>8.2}",
        outcome.label,
        outcome.final_value,
        outcome.return_pct,
        outcome.stats.annualized_return * 100.0,
        format!("-{:.1}%", outcome.stats.max_drawdown * 100.0),
        outcome.stats.sharpe_ratio
    )
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_comparison_config(&adapter) {
        return fail(&e);
    }
    let config = match build_comparison_config(&adapter, &CompareOverrides::default()) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    println!("Primary:       {}", config.universe.primary);
    println!(
        "Combination:   {} ({})",
        config.universe.combination_label(),
        config.policy.describe()
    );
    println!("FX:            {}", config.universe.fx);
    println!("Period:        {}", config.period);
    println!("Principal:     {:.2}", config.principal);
    println!(
        "Tax drag:      {}",
        if config.tax_enabled { "enabled" } else { "disabled" }
    );
    for (symbol, rate) in config.tax_model.rates() {
        println!("  {:<12} {:.2}%/yr", symbol, rate * 100.0);
    }
    println!("Data dir:      {}", resolve_data_dir(None, &adapter).display());
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_info(config_path: &Path, data_dir: Option<&Path>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let universe = match universe_from_config(&adapter) {
        Ok(u) => u,
        Err(e) => return fail(&e),
    };
    let data_port = CsvAdapter::new(resolve_data_dir(data_dir, &adapter));

    let mut missing = false;
    for symbol in universe.symbols() {
        match data_port.get_data_range(&symbol) {
            Ok(Some((first, last, count))) => {
                println!("{}: {} to {} ({} rows)", symbol, first, last, count);
            }
            Ok(None) => {
                tracing::warn!(symbol = %symbol, "no data found");
                missing = true;
            }
            Err(e) => return fail(&e),
        }
    }

    if missing {
        ExitCode::from(&DuelError::InsufficientData {
            symbol: "one or more symbols".into(),
        })
    } else {
        ExitCode::SUCCESS
    }
}

fn fail(err: &DuelError) -> ExitCode {
    tracing::error!("{err}");
    if err.is_retryable() {
        tracing::warn!("the data source may be temporarily unavailable; try again later");
    }
    ExitCode::from(err)
}
