use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fundbook::config::ResolvedConfig;
use fundbook::format::portfolio_table;
use fundbook::models::{AddFundOptions, Fund, FundRef, RebalancePlan, TargetSpec};
use fundbook::pricing::{providers::FtMarketsSource, PriceService};
use fundbook::storage::JsonFileStore;

#[derive(Parser)]
#[command(name = "fundbook")]
#[command(about = "Local-first fund portfolio rebalancing toolkit")]
struct Cli {
    /// Portfolio JSON file (defaults to the configured path)
    portfolio: Option<PathBuf>,

    /// Path to config file
    #[arg(long, default_value = "fundbook.toml")]
    config: PathBuf,

    /// Emit JSON instead of the holdings table
    #[arg(long)]
    json: bool,

    /// Write the rendered output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Refresh fund prices from FT markets before rendering
    #[arg(short, long)]
    update: bool,

    /// Append a cash position of the given value (target fraction 0)
    #[arg(short = 'c', long, value_name = "AMOUNT")]
    add_cash: Option<f64>,

    /// Print the buy/sell plan needed to reach the target allocations
    #[arg(short, long)]
    rebalance: bool,

    /// Persist portfolio changes back to the portfolio file
    #[arg(long)]
    save: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ResolvedConfig::load_or_default(&cli.config)?;

    let portfolio_path = cli
        .portfolio
        .clone()
        .unwrap_or_else(|| config.portfolio_path.clone());
    let store = JsonFileStore::new(&portfolio_path);
    let mut portfolio = store
        .load()
        .await?
        .ok_or_else(|| anyhow!("no portfolio found at {}", portfolio_path.display()))?;

    let mut dirty = false;

    if cli.update {
        let service = PriceService::new(Arc::new(FtMarketsSource::new()));
        let report = service.refresh_portfolio(&portfolio).await?;
        tracing::info!(updated = report.updated, skipped = report.skipped, "prices refreshed");
        dirty = dirty || report.updated > 0;
    }

    if let Some(amount) = cli.add_cash {
        let cash = FundRef::new(Fund::new("Cash", 1.0));
        portfolio.add_fund(
            cash,
            AddFundOptions::new()
                .with_value(amount)
                .with_target(TargetSpec::Fraction(0.0)),
        )?;
        dirty = true;
    }

    let use_json = cli.json || config.display.json;
    let rendered = if cli.rebalance {
        let plan = portfolio.trade_to_target()?;
        render_plan(&plan, use_json)?
    } else if use_json {
        serde_json::to_string_pretty(&portfolio)?
    } else {
        portfolio_table(&portfolio)
    };

    match &cli.output {
        Some(path) => std::fs::write(path, format!("{rendered}\n"))
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }

    if cli.save && dirty {
        store.save(&portfolio).await?;
    }

    Ok(())
}

fn render_plan(plan: &RebalancePlan, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(plan)?);
    }

    if plan.is_empty() {
        return Ok("Portfolio is already on target; nothing to trade.".to_string());
    }

    let mut out = String::new();
    if !plan.buy.is_empty() {
        out.push_str("Buy:\n");
        out.push_str(&portfolio_table(&plan.buy));
    }
    if !plan.sell.is_empty() {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str("Sell:\n");
        out.push_str(&portfolio_table(&plan.sell));
    }
    Ok(out)
}
