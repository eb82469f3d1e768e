//! Bot entry point: load config, wire the venues and paper layers,
//! then run the evaluation loop alongside the HTTP server.

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use flasharb_bot::arbitrage::{ArbitrageCycle, OpportunityEvaluator, TradeLedger};
use flasharb_bot::config::Config;
use flasharb_bot::execution::PaperTradeExecutor;
use flasharb_bot::lending::PaperLoanDesk;
use flasharb_bot::monitor::{run_driver, BotMonitor};
use flasharb_bot::server::{self, AppState};
use flasharb_bot::types::MAX_RETRIES;
use flasharb_bot::venues::{JupiterQuoteClient, RaydiumQuoteClient};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "flasharb-bot", about = "Cross-venue flash-loan arbitrage bot")]
struct Args {
    /// HTTP server port (overrides the PORT environment variable)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let config = Config::load()?;
    let port = args.port.unwrap_or(config.port);

    info!(
        "Starting: rpc={}, program={}, {} pair(s), min profit {}%, max slippage {}%",
        config.rpc_url,
        config.program_id,
        config.trading_pairs.len(),
        config.min_profit_percent,
        config.max_slippage_percent
    );

    let mut jupiter = JupiterQuoteClient::new(config.max_slippage_percent);
    for pair in &config.trading_pairs {
        jupiter.register_token(&pair.token_a.mint, pair.token_a.decimals);
        jupiter.register_token(&pair.token_b.mint, pair.token_b.decimals);
    }

    let evaluator = OpportunityEvaluator::new(
        Arc::new(jupiter),
        Arc::new(RaydiumQuoteClient::new()),
    );
    let cycle = ArbitrageCycle::new(
        evaluator,
        Arc::new(PaperTradeExecutor::new()),
        Arc::new(PaperLoanDesk::default()),
        config.per_transaction_fee,
        MAX_RETRIES,
    );

    let ledger = match &config.trade_log_csv {
        Some(path) => TradeLedger::with_csv_mirror(path)?,
        None => TradeLedger::new(),
    };
    let ledger = Arc::new(Mutex::new(ledger));
    let monitor = Arc::new(Mutex::new(BotMonitor::new(Utc::now())));

    tokio::spawn(run_driver(
        cycle,
        config.trading_pairs.clone(),
        config.rate_limit_ms,
        config.check_interval_ms,
        Arc::clone(&monitor),
        Arc::clone(&ledger),
    ));

    server::serve(AppState { monitor, ledger }, port).await
}
