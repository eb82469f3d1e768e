//! Environment-driven configuration
//!
//! All runtime settings come from the environment (or a `.env` file in
//! development). The wallet key is the only required variable; the rest
//! default to safe mainnet values.

use crate::types::{TokenConfig, TradingPair, DEFAULT_TRANSACTION_FEE};
use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
const DEFAULT_PROGRAM_ID: &str = "ArB1TR9ge5nP4r1M2ooHhqrFe1T8yLmxqGCqFJBvmdzz";

/// Default monitored pair: 100 USDC against SOL
const DEFAULT_TRADING_PAIRS: &str =
    "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v:6:100:So11111111111111111111111111111111111111112:9:0.1:USDC/SOL";

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub program_id: String,
    /// Decoded 64-byte ed25519 keypair
    pub wallet_keypair: Vec<u8>,
    pub min_profit_percent: f64,
    pub max_slippage_percent: f64,
    /// Minimum spacing between executed trades
    pub rate_limit_ms: u64,
    /// Evaluation loop period
    pub check_interval_ms: u64,
    /// Flat network fee per transaction, in tokenA units
    pub per_transaction_fee: f64,
    pub port: u16,
    pub trading_pairs: Vec<TradingPair>,
    /// Optional CSV mirror path for the trade ledger
    pub trade_log_csv: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the environment. `.env` is honored when
    /// present; real environment variables win.
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let wallet_key = env::var("WALLET_PRIVATE_KEY")
            .context("WALLET_PRIVATE_KEY environment variable is required")?;
        let wallet_keypair = bs58::decode(&wallet_key)
            .into_vec()
            .context("WALLET_PRIVATE_KEY is not valid base58")?;
        if wallet_keypair.len() != 64 {
            bail!(
                "WALLET_PRIVATE_KEY must decode to 64 bytes, got {}",
                wallet_keypair.len()
            );
        }

        let min_profit_percent = parse_env("MIN_PROFIT_PERCENT", 0.5)?;
        let max_slippage_percent = parse_env("MAX_SLIPPAGE_PERCENT", 0.1)?;
        if min_profit_percent <= 0.0 {
            bail!("MIN_PROFIT_PERCENT must be > 0");
        }
        if max_slippage_percent <= 0.0 {
            bail!("MAX_SLIPPAGE_PERCENT must be > 0");
        }

        let pairs_spec =
            env::var("TRADING_PAIRS").unwrap_or_else(|_| DEFAULT_TRADING_PAIRS.to_string());
        let trading_pairs = parse_pairs(&pairs_spec, min_profit_percent, max_slippage_percent)?;

        Ok(Self {
            rpc_url: env::var("SOLANA_RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string()),
            program_id: env::var("ARBITRAGE_PROGRAM_ID")
                .unwrap_or_else(|_| DEFAULT_PROGRAM_ID.to_string()),
            wallet_keypair,
            min_profit_percent,
            max_slippage_percent,
            rate_limit_ms: parse_env("RATE_LIMIT_MS", 1000)?,
            check_interval_ms: parse_env("CHECK_INTERVAL_MS", 60_000)?,
            per_transaction_fee: parse_env("PER_TRANSACTION_FEE", DEFAULT_TRANSACTION_FEE)?,
            port: parse_env("PORT", 3000)?,
            trading_pairs,
            trade_log_csv: env::var("TRADE_LOG_CSV").ok().map(PathBuf::from),
        })
    }
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("{} has invalid value: {}", key, value)),
        Err(_) => Ok(default),
    }
}

/// Parse a comma-separated pair list. Each pair is
/// `mintA:decimalsA:minSizeA:mintB:decimalsB:minSizeB:symbol`.
fn parse_pairs(
    spec: &str,
    min_profit_percent: f64,
    max_slippage_percent: f64,
) -> Result<Vec<TradingPair>> {
    let mut pairs = Vec::new();
    for entry in spec.split(',').filter(|e| !e.trim().is_empty()) {
        let fields: Vec<&str> = entry.trim().split(':').collect();
        if fields.len() != 7 {
            bail!(
                "trading pair needs 7 colon-separated fields, got {}: {}",
                fields.len(),
                entry
            );
        }

        let pair = TradingPair {
            token_a: TokenConfig {
                mint: fields[0].to_string(),
                decimals: fields[1]
                    .parse()
                    .with_context(|| format!("bad decimals in pair: {}", entry))?,
                min_size: fields[2]
                    .parse()
                    .with_context(|| format!("bad min size in pair: {}", entry))?,
            },
            token_b: TokenConfig {
                mint: fields[3].to_string(),
                decimals: fields[4]
                    .parse()
                    .with_context(|| format!("bad decimals in pair: {}", entry))?,
                min_size: fields[5]
                    .parse()
                    .with_context(|| format!("bad min size in pair: {}", entry))?,
            },
            min_profit_percent,
            max_slippage: max_slippage_percent,
            symbol: fields[6].to_string(),
        };
        pairs.push(pair);
    }

    if pairs.is_empty() {
        bail!("TRADING_PAIRS is empty");
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_pair() {
        let pairs = parse_pairs(DEFAULT_TRADING_PAIRS, 0.5, 0.1).unwrap();
        assert_eq!(pairs.len(), 1);

        let pair = &pairs[0];
        assert_eq!(pair.symbol, "USDC/SOL");
        assert_eq!(pair.token_a.decimals, 6);
        assert_eq!(pair.token_a.min_size, 100.0);
        assert_eq!(pair.token_b.decimals, 9);
        assert_eq!(pair.min_profit_percent, 0.5);
        assert_eq!(pair.max_slippage, 0.1);
    }

    #[test]
    fn test_parse_multiple_pairs() {
        let spec = "mintA:6:100:mintB:9:0.1:A/B,mintC:6:50:mintD:5:1:C/D";
        let pairs = parse_pairs(spec, 0.5, 0.1).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].symbol, "C/D");
        assert_eq!(pairs[1].token_b.decimals, 5);
    }

    #[test]
    fn test_parse_rejects_malformed_pair() {
        assert!(parse_pairs("mintA:6:100", 0.5, 0.1).is_err());
        assert!(parse_pairs("mintA:six:100:mintB:9:0.1:A/B", 0.5, 0.1).is_err());
        assert!(parse_pairs("", 0.5, 0.1).is_err());
    }
}
