//! Core data structures for the arbitrage bot
//!
//! Token/pair configuration, per-evaluation quotes, and detected
//! opportunities. Quotes are ephemeral — produced per evaluation cycle,
//! never persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum attempts for the two-leg execution sequence.
/// A retry restarts both legs from scratch (no partial-leg resume).
pub const MAX_RETRIES: u32 = 3;

/// Default per-transaction fee in SOL (5000 lamports)
pub const DEFAULT_TRANSACTION_FEE: f64 = 0.000005;

/// A tradable token as configured at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Mint address (opaque handle naming the asset)
    pub mint: String,
    pub decimals: u8,
    /// Minimum trade size in token units
    pub min_size: f64,
}

/// A monitored trading pair with its profitability gates.
/// Both thresholds are expressed in percent and must be > 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingPair {
    pub token_a: TokenConfig,
    pub token_b: TokenConfig,
    pub min_profit_percent: f64,
    pub max_slippage: f64,
    /// Human-readable label, e.g. "USDC/SOL"
    pub symbol: String,
}

impl TradingPair {
    pub fn label(&self) -> &str {
        &self.symbol
    }
}

/// A price quote from one venue for tokenA -> tokenB at a given amount
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    /// Units of tokenB per tokenA
    pub price: f64,
    /// Price impact in percent
    pub price_impact: f64,
}

/// Which venue to buy on (sell happens on the other one)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDirection {
    /// Venue A is cheaper: buy on A, sell on B
    BuyOnA,
    /// Venue B is cheaper: buy on B, sell on A
    BuyOnB,
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TradeDirection::BuyOnA => write!(f, "buy on A / sell on B"),
            TradeDirection::BuyOnB => write!(f, "buy on B / sell on A"),
        }
    }
}

/// A detected arbitrage opportunity for one pair
#[derive(Debug, Clone, Copy)]
pub struct Opportunity {
    pub direction: TradeDirection,
    pub price_a: f64,
    pub price_b: f64,
}

impl Opportunity {
    /// Spread between the two venues, relative to the cheaper one, in percent
    pub fn spread_percent(&self) -> f64 {
        price_diff_percent(self.price_a, self.price_b)
    }
}

/// Price difference relative to the cheaper venue, in percent:
/// |priceA - priceB| / min(priceA, priceB) * 100
pub fn price_diff_percent(price_a: f64, price_b: f64) -> f64 {
    let min = price_a.min(price_b);
    if min <= 0.0 {
        return 0.0;
    }
    (price_a - price_b).abs() / min * 100.0
}

/// Deviation of actual execution output from the quoted expectation, in
/// percent: |actual_out - amount * price| / (amount * price) * 100
pub fn price_impact_percent(amount_in: f64, actual_out: f64, price: f64) -> f64 {
    let expected_out = amount_in * price;
    if expected_out <= 0.0 {
        return 0.0;
    }
    ((actual_out - expected_out) / expected_out).abs() * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_diff_percent() {
        // |20.10 - 20.00| / 20.00 * 100 = 0.5%
        let diff = price_diff_percent(20.10, 20.00);
        assert!((diff - 0.5).abs() < 1e-9);

        // Symmetric in argument order
        assert_eq!(diff, price_diff_percent(20.00, 20.10));

        // Equal prices = zero spread
        assert_eq!(price_diff_percent(42.0, 42.0), 0.0);
    }

    #[test]
    fn test_price_impact_percent() {
        // Expected out = 100 * 20.0 = 2000; actual 1990 -> 0.5% impact
        let impact = price_impact_percent(100.0, 1990.0, 20.0);
        assert!((impact - 0.5).abs() < 1e-9);

        // Overshoot counts the same as undershoot
        let impact = price_impact_percent(100.0, 2010.0, 20.0);
        assert!((impact - 0.5).abs() < 1e-9);

        // Exact fill = zero impact
        assert_eq!(price_impact_percent(100.0, 2000.0, 20.0), 0.0);
    }

    #[test]
    fn test_price_impact_degenerate_expectation() {
        // Zero price / zero amount must not divide by zero
        assert_eq!(price_impact_percent(0.0, 10.0, 20.0), 0.0);
        assert_eq!(price_impact_percent(100.0, 10.0, 0.0), 0.0);
    }

    #[test]
    fn test_opportunity_spread() {
        let opp = Opportunity {
            direction: TradeDirection::BuyOnB,
            price_a: 20.10,
            price_b: 20.00,
        };
        assert!((opp.spread_percent() - 0.5).abs() < 1e-9);
    }
}
