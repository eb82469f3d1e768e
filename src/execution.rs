//! Paper trade executor
//!
//! Simulates single-leg execution with realistic latency so the cycle
//! can be exercised end to end without broadcasting transactions.
//! Live signing/broadcast is a collaborator behind the same
//! [`TradeExecutor`] trait.

use crate::providers::{ExecutionError, TradeExecutor, TradeSide};
use crate::types::TradingPair;
use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tracing::info;

pub struct PaperTradeExecutor {
    /// Fraction of legs that fail, for exercising the retry path.
    /// 0.0 = every leg succeeds.
    failure_rate: f64,
}

impl PaperTradeExecutor {
    pub fn new() -> Self {
        Self { failure_rate: 0.0 }
    }

    pub fn with_failure_rate(failure_rate: f64) -> Self {
        Self {
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }

    /// Simulated network latency (10-50ms), timestamp-seeded like the
    /// rest of the paper layer
    async fn simulate_latency(&self) {
        let seed = Utc::now().timestamp_nanos_opt().unwrap_or(0) as u64;
        let delay_ms = 10 + (seed % 40);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    fn roll_failure(&self) -> bool {
        if self.failure_rate <= 0.0 {
            return false;
        }
        let seed = Utc::now().timestamp_nanos_opt().unwrap_or(0) as f64;
        ((seed % 1000.0) / 1000.0) < self.failure_rate
    }
}

impl Default for PaperTradeExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TradeExecutor for PaperTradeExecutor {
    async fn execute_leg(
        &self,
        venue: &str,
        pair: &TradingPair,
        amount: f64,
        side: TradeSide,
    ) -> Result<(), ExecutionError> {
        self.simulate_latency().await;

        if self.roll_failure() {
            return Err(ExecutionError::TransactionFailed {
                venue: venue.to_string(),
                reason: "simulated leg failure".to_string(),
            });
        }

        let verb = match side {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        };
        info!(
            "PAPER {}: {} {} of {} on {}",
            verb,
            amount,
            pair.token_a.mint,
            pair.label(),
            venue
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TokenConfig;

    fn test_pair() -> TradingPair {
        TradingPair {
            token_a: TokenConfig {
                mint: "USDC".to_string(),
                decimals: 6,
                min_size: 100.0,
            },
            token_b: TokenConfig {
                mint: "SOL".to_string(),
                decimals: 9,
                min_size: 0.1,
            },
            min_profit_percent: 0.5,
            max_slippage: 0.1,
            symbol: "USDC/SOL".to_string(),
        }
    }

    #[tokio::test]
    async fn test_paper_leg_succeeds() {
        let executor = PaperTradeExecutor::new();
        let result = executor
            .execute_leg("Jupiter", &test_pair(), 100.0, TradeSide::Buy)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_full_failure_rate_always_fails() {
        let executor = PaperTradeExecutor::with_failure_rate(1.0);
        let result = executor
            .execute_leg("Raydium", &test_pair(), 100.0, TradeSide::Sell)
            .await;
        assert!(result.is_err());
    }
}
