//! Arbitrage cycle
//!
//! One evaluation pass over the configured pairs: quote both venues,
//! gate on profitability and the trade rate limit, then run the
//! flash-loan-funded two-leg sequence with bounded retries. Every
//! execution attempt lands in the ledger exactly once; a failing pair
//! never aborts the rest of the pass.

use crate::arbitrage::ledger::{TradeLedger, TradeLogEntry};
use crate::arbitrage::rate_limit::TradeRateLimiter;
use crate::arbitrage::OpportunityEvaluator;
use crate::providers::{ExecutionError, LoanProvider, TradeExecutor, TradeSide};
use crate::types::{Opportunity, TradeDirection, TradingPair};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome counts for one pass over the pairs
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleSummary {
    /// Pairs evaluated this pass
    pub evaluated: usize,
    /// Opportunities that cleared the spread threshold
    pub opportunities: usize,
    /// Trades completed successfully
    pub executed: usize,
    /// Attempts that ended in a failed ledger entry
    pub failed: usize,
}

pub struct ArbitrageCycle {
    evaluator: OpportunityEvaluator,
    executor: Arc<dyn TradeExecutor>,
    loans: Arc<dyn LoanProvider>,
    /// Flat network fee charged per transaction, in tokenA units
    per_transaction_fee: f64,
    max_retries: u32,
}

impl ArbitrageCycle {
    pub fn new(
        evaluator: OpportunityEvaluator,
        executor: Arc<dyn TradeExecutor>,
        loans: Arc<dyn LoanProvider>,
        per_transaction_fee: f64,
        max_retries: u32,
    ) -> Self {
        Self {
            evaluator,
            executor,
            loans,
            per_transaction_fee,
            max_retries,
        }
    }

    /// Run one pass over `pairs` at time `now_ms` (unix millis, used for
    /// the rate-limit gate).
    pub async fn run_once(
        &self,
        pairs: &[TradingPair],
        now_ms: u64,
        rate_limiter: &mut TradeRateLimiter,
        ledger: &mut TradeLedger,
    ) -> CycleSummary {
        let mut summary = CycleSummary::default();

        for pair in pairs {
            summary.evaluated += 1;
            let amount = pair.token_a.min_size;

            let opportunity = match self.evaluator.evaluate(pair, amount).await {
                Some(opportunity) => opportunity,
                None => continue,
            };
            summary.opportunities += 1;

            // The rate limit gates everything past detection: a skipped
            // opportunity writes no ledger entry and does not advance
            // the limiter clock.
            if !rate_limiter.try_acquire(now_ms) {
                debug!("{}: trade skipped by rate limit", pair.label());
                continue;
            }

            // Both legs plus repayment ride one flash loan; the fee
            // model charges two transactions.
            let gas_fee = self.per_transaction_fee * 2.0;
            let potential = (opportunity.price_a - opportunity.price_b).abs() * amount;
            let net = potential - gas_fee;

            if net <= 0.0 {
                debug!(
                    "{}: spread profit {:.9} does not cover fees {:.9}",
                    pair.label(),
                    potential,
                    gas_fee
                );
                summary.failed += 1;
                self.record(
                    ledger,
                    failed_entry(pair, amount, &opportunity, "no profit after fees"),
                );
                continue;
            }

            match self.execute_opportunity(pair, &opportunity, amount, net, gas_fee).await {
                Ok(entry) => {
                    summary.executed += 1;
                    self.record(ledger, entry);
                }
                Err(entry) => {
                    summary.failed += 1;
                    self.record(ledger, entry);
                }
            }
        }

        summary
    }

    /// Borrow, run both legs with retries, always repay, and build the
    /// ledger entry. Ok = trade completed, Err = failed entry.
    async fn execute_opportunity(
        &self,
        pair: &TradingPair,
        opportunity: &Opportunity,
        amount: f64,
        net: f64,
        gas_fee: f64,
    ) -> Result<TradeLogEntry, TradeLogEntry> {
        let loan = match self.loans.borrow(amount, &pair.token_a.mint).await {
            Ok(loan) => loan,
            Err(e) => {
                warn!("{}: borrow failed: {}", pair.label(), e);
                return Err(failed_entry(
                    pair,
                    amount,
                    opportunity,
                    &format!("borrow failed: {}", e),
                ));
            }
        };

        let (buy_venue, sell_venue) = match opportunity.direction {
            TradeDirection::BuyOnA => (
                self.evaluator.venue_a_label().to_string(),
                self.evaluator.venue_b_label().to_string(),
            ),
            TradeDirection::BuyOnB => (
                self.evaluator.venue_b_label().to_string(),
                self.evaluator.venue_a_label().to_string(),
            ),
        };

        let mut last_error: Option<ExecutionError> = None;
        let mut attempts = 0;
        for attempt in 1..=self.max_retries {
            attempts = attempt;
            match self
                .execute_legs(&buy_venue, &sell_venue, pair, amount)
                .await
            {
                Ok(()) => {
                    last_error = None;
                    break;
                }
                Err(e) => {
                    warn!(
                        "{}: attempt {}/{} failed: {}",
                        pair.label(),
                        attempt,
                        self.max_retries,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        // Repay regardless of how execution went
        let interest = loan.interest_accrued();
        let repay_failure = match loan.repay().await {
            Ok(()) => None,
            Err(e) => {
                error!("{}: repayment failed: {}", pair.label(), e);
                Some(e)
            }
        };

        if let Some(e) = last_error {
            return Err(TradeLogEntry {
                interest: Some(interest),
                gas_fee: Some(gas_fee),
                error: Some(format!(
                    "execution failed after {} attempts: {}",
                    attempts, e
                )),
                ..failed_entry(pair, amount, opportunity, "")
            });
        }
        if let Some(e) = repay_failure {
            return Err(TradeLogEntry {
                interest: Some(interest),
                gas_fee: Some(gas_fee),
                error: Some(format!("repayment failed: {}", e)),
                ..failed_entry(pair, amount, opportunity, "")
            });
        }

        info!(
            "{}: trade complete, net profit {:.9} ({} attempts)",
            pair.label(),
            net,
            attempts
        );

        Ok(TradeLogEntry {
            timestamp: Utc::now(),
            successful: true,
            pair: pair.label().to_string(),
            principal: amount,
            interest: Some(interest),
            gas_fee: Some(gas_fee),
            profit_loss: Some(net),
            quote_a: Some(opportunity.price_a),
            quote_b: Some(opportunity.price_b),
            error: None,
        })
    }

    /// One execution attempt: buy leg then sell leg. A retry restarts
    /// both legs from scratch.
    async fn execute_legs(
        &self,
        buy_venue: &str,
        sell_venue: &str,
        pair: &TradingPair,
        amount: f64,
    ) -> Result<(), ExecutionError> {
        self.executor
            .execute_leg(buy_venue, pair, amount, TradeSide::Buy)
            .await?;
        self.executor
            .execute_leg(sell_venue, pair, amount, TradeSide::Sell)
            .await?;
        Ok(())
    }

    fn record(&self, ledger: &mut TradeLedger, entry: TradeLogEntry) {
        if let Err(e) = ledger.append(entry) {
            warn!("Trade log write failed: {}", e);
        }
    }
}

fn failed_entry(
    pair: &TradingPair,
    amount: f64,
    opportunity: &Opportunity,
    message: &str,
) -> TradeLogEntry {
    TradeLogEntry {
        timestamp: Utc::now(),
        successful: false,
        pair: pair.label().to_string(),
        principal: amount,
        interest: None,
        gas_fee: None,
        profit_loss: None,
        quote_a: Some(opportunity.price_a),
        quote_b: Some(opportunity.price_b),
        error: Some(message.to_string()),
    }
}
