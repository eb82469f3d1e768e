//! Arbitrage decision core
//!
//! Opportunity evaluation, trade pacing, cycle orchestration, and the
//! trade ledger.

pub mod cycle;
pub mod evaluator;
pub mod ledger;
pub mod rate_limit;

pub use cycle::{ArbitrageCycle, CycleSummary};
pub use evaluator::OpportunityEvaluator;
pub use ledger::{LedgerStats, TradeLedger, TradeLogEntry};
pub use rate_limit::TradeRateLimiter;
