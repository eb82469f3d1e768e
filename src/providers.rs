//! Collaborator interfaces
//!
//! The decision core talks to the outside world through three capability
//! traits: price quoting, flash lending, and single-leg trade execution.
//! Any concrete exchange or lending integration implements these; the
//! core stays independently testable with fakes.

use crate::types::{Quote, TradingPair};
use async_trait::async_trait;
use thiserror::Error;

/// Quote-fetch errors. "No viable route" is NOT an error — providers
/// return `Ok(None)` for that; these variants cover genuine failures.
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("malformed API response: {0}")]
    InvalidResponse(String),
}

/// Lending errors
#[derive(Error, Debug)]
pub enum LoanError {
    #[error("borrow rejected: {0}")]
    BorrowRejected(String),

    #[error("repayment failed: {0}")]
    RepayFailed(String),
}

/// Trade-leg execution errors. All variants are retryable; the cycle
/// bounds the retry count.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("transaction failed on {venue}: {reason}")]
    TransactionFailed { venue: String, reason: String },

    #[error("transaction timeout on {venue}")]
    Timeout { venue: String },
}

/// Buy or sell the pair's base token (tokenA) on a venue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A price source for a token pair on one venue.
///
/// `quote` returns `Ok(None)` when the venue has no viable route for the
/// pair/amount — a normal outcome, not an error.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Venue name for logs and trade records
    fn label(&self) -> &str;

    async fn quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: f64,
    ) -> Result<Option<Quote>, QuoteError>;
}

/// An outstanding flash loan.
///
/// `repay` consumes the handle, so each successful borrow is repaid at
/// most once; dropping without repay is a bug the provider may penalize.
#[async_trait]
pub trait FlashLoan: Send + Sync {
    fn principal(&self) -> f64;

    fn asset(&self) -> &str;

    /// Interest accrued so far, in units of the borrowed asset.
    /// Monotonically non-decreasing until repaid.
    fn interest_accrued(&self) -> f64;

    async fn repay(self: Box<Self>) -> Result<(), LoanError>;
}

/// A flash-loan desk
#[async_trait]
pub trait LoanProvider: Send + Sync {
    async fn borrow(&self, amount: f64, asset: &str) -> Result<Box<dyn FlashLoan>, LoanError>;
}

/// Submits a single buy or sell leg on a named venue
#[async_trait]
pub trait TradeExecutor: Send + Sync {
    async fn execute_leg(
        &self,
        venue: &str,
        pair: &TradingPair,
        amount: f64,
        side: TradeSide,
    ) -> Result<(), ExecutionError>;
}
