//! Paper flash-loan desk
//!
//! Implements [`LoanProvider`] with simulated borrows so the full
//! borrow -> execute -> repay sequence can run without a live lending
//! program. Interest accrues linearly from the borrow instant at a
//! configurable annualized rate, mirroring how a margin account quotes
//! accrual; a real lending integration implements the same traits.

use crate::providers::{FlashLoan, LoanError, LoanProvider};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Default borrow rate: 50% APR (5000 bps), the margin-account cap
pub const DEFAULT_BORROW_RATE_BPS: u32 = 5000;

const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0;

pub struct PaperLoanDesk {
    borrow_rate_bps: u32,
    /// Outstanding loans, for the never-borrow-twice invariant
    outstanding: Arc<AtomicU64>,
}

impl PaperLoanDesk {
    pub fn new(borrow_rate_bps: u32) -> Self {
        Self {
            borrow_rate_bps,
            outstanding: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of loans currently borrowed and not yet repaid
    pub fn outstanding(&self) -> u64 {
        self.outstanding.load(Ordering::SeqCst)
    }
}

impl Default for PaperLoanDesk {
    fn default() -> Self {
        Self::new(DEFAULT_BORROW_RATE_BPS)
    }
}

pub struct PaperLoan {
    principal: f64,
    asset: String,
    borrow_rate_bps: u32,
    borrowed_at: Instant,
    outstanding: Arc<AtomicU64>,
}

#[async_trait]
impl LoanProvider for PaperLoanDesk {
    async fn borrow(&self, amount: f64, asset: &str) -> Result<Box<dyn FlashLoan>, LoanError> {
        if amount <= 0.0 {
            return Err(LoanError::BorrowRejected(format!(
                "non-positive principal: {}",
                amount
            )));
        }

        // A cycle must never borrow twice without repaying the prior loan
        if self.outstanding.load(Ordering::SeqCst) > 0 {
            return Err(LoanError::BorrowRejected(
                "prior loan still outstanding".to_string(),
            ));
        }

        self.outstanding.fetch_add(1, Ordering::SeqCst);
        info!("Flash loan borrowed: {} {}", amount, asset);

        Ok(Box::new(PaperLoan {
            principal: amount,
            asset: asset.to_string(),
            borrow_rate_bps: self.borrow_rate_bps,
            borrowed_at: Instant::now(),
            outstanding: Arc::clone(&self.outstanding),
        }))
    }
}

#[async_trait]
impl FlashLoan for PaperLoan {
    fn principal(&self) -> f64 {
        self.principal
    }

    fn asset(&self) -> &str {
        &self.asset
    }

    fn interest_accrued(&self) -> f64 {
        let elapsed = self.borrowed_at.elapsed().as_secs_f64();
        let annual_rate = self.borrow_rate_bps as f64 / 10_000.0;
        self.principal * annual_rate * elapsed / SECONDS_PER_YEAR
    }

    async fn repay(self: Box<Self>) -> Result<(), LoanError> {
        let interest = self.interest_accrued();
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
        debug!(
            "Flash loan repaid: {} {} + {:.9} interest",
            self.principal, self.asset, interest
        );
        Ok(())
    }
}
