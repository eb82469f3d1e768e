//! Concrete venue integrations
//!
//! HTTP quote clients for the two price sources the bot compares.
//! Both implement [`QuoteProvider`](crate::providers::QuoteProvider);
//! the decision core never references them directly.

mod jupiter;
mod raydium;

pub use jupiter::JupiterQuoteClient;
pub use raydium::RaydiumQuoteClient;

use std::time::Duration;

/// Per-call timeout for quote API requests. A timed-out quote is treated
/// as no-opportunity for the pair, never as a fatal error.
pub(crate) const QUOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Convert a UI amount to raw base units for the given decimals
pub(crate) fn to_raw_units(amount: f64, decimals: u8) -> u64 {
    (amount * 10_f64.powi(decimals as i32)) as u64
}

/// Convert raw base units back to a UI amount
pub(crate) fn to_ui_amount(raw: u64, decimals: u8) -> f64 {
    raw as f64 / 10_f64.powi(decimals as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversion_round_trip() {
        // 100 USDC at 6 decimals
        assert_eq!(to_raw_units(100.0, 6), 100_000_000);
        assert!((to_ui_amount(100_000_000, 6) - 100.0).abs() < 1e-9);

        // 0.1 SOL at 9 decimals
        assert_eq!(to_raw_units(0.1, 9), 100_000_000);
    }
}
