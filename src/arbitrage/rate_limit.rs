//! Trade rate limiter
//!
//! Enforces a minimum wall-clock spacing between executed trades. The
//! caller passes the current time explicitly, which keeps the limiter
//! deterministic under test and independent of any global clock.

use tracing::debug;

pub struct TradeRateLimiter {
    min_interval_ms: u64,
    /// Time of the last trade that passed the gate. `None` until the
    /// first acquisition, which always succeeds.
    last_trade_ms: Option<u64>,
}

impl TradeRateLimiter {
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ms,
            last_trade_ms: None,
        }
    }

    /// Try to pass the gate at time `now_ms` (unix millis).
    ///
    /// Returns true and advances the clock when the minimum interval has
    /// elapsed since the last passing acquisition. A denied call does NOT
    /// touch the clock, so a later retry is judged against the last trade
    /// that actually happened.
    pub fn try_acquire(&mut self, now_ms: u64) -> bool {
        match self.last_trade_ms {
            Some(last) if now_ms.saturating_sub(last) < self.min_interval_ms => {
                debug!(
                    "Rate limited: {}ms since last trade (minimum {}ms)",
                    now_ms.saturating_sub(last),
                    self.min_interval_ms
                );
                false
            }
            _ => {
                self.last_trade_ms = Some(now_ms);
                true
            }
        }
    }
}
