//! Bot health tracking and the evaluation driver
//!
//! [`BotMonitor`] accumulates check/trade counters for the health
//! endpoint; [`run_driver`] ticks the arbitrage cycle on a fixed
//! interval and feeds the monitor after every pass.

use crate::arbitrage::{ArbitrageCycle, CycleSummary, TradeLedger, TradeRateLimiter};
use crate::types::TradingPair;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::info;

/// The bot reports unhealthy when no check has completed for this long
const STALE_AFTER_MINUTES: i64 = 15;

pub struct BotMonitor {
    started_at: DateTime<Utc>,
    last_check_time: Option<DateTime<Utc>>,
    total_checks: u64,
    successful_trades: u64,
    failed_trades: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub metrics: MonitorMetrics,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorMetrics {
    pub last_check_time: Option<DateTime<Utc>>,
    pub total_checks: u64,
    pub successful_trades: u64,
    pub failed_trades: u64,
    /// Seconds since the bot started
    pub uptime: i64,
}

impl BotMonitor {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            last_check_time: None,
            total_checks: 0,
            successful_trades: 0,
            failed_trades: 0,
        }
    }

    /// Fold one cycle's outcome into the counters
    pub fn record_check(&mut self, at: DateTime<Utc>, summary: &CycleSummary) {
        self.last_check_time = Some(at);
        self.total_checks += 1;
        self.successful_trades += summary.executed as u64;
        self.failed_trades += summary.failed as u64;
    }

    /// Healthy while the most recent check (or startup, before the first
    /// check) is no older than the staleness window at time `now`.
    pub fn report(&self, now: DateTime<Utc>) -> HealthReport {
        let reference = self.last_check_time.unwrap_or(self.started_at);
        let status = if now - reference <= ChronoDuration::minutes(STALE_AFTER_MINUTES) {
            "healthy"
        } else {
            "unhealthy"
        };

        HealthReport {
            status,
            metrics: MonitorMetrics {
                last_check_time: self.last_check_time,
                total_checks: self.total_checks,
                successful_trades: self.successful_trades,
                failed_trades: self.failed_trades,
                uptime: (now - self.started_at).num_seconds(),
            },
        }
    }
}

/// Run evaluation passes forever on a fixed interval.
///
/// Cycles run back to back in a single task; a pass that outlasts the
/// interval simply delays the next tick rather than overlapping it.
pub async fn run_driver(
    cycle: ArbitrageCycle,
    pairs: Vec<TradingPair>,
    rate_limit_ms: u64,
    check_interval_ms: u64,
    monitor: Arc<Mutex<BotMonitor>>,
    ledger: Arc<Mutex<TradeLedger>>,
) {
    let mut rate_limiter = TradeRateLimiter::new(rate_limit_ms);
    let mut interval = tokio::time::interval(Duration::from_millis(check_interval_ms));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        "Starting evaluation loop: {} pair(s), every {}ms",
        pairs.len(),
        check_interval_ms
    );

    loop {
        interval.tick().await;

        let now = Utc::now();
        let now_ms = now.timestamp_millis() as u64;

        let summary = {
            let mut ledger = ledger.lock().await;
            cycle
                .run_once(&pairs, now_ms, &mut rate_limiter, &mut ledger)
                .await
        };

        monitor.lock().await.record_check(now, &summary);

        info!(
            "Cycle complete: {} evaluated, {} opportunities, {} executed, {} failed",
            summary.evaluated, summary.opportunities, summary.executed, summary.failed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_healthy_before_first_check() {
        let monitor = BotMonitor::new(at(0));
        let report = monitor.report(at(60));
        assert_eq!(report.status, "healthy");
        assert_eq!(report.metrics.total_checks, 0);
        assert_eq!(report.metrics.uptime, 60);
    }

    #[test]
    fn test_unhealthy_when_checks_go_stale() {
        let mut monitor = BotMonitor::new(at(0));
        monitor.record_check(at(100), &CycleSummary::default());

        // 15 minutes after the last check is still healthy; a second
        // past that is not
        assert_eq!(monitor.report(at(100 + 15 * 60)).status, "healthy");
        assert_eq!(monitor.report(at(100 + 15 * 60 + 1)).status, "unhealthy");
    }

    #[test]
    fn test_counters_accumulate_across_checks() {
        let mut monitor = BotMonitor::new(at(0));
        monitor.record_check(
            at(100),
            &CycleSummary {
                evaluated: 2,
                opportunities: 1,
                executed: 1,
                failed: 0,
            },
        );
        monitor.record_check(
            at(200),
            &CycleSummary {
                evaluated: 2,
                opportunities: 2,
                executed: 0,
                failed: 2,
            },
        );

        let metrics = monitor.report(at(300)).metrics;
        assert_eq!(metrics.total_checks, 2);
        assert_eq!(metrics.successful_trades, 1);
        assert_eq!(metrics.failed_trades, 2);
        assert_eq!(metrics.last_check_time, Some(at(200)));
    }
}
