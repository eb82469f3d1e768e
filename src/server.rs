//! HTTP status and export endpoints
//!
//! Read-only view over the monitor and the trade ledger:
//!   GET /health                                  liveness + counters
//!   GET /trades                                  full trade log (JSON)
//!   GET /trade-stats                             ledger aggregates
//!   GET /export-trades                           full trade log (CSV)
//!   GET /export-trades/:start_date/:end_date     date-bounded CSV
//!
//! Dates are YYYY-MM-DD, inclusive on both ends.

use crate::arbitrage::{ledger, TradeLedger};
use crate::monitor::BotMonitor;
use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<Mutex<BotMonitor>>,
    pub ledger: Arc<Mutex<TradeLedger>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/trades", get(trades))
        .route("/trade-stats", get(trade_stats))
        .route("/export-trades", get(export_trades))
        .route("/export-trades/:start_date/:end_date", get(export_trades_range))
        .with_state(state)
}

/// Bind and serve until the process exits
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!("HTTP server listening on port {}", port);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.monitor.lock().await.report(Utc::now());
    let code = if report.status == "healthy" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(report))
}

async fn trades(State(state): State<AppState>) -> impl IntoResponse {
    let ledger = state.ledger.lock().await;
    Json(ledger.all().to_vec())
}

async fn trade_stats(State(state): State<AppState>) -> impl IntoResponse {
    let ledger = state.ledger.lock().await;
    Json(ledger.stats())
}

async fn export_trades(State(state): State<AppState>) -> Response {
    let ledger = state.ledger.lock().await;
    csv_attachment("trades.csv", ledger::render_csv(ledger.all()))
}

async fn export_trades_range(
    State(state): State<AppState>,
    Path((start_date, end_date)): Path<(String, String)>,
) -> Response {
    let (start, end) = match parse_date_range(&start_date, &end_date) {
        Ok(range) => range,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    let ledger = state.ledger.lock().await;
    let entries = ledger.entries_between(start, end);
    let filename = format!("trades_{}_{}.csv", start_date, end_date);
    csv_attachment(&filename, ledger::render_csv(&entries))
}

fn csv_attachment(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

/// Parse a YYYY-MM-DD pair into an inclusive UTC range covering both
/// days in full
fn parse_date_range(
    start_date: &str,
    end_date: &str,
) -> Result<(DateTime<Utc>, DateTime<Utc>), String> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d")
        .map_err(|_| format!("invalid start date: {}", start_date))?;
    let end = NaiveDate::parse_from_str(end_date, "%Y-%m-%d")
        .map_err(|_| format!("invalid end date: {}", end_date))?;
    if end < start {
        return Err(format!(
            "end date {} precedes start date {}",
            end_date, start_date
        ));
    }

    let start = start
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| "invalid start date".to_string())?
        .and_utc();
    let end = end
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| "invalid end date".to_string())?
        .and_utc();
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_range_covers_full_days() {
        let (start, end) = parse_date_range("2026-01-01", "2026-01-31").unwrap();
        assert_eq!(start.to_rfc3339(), "2026-01-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-01-31T23:59:59+00:00");
    }

    #[test]
    fn test_parse_date_range_single_day() {
        let (start, end) = parse_date_range("2026-06-15", "2026-06-15").unwrap();
        assert!(start < end);
    }

    #[test]
    fn test_parse_date_range_rejects_garbage() {
        assert!(parse_date_range("not-a-date", "2026-01-31").is_err());
        assert!(parse_date_range("2026-01-01", "31/01/2026").is_err());
    }

    #[test]
    fn test_parse_date_range_rejects_inverted_range() {
        assert!(parse_date_range("2026-02-01", "2026-01-01").is_err());
    }
}
