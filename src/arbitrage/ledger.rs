//! Trade ledger
//!
//! Append-only in-memory record of every attempted trade, with an
//! optional CSV file mirror for offline bookkeeping. The ledger is the
//! source of truth for the stats and export endpoints; reading it never
//! mutates it.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

/// One attempted trade, successful or not
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeLogEntry {
    pub timestamp: DateTime<Utc>,
    pub successful: bool,
    /// Pair symbol, e.g. "USDC/SOL"
    pub pair: String,
    /// Borrowed (or intended) principal in tokenA units
    pub principal: f64,
    /// Flash-loan interest paid, when a loan was taken
    pub interest: Option<f64>,
    pub gas_fee: Option<f64>,
    /// Net result after fees; negative on losing trades
    pub profit_loss: Option<f64>,
    /// Venue prices at evaluation time
    pub quote_a: Option<f64>,
    pub quote_b: Option<f64>,
    /// Failure description for unsuccessful attempts
    pub error: Option<String>,
}

/// Aggregates over the whole ledger
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStats {
    pub total_trades: usize,
    pub successful_trades: usize,
    /// Sum of profit_loss over all entries that carry one
    pub total_profit: f64,
    /// Mean profit_loss of successful trades; None when there are none
    pub average_profit_on_success: Option<f64>,
    pub total_gas_fees: f64,
    pub total_interest: f64,
}

const CSV_HEADERS: &[&str] = &[
    "timestamp",
    "successful",
    "pair",
    "principal",
    "interest",
    "gas_fee",
    "profit_loss",
    "quote_a",
    "quote_b",
    "error",
];

pub struct TradeLedger {
    entries: Vec<TradeLogEntry>,
    csv_mirror: Option<CsvMirror>,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            csv_mirror: None,
        }
    }

    /// Ledger that also appends every entry to a CSV file
    pub fn with_csv_mirror<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            entries: Vec::new(),
            csv_mirror: Some(CsvMirror::new(path)?),
        })
    }

    /// Record an attempt. The in-memory entry is kept even when the CSV
    /// mirror fails; mirror errors surface to the caller for logging.
    pub fn append(&mut self, entry: TradeLogEntry) -> Result<()> {
        let mirror_result = match &mut self.csv_mirror {
            Some(mirror) => mirror.log(&entry),
            None => Ok(()),
        };
        self.entries.push(entry);
        mirror_result
    }

    /// All entries in insertion order
    pub fn all(&self) -> &[TradeLogEntry] {
        &self.entries
    }

    /// Entries with start <= timestamp <= end
    pub fn entries_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<TradeLogEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.timestamp >= start && entry.timestamp <= end)
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> LedgerStats {
        let successful: Vec<&TradeLogEntry> =
            self.entries.iter().filter(|e| e.successful).collect();

        let success_profit: f64 = successful.iter().filter_map(|e| e.profit_loss).sum();
        let average_profit_on_success = if successful.is_empty() {
            None
        } else {
            Some(success_profit / successful.len() as f64)
        };

        LedgerStats {
            total_trades: self.entries.len(),
            successful_trades: successful.len(),
            total_profit: self.entries.iter().filter_map(|e| e.profit_loss).sum(),
            average_profit_on_success,
            total_gas_fees: self.entries.iter().filter_map(|e| e.gas_fee).sum(),
            total_interest: self.entries.iter().filter_map(|e| e.interest).sum(),
        }
    }
}

impl Default for TradeLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Render entries as a CSV document (header + one row per entry)
pub fn render_csv(entries: &[TradeLogEntry]) -> String {
    let mut out = String::new();
    out.push_str(&CSV_HEADERS.join(","));
    out.push('\n');
    for entry in entries {
        out.push_str(&render_row(entry));
        out.push('\n');
    }
    out
}

fn render_row(entry: &TradeLogEntry) -> String {
    fn opt(value: Option<f64>) -> String {
        value.map(|v| v.to_string()).unwrap_or_default()
    }

    let fields = vec![
        entry.timestamp.to_rfc3339(),
        entry.successful.to_string(),
        escape_csv_field(&entry.pair),
        entry.principal.to_string(),
        opt(entry.interest),
        opt(entry.gas_fee),
        opt(entry.profit_loss),
        opt(entry.quote_a),
        opt(entry.quote_b),
        escape_csv_field(entry.error.as_deref().unwrap_or_default()),
    ];
    fields.join(",")
}

/// Escape a CSV field that may contain special characters
fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Append-only CSV file behind the ledger
struct CsvMirror {
    path: PathBuf,
    headers_written: bool,
}

impl CsvMirror {
    fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory: {:?}", parent))?;
            }
        }
        let headers_written = path.exists();
        Ok(Self {
            path,
            headers_written,
        })
    }

    fn log(&mut self, entry: &TradeLogEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open trade CSV file: {:?}", self.path))?;

        if !self.headers_written {
            writeln!(file, "{}", CSV_HEADERS.join(","))?;
            self.headers_written = true;
        }

        writeln!(file, "{}", render_row(entry))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::env;
    use std::fs;

    fn entry_at(ts: DateTime<Utc>, successful: bool, profit: Option<f64>) -> TradeLogEntry {
        TradeLogEntry {
            timestamp: ts,
            successful,
            pair: "USDC/SOL".to_string(),
            principal: 100.0,
            interest: Some(0.001),
            gas_fee: Some(0.00001),
            profit_loss: profit,
            quote_a: Some(20.10),
            quote_b: Some(20.00),
            error: if successful {
                None
            } else {
                Some("leg failed".to_string())
            },
        }
    }

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_stats_aggregation() {
        let mut ledger = TradeLedger::new();
        ledger.append(entry_at(ts(100), true, Some(10.0))).unwrap();
        ledger.append(entry_at(ts(200), true, Some(6.0))).unwrap();
        ledger.append(entry_at(ts(300), false, None)).unwrap();

        let stats = ledger.stats();
        assert_eq!(stats.total_trades, 3);
        assert_eq!(stats.successful_trades, 2);
        assert!((stats.total_profit - 16.0).abs() < 1e-9);
        assert!((stats.average_profit_on_success.unwrap() - 8.0).abs() < 1e-9);
        assert!((stats.total_gas_fees - 0.00003).abs() < 1e-12);
        assert!((stats.total_interest - 0.003).abs() < 1e-12);
    }

    #[test]
    fn test_average_profit_none_without_successes() {
        let mut ledger = TradeLedger::new();
        ledger.append(entry_at(ts(100), false, None)).unwrap();

        let stats = ledger.stats();
        assert_eq!(stats.successful_trades, 0);
        assert!(stats.average_profit_on_success.is_none());
    }

    #[test]
    fn test_reads_do_not_mutate() {
        let mut ledger = TradeLedger::new();
        ledger.append(entry_at(ts(100), true, Some(1.0))).unwrap();

        let _ = ledger.stats();
        let _ = ledger.all();
        let _ = ledger.entries_between(ts(0), ts(1000));
        assert_eq!(ledger.all().len(), 1);
    }

    #[test]
    fn test_entries_preserve_insertion_order() {
        let mut ledger = TradeLedger::new();
        ledger.append(entry_at(ts(300), true, Some(1.0))).unwrap();
        ledger.append(entry_at(ts(100), true, Some(2.0))).unwrap();

        // Order of insertion, not timestamp order
        let all = ledger.all();
        assert_eq!(all[0].timestamp, ts(300));
        assert_eq!(all[1].timestamp, ts(100));
    }

    #[test]
    fn test_entries_between_is_inclusive() {
        let mut ledger = TradeLedger::new();
        ledger.append(entry_at(ts(100), true, Some(1.0))).unwrap();
        ledger.append(entry_at(ts(200), true, Some(2.0))).unwrap();
        ledger.append(entry_at(ts(300), true, Some(3.0))).unwrap();

        let range = ledger.entries_between(ts(100), ts(200));
        assert_eq!(range.len(), 2);
        assert!(ledger.entries_between(ts(301), ts(400)).is_empty());
    }

    #[test]
    fn test_render_csv() {
        let mut ledger = TradeLedger::new();
        ledger.append(entry_at(ts(100), true, Some(9.99))).unwrap();

        let csv = render_csv(ledger.all());
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "timestamp,successful,pair,principal,interest,gas_fee,profit_loss,quote_a,quote_b,error"
        );
        let row = lines.next().unwrap();
        assert!(row.contains("true"));
        assert!(row.contains("USDC/SOL"));
        assert!(row.contains("9.99"));
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(escape_csv_field("simple"), "simple");
        assert_eq!(escape_csv_field("has,comma"), "\"has,comma\"");
        assert_eq!(escape_csv_field("has\"quote"), "\"has\"\"quote\"");
    }

    #[test]
    fn test_csv_mirror_appends() {
        let path = env::temp_dir().join("flasharb_ledger_test.csv");
        let _ = fs::remove_file(&path);

        let mut ledger = TradeLedger::with_csv_mirror(&path).unwrap();
        ledger.append(entry_at(ts(100), true, Some(1.0))).unwrap();
        ledger.append(entry_at(ts(200), false, None)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        // Header written exactly once
        assert_eq!(content.lines().count(), 3);
        assert!(content.starts_with("timestamp,"));

        let _ = fs::remove_file(&path);
    }
}
