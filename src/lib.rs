//! Cross-venue flash-loan arbitrage bot for Solana token pairs.
//!
//! Quotes each configured pair on two venues, detects price spreads
//! worth trading, and runs flash-loan-funded buy/sell sequences with a
//! full trade ledger and an HTTP status surface.

pub mod arbitrage;
pub mod config;
pub mod execution;
pub mod lending;
pub mod monitor;
pub mod providers;
pub mod server;
pub mod types;
pub mod venues;
