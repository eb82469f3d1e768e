//! Jupiter aggregator quote client
//!
//! Fetches swap quotes from the Jupiter v6 quote API. Jupiter routes
//! across many Solana DEXs; we only consume the top route's price and
//! price impact here — route building and execution are out of scope.

use crate::providers::{QuoteError, QuoteProvider};
use crate::types::Quote;
use crate::venues::{to_raw_units, to_ui_amount, QUOTE_TIMEOUT};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://quote-api.jup.ag/v6";

/// Jupiter quote API response (fields we consume)
#[derive(Debug, Deserialize)]
struct JupiterQuoteResponse {
    #[serde(rename = "inAmount")]
    in_amount: String,
    #[serde(rename = "outAmount")]
    out_amount: String,
    /// Fraction of price lost to impact, e.g. "0.0012" = 0.12%
    #[serde(rename = "priceImpactPct")]
    price_impact_pct: String,
}

/// Error body Jupiter returns when no route exists for the pair/amount
#[derive(Debug, Deserialize)]
struct JupiterErrorResponse {
    #[serde(rename = "errorCode")]
    error_code: Option<String>,
    error: Option<String>,
}

pub struct JupiterQuoteClient {
    http: Client,
    base_url: String,
    /// Decimals per known mint, needed to convert the API's raw
    /// base-unit amounts back into UI prices
    decimals: HashMap<String, u8>,
    /// Slippage tolerance forwarded to the router, in basis points
    slippage_bps: u32,
}

impl JupiterQuoteClient {
    /// `max_slippage_percent` is converted to basis points for the API
    pub fn new(max_slippage_percent: f64) -> Self {
        Self {
            http: Client::builder()
                .timeout(QUOTE_TIMEOUT)
                .build()
                .expect("reqwest client"),
            base_url: DEFAULT_BASE_URL.to_string(),
            decimals: HashMap::new(),
            slippage_bps: (max_slippage_percent * 100.0) as u32,
        }
    }

    /// Register a mint's decimals. Quoting an unregistered mint fails.
    pub fn register_token(&mut self, mint: &str, decimals: u8) {
        self.decimals.insert(mint.to_string(), decimals);
    }

    fn decimals_of(&self, mint: &str) -> Result<u8, QuoteError> {
        self.decimals
            .get(mint)
            .copied()
            .ok_or_else(|| QuoteError::InvalidResponse(format!("unknown mint: {}", mint)))
    }
}

#[async_trait]
impl QuoteProvider for JupiterQuoteClient {
    fn label(&self) -> &str {
        "Jupiter"
    }

    async fn quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: f64,
    ) -> Result<Option<Quote>, QuoteError> {
        let input_decimals = self.decimals_of(input_mint)?;
        let output_decimals = self.decimals_of(output_mint)?;
        let amount_raw = to_raw_units(amount, input_decimals);
        let url = format!(
            "{}/quote?inputMint={}&outputMint={}&amount={}&slippageBps={}",
            self.base_url, input_mint, output_mint, amount_raw, self.slippage_bps
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| QuoteError::Api(e.to_string()))?;

        if !response.status().is_success() {
            // Jupiter answers 400 with an error code when no route exists;
            // that is a normal outcome, not a failure.
            let status = response.status();
            if let Ok(err) = response.json::<JupiterErrorResponse>().await {
                if err.error_code.as_deref() == Some("COULD_NOT_FIND_ANY_ROUTE") {
                    debug!("Jupiter: no route for {} -> {}", input_mint, output_mint);
                    return Ok(None);
                }
                warn!(
                    "Jupiter quote failed ({}): {}",
                    status,
                    err.error.unwrap_or_default()
                );
            }
            return Err(QuoteError::Api(format!("status {}", status)));
        }

        let body: JupiterQuoteResponse = response
            .json()
            .await
            .map_err(|e| QuoteError::InvalidResponse(e.to_string()))?;

        let in_raw: u64 = body
            .in_amount
            .parse()
            .map_err(|_| QuoteError::InvalidResponse(format!("inAmount: {}", body.in_amount)))?;
        let out_raw: u64 = body
            .out_amount
            .parse()
            .map_err(|_| QuoteError::InvalidResponse(format!("outAmount: {}", body.out_amount)))?;

        if in_raw == 0 || out_raw == 0 {
            return Ok(None);
        }

        let in_ui = to_ui_amount(in_raw, input_decimals);
        let out_ui = to_ui_amount(out_raw, output_decimals);
        let price = out_ui / in_ui;

        let price_impact = parse_price_impact(&body.price_impact_pct)?;

        debug!(
            "Jupiter quote {} -> {}: price={:.6}, impact={:.4}%",
            input_mint, output_mint, price, price_impact
        );

        Ok(Some(Quote {
            price,
            price_impact,
        }))
    }
}

/// Jupiter reports impact as a fraction; the rest of the bot works in
/// percent throughout, so normalize here (never basis points). A field
/// that does not parse is a malformed response, not zero impact.
fn parse_price_impact(raw: &str) -> Result<f64, QuoteError> {
    raw.parse::<f64>()
        .map(|fraction| fraction * 100.0)
        .map_err(|_| QuoteError::InvalidResponse(format!("priceImpactPct: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_impact_fraction_to_percent() {
        // "0.0012" = 0.12%
        assert!((parse_price_impact("0.0012").unwrap() - 0.12).abs() < 1e-12);
        assert_eq!(parse_price_impact("0").unwrap(), 0.0);
    }

    #[test]
    fn test_malformed_price_impact_is_rejected() {
        assert!(parse_price_impact("").is_err());
        assert!(parse_price_impact("n/a").is_err());
    }

    #[test]
    fn test_slippage_percent_to_bps() {
        assert_eq!(JupiterQuoteClient::new(0.1).slippage_bps, 10);
        assert_eq!(JupiterQuoteClient::new(1.0).slippage_bps, 100);
    }

    #[test]
    fn test_decimals_registry() {
        let mut client = JupiterQuoteClient::new(0.1);
        client.register_token("USDC", 6);

        assert_eq!(client.decimals_of("USDC").unwrap(), 6);
        assert!(client.decimals_of("UNKNOWN").is_err());
    }
}
