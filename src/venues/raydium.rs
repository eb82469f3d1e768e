//! Raydium AMM quote client
//!
//! Resolves the deepest standard pool for a mint pair via the Raydium v3
//! pools API and derives a quote from its reserves with the constant
//! product formula. Price impact is computed against the pool's spot
//! price using the bot-wide impact formula.

use crate::providers::{QuoteError, QuoteProvider};
use crate::types::{price_impact_percent, Quote};
use crate::venues::QUOTE_TIMEOUT;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api-v3.raydium.io";

#[derive(Debug, Deserialize)]
struct RaydiumPoolsResponse {
    success: bool,
    data: RaydiumPoolsPage,
}

#[derive(Debug, Deserialize)]
struct RaydiumPoolsPage {
    data: Vec<RaydiumPool>,
}

/// Raydium pool info (fields we consume)
#[derive(Debug, Deserialize)]
struct RaydiumPool {
    #[serde(rename = "mintA")]
    mint_a: RaydiumMint,
    #[serde(rename = "mintB")]
    mint_b: RaydiumMint,
    /// Spot price: mintB per mintA
    price: f64,
    /// Reserves in UI units
    #[serde(rename = "mintAmountA")]
    mint_amount_a: f64,
    #[serde(rename = "mintAmountB")]
    mint_amount_b: f64,
    /// Trade fee as a fraction, e.g. 0.0025
    #[serde(rename = "feeRate")]
    fee_rate: f64,
}

#[derive(Debug, Deserialize)]
struct RaydiumMint {
    address: String,
}

pub struct RaydiumQuoteClient {
    http: Client,
    base_url: String,
}

impl RaydiumQuoteClient {
    pub fn new() -> Self {
        Self {
            http: Client::builder()
                .timeout(QUOTE_TIMEOUT)
                .build()
                .expect("reqwest client"),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Fetch the deepest standard pool for the mint pair, if any
    async fn deepest_pool(
        &self,
        mint_a: &str,
        mint_b: &str,
    ) -> Result<Option<RaydiumPool>, QuoteError> {
        let url = format!(
            "{}/pools/info/mint?mint1={}&mint2={}&poolType=standard&poolSortField=liquidity&sortType=desc&pageSize=1&page=1",
            self.base_url, mint_a, mint_b
        );

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| QuoteError::Api(e.to_string()))?;

        if !response.status().is_success() {
            return Err(QuoteError::Api(format!("status {}", response.status())));
        }

        let body: RaydiumPoolsResponse = response
            .json()
            .await
            .map_err(|e| QuoteError::InvalidResponse(e.to_string()))?;

        if !body.success {
            return Err(QuoteError::InvalidResponse("success=false".to_string()));
        }

        Ok(body.data.data.into_iter().next())
    }
}

impl Default for RaydiumQuoteClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Constant product swap output: dy = (y * dx_after_fee) / (x + dx_after_fee).
/// Amounts are UI units; `fee_rate` is a fraction of the input.
fn amount_out(amount_in: f64, reserve_in: f64, reserve_out: f64, fee_rate: f64) -> f64 {
    if reserve_in <= 0.0 || reserve_out <= 0.0 {
        return 0.0;
    }
    let adjusted_in = amount_in * (1.0 - fee_rate);
    (reserve_out * adjusted_in) / (reserve_in + adjusted_in)
}

#[async_trait]
impl QuoteProvider for RaydiumQuoteClient {
    fn label(&self) -> &str {
        "Raydium"
    }

    async fn quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: f64,
    ) -> Result<Option<Quote>, QuoteError> {
        let pool = match self.deepest_pool(input_mint, output_mint).await? {
            Some(pool) => pool,
            None => {
                debug!("Raydium: no pool for {} -> {}", input_mint, output_mint);
                return Ok(None);
            }
        };

        // The API returns the pool in its own mint order; orient reserves
        // and spot price to the requested direction.
        let (reserve_in, reserve_out, spot_price) =
            if pool.mint_a.address == input_mint && pool.mint_b.address == output_mint {
                (pool.mint_amount_a, pool.mint_amount_b, pool.price)
            } else if pool.mint_b.address == input_mint && pool.mint_a.address == output_mint {
                if pool.price <= 0.0 {
                    return Ok(None);
                }
                (pool.mint_amount_b, pool.mint_amount_a, 1.0 / pool.price)
            } else {
                return Err(QuoteError::InvalidResponse(format!(
                    "pool mints {}/{} do not match requested {} -> {}",
                    pool.mint_a.address, pool.mint_b.address, input_mint, output_mint
                )));
            };

        let out = amount_out(amount, reserve_in, reserve_out, pool.fee_rate);
        if out <= 0.0 {
            return Ok(None);
        }

        let price = out / amount;
        let price_impact = price_impact_percent(amount, out, spot_price);

        debug!(
            "Raydium quote {} -> {}: price={:.6}, impact={:.4}%",
            input_mint, output_mint, price, price_impact
        );

        Ok(Some(Quote {
            price,
            price_impact,
        }))
    }
}
