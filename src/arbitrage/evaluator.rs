//! Opportunity evaluation
//!
//! Fetches quotes for a pair from both venues and decides whether the
//! price spread clears the pair's profit threshold. Quote failures and
//! over-impact quotes degrade to "no opportunity" for the pair; the
//! evaluation cycle itself never aborts on a single venue hiccup.

use crate::providers::QuoteProvider;
use crate::types::{price_diff_percent, Opportunity, Quote, TradeDirection, TradingPair};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct OpportunityEvaluator {
    venue_a: Arc<dyn QuoteProvider>,
    venue_b: Arc<dyn QuoteProvider>,
}

impl OpportunityEvaluator {
    pub fn new(venue_a: Arc<dyn QuoteProvider>, venue_b: Arc<dyn QuoteProvider>) -> Self {
        Self { venue_a, venue_b }
    }

    pub fn venue_a_label(&self) -> &str {
        self.venue_a.label()
    }

    pub fn venue_b_label(&self) -> &str {
        self.venue_b.label()
    }

    /// Evaluate one pair at the given trade size. Returns the detected
    /// opportunity, or None when the spread is below threshold, either
    /// venue has no usable quote, or a quote exceeds the slippage gate.
    pub async fn evaluate(&self, pair: &TradingPair, amount: f64) -> Option<Opportunity> {
        // Both venues are quoted concurrently; the spread compares
        // prices observed at (close to) the same instant.
        let (quote_a, quote_b) = futures::join!(
            self.fetch_quote(&*self.venue_a, pair, amount),
            self.fetch_quote(&*self.venue_b, pair, amount)
        );
        let quote_a = quote_a?;
        let quote_b = quote_b?;

        // The spread must strictly exceed the threshold
        let spread = price_diff_percent(quote_a.price, quote_b.price);
        if spread <= pair.min_profit_percent {
            debug!(
                "{}: spread {:.4}% does not clear threshold {:.4}%",
                pair.label(),
                spread,
                pair.min_profit_percent
            );
            return None;
        }

        // Buy where tokenB is cheaper per tokenA spent, i.e. the venue
        // quoting the lower price.
        let direction = if quote_a.price < quote_b.price {
            TradeDirection::BuyOnA
        } else {
            TradeDirection::BuyOnB
        };

        info!(
            "{}: opportunity {:.4}% ({} {:.6} vs {} {:.6}), {}",
            pair.label(),
            spread,
            self.venue_a.label(),
            quote_a.price,
            self.venue_b.label(),
            quote_b.price,
            direction
        );

        Some(Opportunity {
            direction,
            price_a: quote_a.price,
            price_b: quote_b.price,
        })
    }

    /// Fetch one venue's quote, applying the pair's slippage gate.
    /// Any failure mode collapses to None so the caller can treat the
    /// pair uniformly as "nothing to do here".
    async fn fetch_quote(
        &self,
        venue: &dyn QuoteProvider,
        pair: &TradingPair,
        amount: f64,
    ) -> Option<Quote> {
        let quote = match venue
            .quote(&pair.token_a.mint, &pair.token_b.mint, amount)
            .await
        {
            Ok(Some(quote)) => quote,
            Ok(None) => {
                debug!("{}: no route on {}", pair.label(), venue.label());
                return None;
            }
            Err(e) => {
                warn!("{}: quote failed on {}: {}", pair.label(), venue.label(), e);
                return None;
            }
        };

        if quote.price_impact > pair.max_slippage {
            debug!(
                "{}: {} impact {:.4}% exceeds slippage cap {:.4}%",
                pair.label(),
                venue.label(),
                quote.price_impact,
                pair.max_slippage
            );
            return None;
        }

        Some(quote)
    }
}
