//! CoinGecko market-cap ranking.
//!
//! API: `GET /api/v3/coins/markets`
//! Auth: none for the public tier.
//! Rate limit: roughly 10-30 calls/minute on the public tier; one call per scan.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::types::Symbol;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

pub const SOURCE_NAME: &str = "coingecko";

/// The endpoint caps `per_page` at 250.
pub const MAX_PER_PAGE: u32 = 250;

/// One row of `/coins/markets`. Only the ticker is used.
#[derive(Debug, Deserialize)]
struct CoinMarket {
    /// Lowercase base asset code, e.g. `"btc"`.
    symbol: String,
}

/// Client for the market-cap ranking endpoint.
pub struct CoinGeckoClient {
    http: Client,
    base_url: String,
    per_page: u32,
}

impl CoinGeckoClient {
    pub fn new(http: Client, base_url: &str, per_page: u32) -> Self {
        let clamped = per_page.clamp(1, MAX_PER_PAGE);
        if clamped != per_page {
            warn!(requested = per_page, using = clamped, "CoinGecko page size out of range");
        }
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            per_page: clamped,
        }
    }

    fn markets_url(&self) -> String {
        format!(
            "{}/coins/markets?vs_currency={}&order={}&per_page={}&page=1",
            self.base_url,
            urlencoding::encode("usd"),
            urlencoding::encode("market_cap_desc"),
            self.per_page,
        )
    }

    /// Top coins by market cap, mapped to USDT pair symbols in rank order.
    pub async fn top_symbols(&self) -> Result<Vec<Symbol>> {
        let url = self.markets_url();
        debug!(url = %url, "Fetching CoinGecko market-cap ranking");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("CoinGecko API request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("CoinGecko API error {status}: {body}");
        }

        let body = resp
            .text()
            .await
            .context("Failed to read CoinGecko response body")?;
        let symbols = parse_markets(&body)?;

        info!(count = symbols.len(), "Universe fetched from CoinGecko");
        Ok(symbols)
    }
}

/// Parse a `/coins/markets` response body into pair symbols.
pub fn parse_markets(body: &str) -> Result<Vec<Symbol>> {
    let coins: Vec<CoinMarket> =
        serde_json::from_str(body).context("Failed to parse CoinGecko markets response")?;
    Ok(coins.iter().map(|c| Symbol::from_base(&c.symbol)).collect())
}
