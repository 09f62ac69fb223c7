//! Market data sources.
//!
//! Defines the `MarketData` trait used by the scanner and the
//! `MarketDataClient` that backs it with live providers:
//! - CoinGecko: market-cap ranking used as the symbol universe
//! - Binance: spot klines per symbol

pub mod binance;
pub mod coingecko;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::MarketDataConfig;
use crate::types::{CandleSeries, ScreenerError, Symbol};
use binance::BinanceClient;
use coingecko::CoinGeckoClient;

/// Abstraction over the data the scanner needs.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Ranked symbol universe. An error here is fatal for the scan.
    async fn fetch_universe(&self) -> Result<Vec<Symbol>>;

    /// Most recent `limit` candles at `interval`, oldest first.
    /// Any failure yields `None` so the caller can move on.
    async fn fetch_candles(
        &self,
        symbol: &Symbol,
        interval: &str,
        limit: u32,
    ) -> Option<CandleSeries>;
}

/// Build the HTTP client shared by the live providers.
pub fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("crypto-screener/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client for market data")
}

/// Live market data: CoinGecko for the universe, Binance for candles.
pub struct MarketDataClient {
    universe: CoinGeckoClient,
    candles: BinanceClient,
}

impl MarketDataClient {
    pub fn new(universe: CoinGeckoClient, candles: BinanceClient) -> Self {
        Self { universe, candles }
    }

    /// Construct both providers from configuration, sharing one HTTP client.
    pub fn from_config(cfg: &MarketDataConfig, universe_size: u32) -> Result<Self> {
        let http = build_http_client(Duration::from_secs(cfg.request_timeout_secs))?;
        Ok(Self::new(
            CoinGeckoClient::new(http.clone(), &cfg.coingecko_base_url, universe_size),
            BinanceClient::new(http, &cfg.binance_base_url),
        ))
    }
}

#[async_trait]
impl MarketData for MarketDataClient {
    async fn fetch_universe(&self) -> Result<Vec<Symbol>> {
        self.universe.top_symbols().await.map_err(|e| {
            ScreenerError::MarketData {
                source_name: coingecko::SOURCE_NAME.to_string(),
                message: format!("{e:#}"),
            }
            .into()
        })
    }

    async fn fetch_candles(
        &self,
        symbol: &Symbol,
        interval: &str,
        limit: u32,
    ) -> Option<CandleSeries> {
        match self.candles.klines(symbol, interval, limit).await {
            Ok(series) => Some(series),
            Err(e) => {
                debug!(symbol = %symbol, error = %e, "Candle fetch failed, skipping");
                None
            }
        }
    }
}
