//! Binance spot klines.
//!
//! API: `GET /api/v3/klines?symbol=..&interval=..&limit=..`
//! Auth: none for market data.
//! Response rows: `[open_time, open, high, low, close, volume, close_time, ...]`
//! with prices encoded as decimal strings.

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::types::{Candle, CandleSeries, Symbol};

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Largest `limit` the klines endpoint accepts.
pub const MAX_KLINES: u32 = 1000;

/// Client for the klines endpoint.
pub struct BinanceClient {
    http: Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn klines_url(&self, symbol: &Symbol, interval: &str, limit: u32) -> String {
        format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            urlencoding::encode(interval),
            limit,
        )
    }

    /// Fetch the most recent `limit` candles for `symbol`.
    ///
    /// Unknown symbols come back as HTTP 400 and surface as an error.
    pub async fn klines(&self, symbol: &Symbol, interval: &str, limit: u32) -> Result<CandleSeries> {
        let url = self.klines_url(symbol, interval, limit);
        debug!(url = %url, "Fetching Binance klines");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("Binance klines request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Binance API error {status}: {body}");
        }

        let rows: Vec<Value> = resp
            .json()
            .await
            .context("Failed to parse Binance klines response")?;

        parse_klines(&rows)
    }
}

/// Read a price field. Binance sends strings; plain numbers are accepted too.
fn price_at(row: &[Value], idx: usize, name: &str) -> Result<f64> {
    let v = row
        .get(idx)
        .with_context(|| format!("kline row missing {name}"))?;
    let price = match v {
        Value::String(s) => s
            .parse::<f64>()
            .with_context(|| format!("kline {name} is not a number: {s:?}"))?,
        Value::Number(n) => n
            .as_f64()
            .with_context(|| format!("kline {name} out of range"))?,
        other => anyhow::bail!("kline {name} has unexpected type: {other}"),
    };
    if !price.is_finite() {
        anyhow::bail!("kline {name} is not finite");
    }
    Ok(price)
}

/// Convert raw kline rows into a candle series.
///
/// A single malformed row rejects the whole series.
pub fn parse_klines(rows: &[Value]) -> Result<CandleSeries> {
    let candles = rows
        .iter()
        .enumerate()
        .map(|(i, row)| -> Result<Candle> {
            let row = row
                .as_array()
                .with_context(|| format!("kline row {i} is not an array"))?;
            Ok(Candle {
                open: price_at(row, 1, "open")?,
                high: price_at(row, 2, "high")?,
                low: price_at(row, 3, "low")?,
                close: price_at(row, 4, "close")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CandleSeries::new(candles))
}
