//! In-memory market data and notifier for integration testing.
//!
//! Universe and per-symbol candles are fully controllable from test
//! code, and every call is recorded so ordering can be asserted.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crypto_screener::alerts::Notifier;
use crypto_screener::market::MarketData;
use crypto_screener::types::{Candle, CandleSeries, Symbol};

/// A deterministic `MarketData` implementation.
pub struct MockMarket {
    universe: Result<Vec<Symbol>, String>,
    candles: HashMap<String, CandleSeries>,
    /// Every `fetch_candles` call as (symbol, interval, limit).
    calls: Arc<Mutex<Vec<(String, String, u32)>>>,
}

impl MockMarket {
    /// Universe of the given base assets; no candles until added.
    pub fn with_universe(bases: &[&str]) -> Self {
        Self {
            universe: Ok(bases.iter().map(|b| Symbol::from_base(b)).collect()),
            candles: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Universe fetch always fails with `msg`.
    pub fn failing_universe(msg: &str) -> Self {
        Self {
            universe: Err(msg.to_string()),
            candles: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Serve `series` for `symbol`. Symbols without a series are absent.
    pub fn candles(mut self, symbol: &str, series: CandleSeries) -> Self {
        self.candles.insert(symbol.to_string(), series);
        self
    }

    /// Handle to the recorded candle calls.
    pub fn calls(&self) -> Arc<Mutex<Vec<(String, String, u32)>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl MarketData for MockMarket {
    async fn fetch_universe(&self) -> Result<Vec<Symbol>> {
        self.universe.clone().map_err(|e| anyhow!(e))
    }

    async fn fetch_candles(
        &self,
        symbol: &Symbol,
        interval: &str,
        limit: u32,
    ) -> Option<CandleSeries> {
        self.calls
            .lock()
            .unwrap()
            .push((symbol.to_string(), interval.to_string(), limit));
        self.candles.get(symbol.as_str()).cloned()
    }
}

/// Records every message; optionally fails delivery.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<String>>>,
    fail_with: Option<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(msg.to_string()),
        }
    }

    pub fn sent(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.sent)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        match &self.fail_with {
            Some(msg) => Err(anyhow!(msg.clone())),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

// -- Candle fixtures ------------------------------------------------------

/// `n` candles with a true range of 1.0 each.
pub fn calm_candles(n: usize) -> Vec<Candle> {
    vec![Candle::new(100.0, 101.0, 100.0, 100.5); n]
}

/// Nine calm candles followed by a wide bullish bar.
pub fn breakout_series() -> CandleSeries {
    let mut candles = calm_candles(9);
    candles.push(Candle::new(100.0, 110.0, 100.0, 109.0));
    CandleSeries::new(candles)
}

/// A long quiet series whose last bar is ordinary.
pub fn quiet_series() -> CandleSeries {
    CandleSeries::new(calm_candles(100))
}

/// Ten identical flat candles.
pub fn flat_series() -> CandleSeries {
    CandleSeries::new(vec![Candle::new(100.0, 100.0, 100.0, 100.0); 10])
}
