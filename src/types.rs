//! Shared types for the screener.
//!
//! Candles, symbols and scan reports flow from the market data clients
//! through the breakout predicate to the notifier and dashboard. None of
//! these outlive a single scan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Quote currency appended to every base asset code.
pub const QUOTE_SUFFIX: &str = "USDT";

// ---------------------------------------------------------------------------
// Candles
// ---------------------------------------------------------------------------

/// One fixed-duration OHLC price bar.
///
/// `high >= max(open, close)` and `low <= min(open, close)` are assumed
/// from upstream and not checked here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self { open, high, low, close }
    }

    /// High minus low.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Absolute distance between open and close.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// True range against the previous bar's close.
    /// Without a previous close this is just the high-low range.
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        let hl = self.range();
        match prev_close {
            Some(pc) => hl.max((self.high - pc).abs()).max((self.low - pc).abs()),
            None => hl,
        }
    }
}

/// Candles for one symbol, oldest first. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries(Vec<Candle>);

impl CandleSeries {
    pub fn new(candles: Vec<Candle>) -> Self {
        Self(candles)
    }

    pub fn candles(&self) -> &[Candle] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The most recent candle.
    pub fn last(&self) -> Option<&Candle> {
        self.0.last()
    }
}

impl From<Vec<Candle>> for CandleSeries {
    fn from(candles: Vec<Candle>) -> Self {
        Self(candles)
    }
}

// ---------------------------------------------------------------------------
// Symbol
// ---------------------------------------------------------------------------

/// A trading-pair ticker such as `BTCUSDT`. Treated as an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Build a pair symbol from a base asset code: `"btc"` becomes `"BTCUSDT"`.
    pub fn from_base(base: &str) -> Self {
        Self(format!("{}{QUOTE_SUFFIX}", base.trim().to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ---------------------------------------------------------------------------
// Scan state and results
// ---------------------------------------------------------------------------

/// Lifecycle of a scan. `Done` is terminal until the next trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ScanPhase {
    #[default]
    Idle,
    Scanning,
    Done,
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanPhase::Idle => write!(f, "IDLE"),
            ScanPhase::Scanning => write!(f, "SCANNING"),
            ScanPhase::Done => write!(f, "DONE"),
        }
    }
}

/// Outcome of one completed scan pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Candle interval the scan was run at, e.g. `"15m"`.
    pub interval: String,
    /// Number of symbols in the universe.
    pub symbols_scanned: usize,
    /// Candle fetches that failed and were skipped.
    pub absent: usize,
    /// Symbols whose latest candle qualified, in universe order.
    pub matches: Vec<Symbol>,
}

impl ScanReport {
    pub fn has_matches(&self) -> bool {
        !self.matches.is_empty()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scan {}: scanned={} absent={} matches={} ({})",
            self.scan_id,
            self.symbols_scanned,
            self.absent,
            self.matches.len(),
            self.interval,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for the screener.
#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    #[error("Universe fetch failed: {0}")]
    Universe(String),

    #[error("A scan is already in progress")]
    ScanInProgress,

    #[error("Market data error ({source_name}): {message}")]
    MarketData { source_name: String, message: String },

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
