//! Volatility breakout predicate.
//!
//! A candle qualifies when its range is large relative to recent
//! volatility and its body dominates that range, i.e. a decisive move
//! in one direction rather than a wick-heavy spike.

use tracing::trace;

use super::atr::average_true_range;
use crate::types::CandleSeries;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Series shorter than this never qualify.
pub const MIN_CANDLES: usize = 10;

/// ATR smoothing window.
pub const ATR_WINDOW: usize = 8;

/// Last candle's range must exceed this multiple of the settled ATR.
pub const RANGE_ATR_MULTIPLE: f64 = 1.5;

/// Minimum body / range ratio of the last candle.
pub const MIN_BODY_RATIO: f64 = 0.7;

// ---------------------------------------------------------------------------
// Predicate
// ---------------------------------------------------------------------------

/// Measurements taken from the last candle of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakoutMetrics {
    /// ATR at index `len - 2`, the last value not fed by the newest bar.
    pub last_atr: f64,
    pub candle_range: f64,
    pub candle_body: f64,
}

impl BreakoutMetrics {
    /// Body as a fraction of range. `None` when the range is zero.
    pub fn body_ratio(&self) -> Option<f64> {
        (self.candle_range > 0.0).then(|| self.candle_body / self.candle_range)
    }

    /// Whether the measurements satisfy both breakout thresholds.
    pub fn is_breakout(&self) -> bool {
        if !self.last_atr.is_finite() {
            return false;
        }
        let Some(ratio) = self.body_ratio() else {
            return false;
        };
        self.candle_range > RANGE_ATR_MULTIPLE * self.last_atr && ratio > MIN_BODY_RATIO
    }
}

/// Compute breakout measurements, or `None` if the series is absent or
/// too short to judge.
pub fn measure(series: Option<&CandleSeries>) -> Option<BreakoutMetrics> {
    let series = series?;
    if series.len() < MIN_CANDLES {
        return None;
    }

    let atr = average_true_range(series, ATR_WINDOW);
    let last_atr = atr[series.len() - 2]?;
    let last = series.last()?;

    Some(BreakoutMetrics {
        last_atr,
        candle_range: last.range(),
        candle_body: last.body(),
    })
}

/// Does the most recent candle of `series` qualify as a breakout?
///
/// Fails closed: absent or short series and zero-range candles return
/// `false`.
pub fn evaluate(series: Option<&CandleSeries>) -> bool {
    match measure(series) {
        Some(m) => {
            let hit = m.is_breakout();
            trace!(
                last_atr = m.last_atr,
                range = m.candle_range,
                body = m.candle_body,
                hit,
                "Breakout evaluated"
            );
            hit
        }
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
