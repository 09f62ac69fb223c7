//! Average True Range.
//!
//! Wilder smoothing seeded with the simple mean of the first `window`
//! true ranges. The first bar's true range is its high-low range since
//! it has no previous close.

use crate::types::CandleSeries;

/// True range for every candle in the series, aligned by index.
pub fn true_ranges(series: &CandleSeries) -> Vec<f64> {
    let candles = series.candles();
    candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let prev_close = i.checked_sub(1).map(|p| candles[p].close);
            c.true_range(prev_close)
        })
        .collect()
}

/// Rolling ATR aligned with the input series.
///
/// Entries before index `window - 1` are `None`. At `window - 1` the value
/// is the mean of the first `window` true ranges; after that
/// `atr[i] = (atr[i-1] * (window - 1) + tr[i]) / window`.
pub fn average_true_range(series: &CandleSeries, window: usize) -> Vec<Option<f64>> {
    let n = series.len();
    let mut out = vec![None; n];
    if window == 0 || n < window {
        return out;
    }

    let tr = true_ranges(series);
    let w = window as f64;

    let mut atr = tr[..window].iter().sum::<f64>() / w;
    out[window - 1] = Some(atr);

    for i in window..n {
        atr = (atr * (w - 1.0) + tr[i]) / w;
        out[i] = Some(atr);
    }

    out
}
