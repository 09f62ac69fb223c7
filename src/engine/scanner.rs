//! Scan orchestrator.
//!
//! Walks the symbol universe in rank order, fetches candles for each
//! symbol, runs the breakout predicate and collects the matches. Fetches
//! are strictly sequential with a fixed pause between symbols.

use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::ScannerConfig;
use crate::market::MarketData;
use crate::strategy::breakout;
use crate::types::{ScanPhase, ScanReport, ScreenerError, Symbol};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Per-scan request parameters.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub interval: String,
    pub candle_limit: u32,
    /// Pause between successive symbol fetches.
    pub pacing: Duration,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self::from(&ScannerConfig::default())
    }
}

impl From<&ScannerConfig> for ScanSettings {
    fn from(cfg: &ScannerConfig) -> Self {
        Self {
            interval: cfg.interval.clone(),
            candle_limit: cfg.candle_limit,
            pacing: cfg.pacing(),
        }
    }
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Runs scan passes against a market data source.
///
/// Each pass is independent; the only state kept between passes is the
/// phase, which rejects a trigger that arrives while a pass is running.
pub struct Scanner {
    market: Arc<dyn MarketData>,
    settings: ScanSettings,
    phase: Mutex<ScanPhase>,
}

impl Scanner {
    pub fn new(market: Arc<dyn MarketData>, settings: ScanSettings) -> Self {
        Self {
            market,
            settings,
            phase: Mutex::new(ScanPhase::Idle),
        }
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> ScanPhase {
        *lock_phase(&self.phase)
    }

    /// Run one full scan pass.
    ///
    /// A universe fetch failure aborts the pass with no partial results.
    /// Candle fetch failures only mean "no match" for that symbol.
    /// If the returned future is dropped mid-scan the phase still ends
    /// at `Done`, so the next trigger is accepted.
    pub async fn run(&self) -> Result<ScanReport, ScreenerError> {
        let _guard = self.begin()?;
        self.scan().await
    }

    /// Idle/Done -> Scanning. Rejects overlapping triggers.
    fn begin(&self) -> Result<PhaseGuard<'_>, ScreenerError> {
        let mut phase = lock_phase(&self.phase);
        if *phase == ScanPhase::Scanning {
            return Err(ScreenerError::ScanInProgress);
        }
        *phase = ScanPhase::Scanning;
        Ok(PhaseGuard { phase: &self.phase })
    }

    async fn scan(&self) -> Result<ScanReport, ScreenerError> {
        let scan_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%scan_id, interval = %self.settings.interval, "Starting scan");

        let universe = self.market.fetch_universe().await.map_err(|e| {
            error!(%scan_id, error = %e, "Universe fetch failed, aborting scan");
            ScreenerError::Universe(format!("{e:#}"))
        })?;

        let mut matches: Vec<Symbol> = Vec::new();
        let mut absent = 0usize;

        for (i, symbol) in universe.iter().enumerate() {
            if i > 0 && !self.settings.pacing.is_zero() {
                tokio::time::sleep(self.settings.pacing).await;
            }

            let series = self
                .market
                .fetch_candles(symbol, &self.settings.interval, self.settings.candle_limit)
                .await;

            if series.is_none() {
                absent += 1;
            }

            if breakout::evaluate(series.as_ref()) {
                debug!(%scan_id, symbol = %symbol, "Breakout match");
                matches.push(symbol.clone());
            }
        }

        let report = ScanReport {
            scan_id,
            started_at,
            finished_at: Utc::now(),
            interval: self.settings.interval.clone(),
            symbols_scanned: universe.len(),
            absent,
            matches,
        };

        info!(
            %scan_id,
            scanned = report.symbols_scanned,
            absent = report.absent,
            matches = report.matches.len(),
            elapsed_ms = report.duration().num_milliseconds(),
            "Scan complete"
        );

        Ok(report)
    }
}

/// Poisoning is ignored: the phase is a plain `Copy` value.
fn lock_phase(phase: &Mutex<ScanPhase>) -> MutexGuard<'_, ScanPhase> {
    phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Moves the phase to `Done` when the scan finishes, fails or is dropped.
struct PhaseGuard<'a> {
    phase: &'a Mutex<ScanPhase>,
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        *lock_phase(self.phase) = ScanPhase::Done;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
