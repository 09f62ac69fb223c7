//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::screener::{ScreenRun, Screener};
use crate::types::ScreenerError;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub screener: Screener,
}

impl DashboardState {
    pub fn new(screener: Screener) -> Self {
        Self { screener }
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub phase: String,
    pub interval: String,
    pub candle_limit: u32,
    pub pacing_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanResponse {
    pub scan_id: String,
    pub started_at: String,
    pub finished_at: String,
    pub interval: String,
    pub symbols_scanned: usize,
    pub absent: usize,
    pub match_count: usize,
    pub matches: Vec<String>,
    /// One-line outcome for display.
    pub summary: String,
    /// Notification delivery problem, if any.
    pub warning: Option<String>,
}

impl From<ScreenRun> for ScanResponse {
    fn from(run: ScreenRun) -> Self {
        let r = run.report;
        let summary = if r.has_matches() {
            format!("Found {} matches!", r.matches.len())
        } else {
            "No matches found.".to_string()
        };
        Self {
            scan_id: r.scan_id.to_string(),
            started_at: r.started_at.to_rfc3339(),
            finished_at: r.finished_at.to_rfc3339(),
            interval: r.interval,
            symbols_scanned: r.symbols_scanned,
            absent: r.absent,
            match_count: r.matches.len(),
            matches: r.matches.iter().map(|s| s.to_string()).collect(),
            summary,
            warning: run.warning,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn error_status(err: &ScreenerError) -> StatusCode {
    match err {
        ScreenerError::ScanInProgress => StatusCode::CONFLICT,
        ScreenerError::Universe(_) | ScreenerError::MarketData { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let scanner = state.screener.scanner();
    let settings = scanner.settings();
    Json(StatusResponse {
        phase: scanner.phase().to_string(),
        interval: settings.interval.clone(),
        candle_limit: settings.candle_limit,
        pacing_ms: duration_ms(settings.pacing),
    })
}

/// POST /api/scan
///
/// Blocks until the scan and its notification finish.
pub async fn run_scan(
    State(state): State<AppState>,
) -> Result<Json<ScanResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.screener.run().await {
        Ok(run) => Ok(Json(run.into())),
        Err(e) => Err((
            error_status(&e),
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
