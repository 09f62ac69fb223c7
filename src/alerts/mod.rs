//! Outbound alerts.
//!
//! Defines the `Notifier` trait and the human-readable scan summary.
//! Delivery is best-effort: callers log failures and carry on.

pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::ScanReport;

/// Message sent when a scan finds nothing.
pub const NO_MATCHES_MESSAGE: &str = "✅ Screener run completed: no matches found.";

/// Abstraction over messaging endpoints.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `text` to the configured destination.
    async fn notify(&self, text: &str) -> Result<()>;

    /// Channel name for logging.
    fn name(&self) -> &'static str;
}

/// Build the alert text for a finished scan.
///
/// Matches produce a header naming the candle interval followed by one
/// symbol per line.
pub fn format_summary(report: &ScanReport) -> String {
    if !report.has_matches() {
        return NO_MATCHES_MESSAGE.to_string();
    }

    let mut msg = format!("🚨 *Crypto Screener Matches ({})*", report.interval);
    for symbol in &report.matches {
        msg.push('\n');
        msg.push_str(symbol.as_str());
    }
    msg
}
