//! Scan-then-notify pipeline.
//!
//! Runs a scan and hands its summary to the notifier. A failed
//! delivery is reported back as a warning and never changes the result.

use std::sync::Arc;
use tracing::{info, warn};

use super::scanner::Scanner;
use crate::alerts::{format_summary, Notifier};
use crate::types::{ScanReport, ScreenerError};

/// A completed scan plus the outcome of its notification.
#[derive(Debug, Clone)]
pub struct ScreenRun {
    pub report: ScanReport,
    /// Set when the summary could not be delivered.
    pub warning: Option<String>,
}

pub struct Screener {
    scanner: Scanner,
    notifier: Arc<dyn Notifier>,
}

impl Screener {
    pub fn new(scanner: Scanner, notifier: Arc<dyn Notifier>) -> Self {
        Self { scanner, notifier }
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    /// Scan, then notify.
    ///
    /// A fatal scan error is returned as-is and nothing is sent.
    pub async fn run(&self) -> Result<ScreenRun, ScreenerError> {
        let report = self.scanner.run().await?;
        let text = format_summary(&report);

        let warning = match self.notifier.notify(&text).await {
            Ok(()) => {
                info!(
                    channel = self.notifier.name(),
                    matches = report.matches.len(),
                    "Scan summary sent"
                );
                None
            }
            Err(e) => {
                let err = ScreenerError::Notification(format!("{e:#}"));
                warn!(channel = self.notifier.name(), error = %err, "Scan summary not delivered");
                Some(err.to_string())
            }
        };

        Ok(ScreenRun { report, warning })
    }
}
