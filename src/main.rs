//! Crypto Screener
//!
//! Entry point. Loads configuration and secrets, initialises structured
//! logging, then either serves the dashboard (scans run on request) or
//! performs scans directly from the command line.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crypto_screener::alerts::telegram::TelegramNotifier;
use crypto_screener::config::AppConfig;
use crypto_screener::dashboard::{self, routes::DashboardState};
use crypto_screener::engine::scanner::{ScanSettings, Scanner};
use crypto_screener::engine::screener::{ScreenRun, Screener};
use crypto_screener::market::MarketDataClient;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path =
        std::env::var("SCREENER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = AppConfig::load_or_default(&config_path)?;

    info!(
        universe = cfg.scanner.universe_size,
        interval = %cfg.scanner.interval,
        candles = cfg.scanner.candle_limit,
        pacing_ms = cfg.scanner.pacing_ms,
        "Crypto screener starting up"
    );

    // Missing Telegram credentials stop us here, before any scan.
    let secrets = cfg.alerts.resolve_secrets()?;
    let notifier = TelegramNotifier::new(secrets, &cfg.alerts.telegram_base_url)?;

    let market = MarketDataClient::from_config(&cfg.market_data, cfg.scanner.universe_size)?;
    let scanner = Scanner::new(Arc::new(market), ScanSettings::from(&cfg.scanner));
    let screener = Screener::new(scanner, Arc::new(notifier));

    if cfg.dashboard.enabled {
        let state = Arc::new(DashboardState::new(screener));
        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received.");
        };
        dashboard::serve(state, cfg.dashboard.port, shutdown).await?;
    } else if cfg.scanner.repeat_every_secs > 0 {
        run_repeating(&screener, Duration::from_secs(cfg.scanner.repeat_every_secs)).await;
    } else {
        let run = screener.run().await?;
        print_run(&run);
    }

    info!("Crypto screener shut down cleanly.");
    Ok(())
}

/// Scan on a fixed period until Ctrl+C. Failed scans are logged and the
/// next tick proceeds as normal.
async fn run_repeating(screener: &Screener, period: Duration) {
    let mut interval = repeat_interval(period);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        period_secs = period.as_secs(),
        "Entering scan loop. Press Ctrl+C to stop."
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match screener.run().await {
                    Ok(run) => print_run(&run),
                    Err(e) => error!(error = %e, "Scan failed, waiting for next tick"),
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }
}

/// Scan ticker. A scan that overruns the period pushes the next tick a
/// full period past its end instead of firing the missed ticks at once.
fn repeat_interval(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Human-readable scan outcome on stdout.
fn print_run(run: &ScreenRun) {
    let report = &run.report;
    if report.has_matches() {
        println!("✅ Found {} matches!", report.matches.len());
        println!("Matching Symbol");
        for symbol in &report.matches {
            println!("  {symbol}");
        }
    } else {
        println!("No matches found.");
    }

    if let Some(warning) = &run.warning {
        warn!(%warning, "Notification warning");
        eprintln!("⚠️  {warning}");
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("crypto_screener=info"));

    let json_logging = std::env::var("SCREENER_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
