use std::sync::Arc;
use std::time::Duration;

use crypto_screener::alerts::NO_MATCHES_MESSAGE;
use crypto_screener::engine::scanner::{ScanSettings, Scanner};
use crypto_screener::engine::screener::Screener;
use crypto_screener::strategy::evaluate;
use crypto_screener::types::{ScanPhase, ScreenerError, Symbol};

use crate::mock_market::*;

fn settings() -> ScanSettings {
    ScanSettings {
        pacing: Duration::ZERO,
        ..ScanSettings::default()
    }
}

#[test]
fn test_reference_candle_scenarios() {
    // Flat candles: zero ATR and zero range
    assert!(!evaluate(Some(&flat_series())));
    // Calm history then a 10-point bullish bar
    assert!(evaluate(Some(&breakout_series())));
    assert!(!evaluate(Some(&quiet_series())));
    assert!(!evaluate(None));
}

#[tokio::test]
async fn test_universe_failure_aborts_without_notifying() {
    let market = MockMarket::failing_universe("CoinGecko API error 500");
    let calls = market.calls();
    let notifier = RecordingNotifier::new();
    let sent = notifier.sent();

    let screener = Screener::new(Scanner::new(Arc::new(market), settings()), Arc::new(notifier));
    let err = screener.run().await.unwrap_err();

    assert!(matches!(err, ScreenerError::Universe(_)));
    assert!(calls.lock().unwrap().is_empty());
    assert!(sent.lock().unwrap().is_empty());
    assert_eq!(screener.scanner().phase(), ScanPhase::Done);
}

#[tokio::test]
async fn test_absent_and_non_matching_symbols_send_no_matches() {
    // Three symbols: two absent, one fetched but quiet
    let market = MockMarket::with_universe(&["btc", "eth", "sol"]).candles("ETHUSDT", quiet_series());
    let notifier = RecordingNotifier::new();
    let sent = notifier.sent();

    let screener = Screener::new(Scanner::new(Arc::new(market), settings()), Arc::new(notifier));
    let run = screener.run().await.unwrap();

    assert!(run.report.matches.is_empty());
    assert_eq!(run.report.absent, 2);
    assert_eq!(run.report.symbols_scanned, 3);
    assert_eq!(*sent.lock().unwrap(), vec![NO_MATCHES_MESSAGE.to_string()]);
    assert!(run.warning.is_none());
}

#[tokio::test]
async fn test_one_candle_fetch_per_symbol_in_universe_order() {
    let bases = ["btc", "eth", "usdt", "bnb", "sol", "xrp"];
    let market = MockMarket::with_universe(&bases);
    let calls = market.calls();

    let scanner = Scanner::new(Arc::new(market), settings());
    scanner.run().await.unwrap();

    let calls = calls.lock().unwrap();
    let fetched: Vec<&str> = calls.iter().map(|(s, _, _)| s.as_str()).collect();
    let expected: Vec<String> = bases.iter().map(|b| Symbol::from_base(b).to_string()).collect();
    assert_eq!(fetched, expected);
    assert!(calls.iter().all(|(_, interval, limit)| interval == "15m" && *limit == 100));
}

#[tokio::test]
async fn test_matches_reported_and_sent() {
    let market = MockMarket::with_universe(&["btc", "eth", "sol", "doge"])
        .candles("BTCUSDT", quiet_series())
        .candles("ETHUSDT", breakout_series())
        .candles("SOLUSDT", flat_series())
        .candles("DOGEUSDT", breakout_series());
    let notifier = RecordingNotifier::new();
    let sent = notifier.sent();

    let screener = Screener::new(Scanner::new(Arc::new(market), settings()), Arc::new(notifier));
    let run = screener.run().await.unwrap();

    assert_eq!(
        run.report.matches,
        vec![Symbol::from_base("eth"), Symbol::from_base("doge")]
    );
    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0],
        "🚨 *Crypto Screener Matches (15m)*\nETHUSDT\nDOGEUSDT"
    );
}

#[tokio::test]
async fn test_notification_failure_keeps_result() {
    let market = MockMarket::with_universe(&["btc"]).candles("BTCUSDT", breakout_series());
    let notifier = RecordingNotifier::failing("Telegram API error 400: chat not found");

    let screener = Screener::new(Scanner::new(Arc::new(market), settings()), Arc::new(notifier));
    let run = screener.run().await.unwrap();

    assert_eq!(run.report.matches, vec![Symbol::from_base("btc")]);
    assert!(run.warning.unwrap().contains("chat not found"));
}

#[tokio::test]
async fn test_scans_are_independent() {
    let market = MockMarket::with_universe(&["btc", "eth"]).candles("BTCUSDT", breakout_series());
    let calls = market.calls();
    let scanner = Scanner::new(Arc::new(market), settings());

    let first = scanner.run().await.unwrap();
    let second = scanner.run().await.unwrap();

    assert_eq!(first.matches, second.matches);
    assert_ne!(first.scan_id, second.scan_id);
    assert_eq!(calls.lock().unwrap().len(), 4);
}

#[test]
fn test_blocking_trigger_runs_to_completion() {
    let market = MockMarket::with_universe(&["btc", "eth"]).candles("ETHUSDT", breakout_series());
    let scanner = Scanner::new(
        Arc::new(market),
        ScanSettings {
            pacing: Duration::from_millis(5),
            ..ScanSettings::default()
        },
    );

    let report = tokio_test::block_on(scanner.run()).unwrap();
    assert_eq!(report.matches, vec![Symbol::from_base("eth")]);
    assert_eq!(report.absent, 1);
}
