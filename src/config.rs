//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every field has a default matching the reference screener, so an absent
//! file or section is valid. Secrets (Telegram credentials) are referenced
//! by env-var name in the config and resolved once at startup.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::market::binance::MAX_KLINES;
use crate::market::coingecko::MAX_PER_PAGE;
use crate::types::ScreenerError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub scanner: ScannerConfig,
    pub market_data: MarketDataConfig,
    pub alerts: AlertsConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScannerConfig {
    /// How many top market-cap coins form the universe.
    pub universe_size: u32,
    /// Binance kline interval.
    pub interval: String,
    /// Candles requested per symbol.
    pub candle_limit: u32,
    /// Delay between successive symbol fetches.
    pub pacing_ms: u64,
    /// Re-run the scan on this period when the dashboard is disabled.
    /// Zero means a single pass.
    pub repeat_every_secs: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            universe_size: 200,
            interval: "15m".to_string(),
            candle_limit: 100,
            pacing_ms: 200,
            repeat_every_secs: 0,
        }
    }
}

impl ScannerConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MarketDataConfig {
    pub coingecko_base_url: String,
    pub binance_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            coingecko_base_url: crate::market::coingecko::DEFAULT_BASE_URL.to_string(),
            binance_base_url: crate::market::binance::DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AlertsConfig {
    pub telegram_bot_token_env: String,
    pub telegram_chat_id_env: String,
    pub telegram_base_url: String,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            telegram_bot_token_env: "TELEGRAM_BOT_TOKEN".to_string(),
            telegram_chat_id_env: "TELEGRAM_CHAT_ID".to_string(),
            telegram_base_url: crate::alerts::telegram::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8080,
        }
    }
}

/// Resolved Telegram credentials.
#[derive(Debug)]
pub struct AlertSecrets {
    pub bot_token: SecretString,
    pub chat_id: String,
}

impl AlertsConfig {
    /// Read both Telegram secrets from the environment.
    /// Either one missing or empty is a configuration error.
    pub fn resolve_secrets(&self) -> Result<AlertSecrets, ScreenerError> {
        let bot_token = AppConfig::resolve_env(&self.telegram_bot_token_env)
            .map_err(|e| ScreenerError::Config(e.to_string()))?;
        let chat_id = AppConfig::resolve_env(&self.telegram_chat_id_env)
            .map_err(|e| ScreenerError::Config(e.to_string()))?;

        Ok(AlertSecrets {
            bot_token: SecretString::new(bot_token),
            chat_id,
        })
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            info!(path, "No config file found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the upstream APIs would not honour as written.
    pub fn validate(&self) -> Result<(), ScreenerError> {
        let s = &self.scanner;
        if s.universe_size == 0 || s.universe_size > MAX_PER_PAGE {
            return Err(ScreenerError::Config(format!(
                "scanner.universe_size must be between 1 and {MAX_PER_PAGE}, got {}",
                s.universe_size
            )));
        }
        if s.candle_limit == 0 || s.candle_limit > MAX_KLINES {
            return Err(ScreenerError::Config(format!(
                "scanner.candle_limit must be between 1 and {MAX_KLINES}, got {}",
                s.candle_limit
            )));
        }
        if s.interval.trim().is_empty() {
            return Err(ScreenerError::Config("scanner.interval must not be empty".into()));
        }
        Ok(())
    }

    /// Resolve an environment variable name to its non-empty value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        let value = std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))?;
        if value.trim().is_empty() {
            anyhow::bail!("Environment variable is empty: {env_name}");
        }
        Ok(value)
    }
}
