//! Configuration structures.

use confluence_core::error::StartupError;
use confluence_core::types::{Symbol, Timeframe};
use confluence_indicators::SnapshotParams;
use confluence_scanner::{PipelineSettings, ScannerSettings, UniverseSettings};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest kline page the exchange serves in one request.
const MAX_LIMIT: usize = 1500;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub telegram: TelegramSettings,
    #[serde(default)]
    pub scanner: ScannerConfig,
}

impl AppConfig {
    /// Check cross-field constraints the types cannot express.
    pub fn validate(&self) -> Result<(), StartupError> {
        let invalid = |msg: String| Err(StartupError::InvalidConfig(msg));

        if !["pretty", "json", "compact"].contains(&self.logging.format.as_str()) {
            return invalid(format!(
                "logging.format must be pretty, json or compact, got {:?}",
                self.logging.format
            ));
        }

        let required = SnapshotParams::default().required_bars();
        if self.scanner.limit < required {
            return invalid(format!(
                "scanner.limit is {} but the indicators need at least {} bars",
                self.scanner.limit, required
            ));
        }
        if self.scanner.limit > MAX_LIMIT {
            return invalid(format!(
                "scanner.limit is {}, the exchange serves at most {}",
                self.scanner.limit, MAX_LIMIT
            ));
        }
        if self.scanner.quote_asset.trim().is_empty() {
            return invalid("scanner.quote_asset must not be empty".into());
        }
        if self.scanner.fetch_timeout_secs == 0 {
            return invalid("scanner.fetch_timeout_secs must be greater than 0".into());
        }
        if self.exchange.request_timeout_secs == 0 {
            return invalid("exchange.request_timeout_secs must be greater than 0".into());
        }
        if self.telegram.request_timeout_secs == 0 {
            return invalid("telegram.request_timeout_secs must be greater than 0".into());
        }
        if self.telegram.subscribers.iter().all(|s| s.trim().is_empty()) {
            return Err(StartupError::NoSubscribers);
        }

        Ok(())
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "confluence".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty`, `json` or `compact`
    pub format: String,
    /// Directory for daily-rolling log files. Console only when unset.
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Exchange market data configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub base_url: String,
    /// Environment variable holding the optional API key.
    pub api_key_env: String,
    pub request_timeout_secs: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://fapi.binance.com".to_string(),
            api_key_env: "API_KEY".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl ExchangeConfig {
    /// The API key, if its variable is set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Telegram bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    pub base_url: String,
    /// Environment variable holding the bot token.
    pub token_env: String,
    pub request_timeout_secs: u64,
    /// Chat ids, in delivery order.
    pub subscribers: Vec<String>,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.telegram.org".to_string(),
            token_env: "TOKEN".to_string(),
            request_timeout_secs: 10,
            subscribers: vec!["6068927923".to_string(), "7205728757".to_string()],
        }
    }
}

impl TelegramSettings {
    pub fn token(&self) -> Result<String, StartupError> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| StartupError::MissingCredential(self.token_env.clone()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Scanner loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub timeframe: Timeframe,
    /// Candles requested per symbol.
    pub limit: usize,
    pub cycle_delay_secs: u64,
    pub symbol_pause_ms: u64,
    pub fetch_timeout_secs: u64,
    /// Listed symbols are scanned when their name contains this string.
    pub quote_asset: String,
    pub exclusions: Vec<String>,
    /// Fixed universe. When empty the exchange listing is used.
    pub symbols: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::Hour1,
            limit: 1000,
            cycle_delay_secs: 30,
            symbol_pause_ms: 0,
            fetch_timeout_secs: 30,
            quote_asset: "USDT".to_string(),
            exclusions: vec!["USDCUSDT".to_string()],
            symbols: Vec::new(),
        }
    }
}

impl ScannerConfig {
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            timeframe: self.timeframe,
            limit: self.limit,
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            params: SnapshotParams::default(),
        }
    }

    pub fn scanner_settings(&self, max_cycles: Option<u64>) -> ScannerSettings {
        ScannerSettings {
            cycle_delay: Duration::from_secs(self.cycle_delay_secs),
            symbol_pause: Duration::from_millis(self.symbol_pause_ms),
            exclusions: to_symbols(&self.exclusions),
            max_cycles,
        }
    }

    pub fn universe_settings(&self) -> UniverseSettings {
        UniverseSettings {
            quote_asset: self.quote_asset.clone(),
            symbols: to_symbols(&self.symbols),
        }
    }
}

fn to_symbols(names: &[String]) -> Vec<Symbol> {
    names
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| Symbol::from(s.to_ascii_uppercase()))
        .collect()
}
