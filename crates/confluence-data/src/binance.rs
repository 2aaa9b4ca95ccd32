//! Binance USDⓈ-M futures market data over REST.

use async_trait::async_trait;
use confluence_core::error::DataError;
use confluence_core::traits::MarketDataSource;
use confluence_core::types::{Bar, CandleSeries, Symbol, Timeframe};
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Unknown-symbol error code returned by the exchange.
const INVALID_SYMBOL: i64 = -1121;

/// Maximum klines per request accepted by the exchange.
pub const MAX_KLINES: usize = 1500;

/// Binance REST configuration.
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    pub base_url: String,
    /// Sent as `X-MBX-APIKEY` when present. Market data endpoints are public.
    pub api_key: Option<String>,
    pub request_timeout: Duration,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://fapi.binance.com".to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
    msg: String,
}

/// Market data client for Binance USDⓈ-M futures.
pub struct BinanceFuturesSource {
    config: BinanceConfig,
    client: Client,
}

impl BinanceFuturesSource {
    pub fn new(config: BinanceConfig) -> Result<Self, DataError> {
        let mut headers = header::HeaderMap::new();
        if let Some(key) = &config.api_key {
            headers.insert(
                "X-MBX-APIKEY",
                header::HeaderValue::from_str(key)
                    .map_err(|e| DataError::Connection(format!("invalid API key header: {}", e)))?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DataError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> DataError {
        if err.is_timeout() {
            DataError::timeout(self.config.request_timeout)
        } else {
            DataError::Connection(err.to_string())
        }
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, DataError> {
        let resp = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &text));
        }

        resp.json()
            .await
            .map_err(|e| DataError::Parse(e.to_string()))
    }
}

#[async_trait]
impl MarketDataSource for BinanceFuturesSource {
    async fn fetch_candles(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<CandleSeries, DataError> {
        let limit = limit.min(MAX_KLINES);
        debug!(symbol = %symbol, interval = %timeframe, limit, "Fetching klines");

        let body = self
            .get_json(
                "/fapi/v1/klines",
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", timeframe.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        parse_klines(symbol, timeframe, body)
    }

    async fn list_tradable_symbols(&self) -> Result<Vec<Symbol>, DataError> {
        let body = self.get_json("/fapi/v1/ticker/price", &[]).await?;
        let tickers: Vec<TickerPrice> =
            serde_json::from_value(body).map_err(|e| DataError::Parse(e.to_string()))?;

        Ok(tickers.into_iter().map(|t| Symbol::from(t.symbol)).collect())
    }

    fn name(&self) -> &str {
        "binance-futures"
    }
}

fn api_error(status: u16, body: &str) -> DataError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(err) if err.code == INVALID_SYMBOL => DataError::SymbolNotFound(err.msg),
        Ok(err) => DataError::Api {
            status,
            message: format!("{} ({})", err.msg, err.code),
        },
        Err(_) => DataError::Api {
            status,
            message: body.to_string(),
        },
    }
}

/// Parse a kline array. Each row is
/// `[open_time, open, high, low, close, volume, close_time, ...]` with prices
/// and volume encoded as strings.
fn parse_klines(symbol: &Symbol, timeframe: Timeframe, body: Value) -> Result<CandleSeries, DataError> {
    let rows = body
        .as_array()
        .ok_or_else(|| DataError::Parse("klines response is not an array".into()))?;

    if rows.is_empty() {
        return Err(DataError::NoDataAvailable);
    }

    let bars = rows
        .iter()
        .enumerate()
        .map(|(i, row)| parse_kline_row(row).ok_or_else(|| DataError::Parse(format!("malformed kline at index {}", i))))
        .collect::<Result<Vec<Bar>, DataError>>()?;

    CandleSeries::new(symbol.clone(), timeframe, bars)
}

fn parse_kline_row(row: &Value) -> Option<Bar> {
    let fields = row.as_array()?;
    let number = |i: usize| -> Option<f64> {
        match fields.get(i)? {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    };

    Some(Bar::new(
        fields.first()?.as_i64()?,
        number(1)?,
        number(2)?,
        number(3)?,
        number(4)?,
        number(5)?,
    ))
}
