//! In-memory fakes and candle fixtures shared by the scanner tests.

use async_trait::async_trait;
use confluence_core::error::{DataError, NotifyError};
use confluence_core::traits::{MarketDataSource, Notifier};
use confluence_core::types::{Bar, CandleSeries, Subscriber, Symbol, Timeframe};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::ScanControl;

const HOUR_MS: i64 = 3_600_000;

pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::new(i as i64 * HOUR_MS, c, c + 1.0, c - 1.0, c, 1000.0))
        .collect()
}

/// Steady climb, a one-bar pullback, then a strong recovery bar.
/// Evaluates to an up signal.
pub fn breakout() -> Vec<Bar> {
    let mut closes: Vec<f64> = (0..298).map(|i| 100.0 + i as f64 * 0.5).collect();
    closes.push(closes[297] - 1.0);
    closes.push(closes[298] + 6.0);
    bars_from_closes(&closes)
}

/// Mirror image of [`breakout`]. Evaluates to a down signal.
pub fn breakdown() -> Vec<Bar> {
    let mut closes: Vec<f64> = (0..298).map(|i| 400.0 - i as f64 * 0.5).collect();
    closes.push(closes[297] + 1.0);
    closes.push(closes[298] - 6.0);
    bars_from_closes(&closes)
}

/// Downtrend whose last bar jumps up: the histogram turns positive but the
/// trend still points down, so neither direction fires.
pub fn mixed() -> Vec<Bar> {
    let mut closes: Vec<f64> = (0..298).map(|i| 400.0 - i as f64 * 0.5).collect();
    closes.push(closes[297] + 1.0);
    closes.push(closes[298] + 6.0);
    bars_from_closes(&closes)
}

pub fn short(len: usize) -> Vec<Bar> {
    let closes: Vec<f64> = (0..len).map(|i| 100.0 + i as f64).collect();
    bars_from_closes(&closes)
}

/// Serves fixed bars per symbol and records every fetch.
#[derive(Default)]
pub struct FakeSource {
    bars: HashMap<Symbol, Vec<Bar>>,
    listed: Vec<Symbol>,
    fetched: Mutex<Vec<Symbol>>,
    stop_on: Mutex<Option<(Symbol, ScanControl)>>,
    delay: Option<Duration>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.bars.insert(Symbol::from(symbol), bars);
        self
    }

    pub fn listing(mut self, symbols: &[&str]) -> Self {
        self.listed = symbols.iter().copied().map(Symbol::from).collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Request a stop while `symbol` is being fetched.
    pub fn stop_during(&self, symbol: &str, control: ScanControl) {
        *self.stop_on.lock().unwrap() = Some((Symbol::from(symbol), control));
    }

    pub fn fetched(&self) -> Vec<Symbol> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataSource for FakeSource {
    async fn fetch_candles(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<CandleSeries, DataError> {
        self.fetched.lock().unwrap().push(symbol.clone());

        let stop = self
            .stop_on
            .lock()
            .unwrap()
            .as_ref()
            .filter(|(target, _)| target == symbol)
            .map(|(_, control)| control.clone());
        if let Some(control) = stop {
            control.request_stop();
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let bars = self
            .bars
            .get(symbol)
            .cloned()
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))?;
        let mut series = CandleSeries::new(symbol.clone(), timeframe, bars)?;
        series.truncate_to_latest(limit);
        Ok(series)
    }

    async fn list_tradable_symbols(&self) -> Result<Vec<Symbol>, DataError> {
        Ok(self.listed.clone())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Records every send and fails the ones addressed to `failing`.
#[derive(Default)]
pub struct FlakyNotifier {
    failing: Vec<Subscriber>,
    attempts: Mutex<Vec<(String, String)>>,
}

impl FlakyNotifier {
    pub fn failing_for(ids: &[&str]) -> Self {
        Self {
            failing: ids.iter().copied().map(Subscriber::from).collect(),
            ..Default::default()
        }
    }

    pub fn attempts(&self) -> Vec<(String, String)> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for FlakyNotifier {
    async fn send_notification(&self, subscriber: &Subscriber, text: &str) -> Result<(), NotifyError> {
        self.attempts
            .lock()
            .unwrap()
            .push((subscriber.to_string(), text.to_string()));
        if self.failing.contains(subscriber) {
            return Err(NotifyError::Blocked("bot was blocked by the user".into()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "flaky"
    }
}
