//! The polling loop and its control surface.

use confluence_core::error::StartupError;
use confluence_core::types::{Direction, Symbol};
use confluence_notify::Dispatcher;
use confluence_strategy::evaluate;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::pipeline::IndicatorPipeline;

/// Loop timing and filtering.
#[derive(Debug, Clone)]
pub struct ScannerSettings {
    /// Pause between full passes over the universe.
    pub cycle_delay: Duration,
    /// Pause between two symbols. Zero disables it.
    pub symbol_pause: Duration,
    /// Symbols that are never fetched or evaluated.
    pub exclusions: Vec<Symbol>,
    /// Stop after this many passes. `None` runs until stopped.
    pub max_cycles: Option<u64>,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            cycle_delay: Duration::from_secs(30),
            symbol_pause: Duration::ZERO,
            exclusions: vec![Symbol::from("USDCUSDT")],
            max_cycles: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScannerStatus {
    Running,
    /// A stop was requested; the current symbol is finishing.
    Stopping,
    Stopped,
}

impl std::fmt::Display for ScannerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ScannerStatus::Running => "running",
            ScannerStatus::Stopping => "stopping",
            ScannerStatus::Stopped => "stopped",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Default)]
struct ControlState {
    running: AtomicBool,
    stop: AtomicBool,
    cycles_completed: AtomicU64,
    wake: Notify,
}

/// Cloneable handle for stopping and observing a scanner.
#[derive(Debug, Clone, Default)]
pub struct ScanControl {
    state: Arc<ControlState>,
}

impl ScanControl {
    /// Ask the loop to stop. Idempotent. Cuts any pending pause short.
    pub fn request_stop(&self) {
        self.state.stop.store(true, Ordering::SeqCst);
        self.state.wake.notify_one();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.state.stop.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> ScannerStatus {
        if !self.state.running.load(Ordering::SeqCst) {
            ScannerStatus::Stopped
        } else if self.is_stop_requested() {
            ScannerStatus::Stopping
        } else {
            ScannerStatus::Running
        }
    }

    /// Passes finished since the control was created, across runs.
    pub fn cycles_completed(&self) -> u64 {
        self.state.cycles_completed.load(Ordering::SeqCst)
    }

    /// Claim the running state and clear any previous stop request.
    fn try_begin(&self) -> Option<RunGuard> {
        self.state
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        self.state.stop.store(false, Ordering::SeqCst);
        Some(RunGuard {
            control: self.clone(),
        })
    }

    /// Sleep for `duration` unless a stop arrives first.
    /// Returns `true` when the sleep was cut short by a stop.
    async fn pause(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_stop_requested() {
                return true;
            }
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => return self.is_stop_requested(),
                // a stale permit from an earlier stop only causes a recheck
                _ = self.state.wake.notified() => {}
            }
        }
    }
}

/// Resets the running flag when a run ends, however it ends.
struct RunGuard {
    control: ScanControl,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.control.state.running.store(false, Ordering::SeqCst);
    }
}

/// Outcome of one pass over the universe.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleReport {
    pub evaluated: usize,
    pub excluded: usize,
    pub failed: usize,
    pub signals: Vec<(Symbol, Direction)>,
    pub delivered: usize,
    pub failed_deliveries: usize,
    /// The pass ended early on a stop request.
    pub interrupted: bool,
}

impl CycleReport {
    pub fn count(&self, direction: Direction) -> usize {
        self.signals.iter().filter(|(_, d)| *d == direction).count()
    }
}

/// Totals over a whole run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanSummary {
    pub cycles: u64,
    pub evaluated: usize,
    pub failed: usize,
    pub signals: usize,
    pub delivered: usize,
    pub failed_deliveries: usize,
}

impl ScanSummary {
    fn absorb(&mut self, report: &CycleReport) {
        self.cycles += 1;
        self.evaluated += report.evaluated;
        self.failed += report.failed;
        self.signals += report.signals.len();
        self.delivered += report.delivered;
        self.failed_deliveries += report.failed_deliveries;
    }
}

struct ScannerInner {
    pipeline: IndicatorPipeline,
    dispatcher: Dispatcher,
    universe: Vec<Symbol>,
    settings: ScannerSettings,
}

/// Runs fetch, evaluate and notify for every symbol, pass after pass.
///
/// Work is strictly sequential: one symbol at a time, one subscriber at a
/// time. A stop request is honoured between symbols and during pauses; the
/// symbol in flight always completes.
#[derive(Clone)]
pub struct Scanner {
    inner: Arc<ScannerInner>,
    control: ScanControl,
}

impl Scanner {
    pub fn new(
        pipeline: IndicatorPipeline,
        dispatcher: Dispatcher,
        universe: Vec<Symbol>,
        settings: ScannerSettings,
    ) -> Result<Self, StartupError> {
        if universe.is_empty() {
            return Err(StartupError::EmptyUniverse);
        }
        if dispatcher.subscribers().is_empty() {
            return Err(StartupError::NoSubscribers);
        }

        Ok(Self {
            inner: Arc::new(ScannerInner {
                pipeline,
                dispatcher,
                universe,
                settings,
            }),
            control: ScanControl::default(),
        })
    }

    pub fn control(&self) -> ScanControl {
        self.control.clone()
    }

    pub fn status(&self) -> ScannerStatus {
        self.control.status()
    }

    pub fn request_stop(&self) {
        self.control.request_stop();
    }

    pub fn universe(&self) -> &[Symbol] {
        &self.inner.universe
    }

    /// Spawn the loop on the runtime. Returns `None` if a run is active.
    pub fn start(&self) -> Option<JoinHandle<ScanSummary>> {
        let guard = self.control.try_begin()?;
        let scanner = self.clone();
        Some(tokio::spawn(async move { scanner.run_loop(guard).await }))
    }

    /// Run the loop on the current task. Returns `None` if a run is active.
    pub async fn run(&self) -> Option<ScanSummary> {
        let guard = self.control.try_begin()?;
        Some(self.run_loop(guard).await)
    }

    async fn run_loop(&self, _guard: RunGuard) -> ScanSummary {
        let settings = &self.inner.settings;
        info!(
            symbols = self.inner.universe.len(),
            subscribers = self.inner.dispatcher.subscribers().len(),
            source = self.inner.pipeline.source_name(),
            notifier = self.inner.dispatcher.notifier_name(),
            "Scanner started"
        );

        let mut summary = ScanSummary::default();
        loop {
            let report = self.run_cycle().await;
            summary.absorb(&report);
            self.control.state.cycles_completed.fetch_add(1, Ordering::SeqCst);
            info!(
                cycle = summary.cycles,
                evaluated = report.evaluated,
                excluded = report.excluded,
                failed = report.failed,
                up = report.count(Direction::Up),
                down = report.count(Direction::Down),
                delivered = report.delivered,
                failed_deliveries = report.failed_deliveries,
                interrupted = report.interrupted,
                "Cycle complete"
            );

            if report.interrupted || self.control.is_stop_requested() {
                break;
            }
            if settings.max_cycles.is_some_and(|max| summary.cycles >= max) {
                break;
            }
            debug!(delay_secs = settings.cycle_delay.as_secs(), "Waiting for next cycle");
            if self.control.pause(settings.cycle_delay).await {
                break;
            }
        }

        info!(
            cycles = summary.cycles,
            signals = summary.signals,
            delivered = summary.delivered,
            "Scanner stopped"
        );
        summary
    }

    /// One pass over the universe, in order.
    pub async fn run_cycle(&self) -> CycleReport {
        let settings = &self.inner.settings;
        let mut report = CycleReport::default();

        let mut processed_any = false;
        for symbol in &self.inner.universe {
            if self.control.is_stop_requested() {
                report.interrupted = true;
                break;
            }
            if settings.exclusions.contains(symbol) {
                report.excluded += 1;
                continue;
            }

            if processed_any
                && !settings.symbol_pause.is_zero()
                && self.control.pause(settings.symbol_pause).await
            {
                report.interrupted = true;
                break;
            }
            self.process_symbol(symbol, &mut report).await;
            processed_any = true;
        }

        report
    }

    async fn process_symbol(&self, symbol: &Symbol, report: &mut CycleReport) {
        let snapshot = match self.inner.pipeline.snapshot(symbol).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Skipping symbol");
                report.failed += 1;
                return;
            }
        };
        report.evaluated += 1;

        let signal = evaluate(&snapshot);
        debug!(symbol = %symbol, signal = %signal, rsi = snapshot.rsi_latest, "Symbol evaluated");

        if let Some(direction) = signal.direction() {
            report.signals.push((symbol.clone(), direction));
            let dispatch = self.inner.dispatcher.dispatch(symbol, signal).await;
            report.delivered += dispatch.delivered;
            report.failed_deliveries += dispatch.failures.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineSettings;
    use crate::testing::{bars_from_closes, breakdown, breakout, mixed, short, FakeSource, FlakyNotifier};
    use confluence_core::traits::Notifier;
    use confluence_core::types::{Subscriber, SubscriberSet};
    use confluence_notify::DryRunNotifier;

    struct Harness {
        scanner: Scanner,
        source: Arc<FakeSource>,
        notifier: Arc<DryRunNotifier>,
    }

    fn harness(source: FakeSource, universe: &[&str], settings: ScannerSettings) -> Harness {
        let source = Arc::new(source);
        let notifier = Arc::new(DryRunNotifier::new());
        let scanner = build(source.clone(), notifier.clone(), &["111", "222"], universe, settings);

        Harness {
            scanner,
            source,
            notifier,
        }
    }

    fn build(
        source: Arc<FakeSource>,
        notifier: Arc<dyn Notifier>,
        subscribers: &[&str],
        universe: &[&str],
        settings: ScannerSettings,
    ) -> Scanner {
        let pipeline = IndicatorPipeline::new(source, PipelineSettings::default()).unwrap();
        let subscribers: SubscriberSet = subscribers.iter().copied().map(Subscriber::from).collect();
        let dispatcher = Dispatcher::new(notifier, subscribers);
        let universe = universe.iter().copied().map(Symbol::from).collect();
        Scanner::new(pipeline, dispatcher, universe, settings).unwrap()
    }

    fn one_cycle() -> ScannerSettings {
        ScannerSettings {
            cycle_delay: Duration::ZERO,
            max_cycles: Some(1),
            ..Default::default()
        }
    }

    fn fetched(h: &Harness) -> Vec<String> {
        h.source.fetched().iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_buy_signal_reaches_every_subscriber() {
        let h = harness(
            FakeSource::new().with("BTCUSDT", breakout()).with("ETHUSDT", mixed()),
            &["BTCUSDT", "ETHUSDT"],
            one_cycle(),
        );

        let summary = h.scanner.run().await.unwrap();

        assert_eq!(summary.cycles, 1);
        assert_eq!(summary.evaluated, 2);
        assert_eq!(summary.signals, 1);
        assert_eq!(summary.delivered, 2);
        assert_eq!(
            h.notifier.sent(),
            vec![
                (Subscriber::from("111"), "Found BUY signal for BTCUSDT".to_string()),
                (Subscriber::from("222"), "Found BUY signal for BTCUSDT".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_sell_signal() {
        let h = harness(FakeSource::new().with("XRPUSDT", breakdown()), &["XRPUSDT"], one_cycle());

        let report = h.scanner.run_cycle().await;

        assert_eq!(report.signals, vec![(Symbol::from("XRPUSDT"), Direction::Down)]);
        assert_eq!(report.count(Direction::Down), 1);
        assert_eq!(h.notifier.sent()[0].1, "Found SELL signal for XRPUSDT");
    }

    #[tokio::test]
    async fn test_short_history_is_skipped_and_loop_continues() {
        let h = harness(
            FakeSource::new().with("NEWUSDT", short(150)).with("BTCUSDT", breakout()),
            &["NEWUSDT", "BTCUSDT"],
            one_cycle(),
        );

        let report = h.scanner.run_cycle().await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.evaluated, 1);
        assert_eq!(report.signals, vec![(Symbol::from("BTCUSDT"), Direction::Up)]);
        assert_eq!(fetched(&h), vec!["NEWUSDT", "BTCUSDT"]);
        assert!(h.notifier.sent().iter().all(|(_, text)| !text.contains("NEWUSDT")));
    }

    #[tokio::test]
    async fn test_indicator_failure_is_skipped_and_loop_continues() {
        let h = harness(
            FakeSource::new()
                .with("FLATUSDT", bars_from_closes(&[5.0; 300]))
                .with("BTCUSDT", breakout()),
            &["FLATUSDT", "BTCUSDT"],
            one_cycle(),
        );

        let report = h.scanner.run_cycle().await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.evaluated, 1);
        assert_eq!(report.signals, vec![(Symbol::from("BTCUSDT"), Direction::Up)]);
        assert_eq!(fetched(&h), vec!["FLATUSDT", "BTCUSDT"]);
        assert_eq!(h.notifier.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_abort_the_cycle() {
        let source = Arc::new(
            FakeSource::new()
                .with("BTCUSDT", breakout())
                .with("XRPUSDT", breakdown()),
        );
        let notifier = Arc::new(FlakyNotifier::failing_for(&["bad"]));
        let scanner = build(
            source.clone(),
            notifier.clone(),
            &["bad", "111"],
            &["BTCUSDT", "XRPUSDT"],
            one_cycle(),
        );

        let summary = scanner.run().await.unwrap();

        assert_eq!(
            summary,
            ScanSummary {
                cycles: 1,
                evaluated: 2,
                failed: 0,
                signals: 2,
                delivered: 2,
                failed_deliveries: 2,
            }
        );
        let buy = "Found BUY signal for BTCUSDT".to_string();
        let sell = "Found SELL signal for XRPUSDT".to_string();
        assert_eq!(
            notifier.attempts(),
            vec![
                ("bad".to_string(), buy.clone()),
                ("111".to_string(), buy),
                ("bad".to_string(), sell.clone()),
                ("111".to_string(), sell),
            ]
        );
        assert_eq!(source.fetched().len(), 2);
    }

    #[tokio::test]
    async fn test_excluded_symbol_is_never_fetched() {
        let h = harness(
            FakeSource::new()
                .with("BTCUSDT", breakout())
                .with("USDCUSDT", breakout())
                .with("ETHUSDT", mixed()),
            &["BTCUSDT", "USDCUSDT", "ETHUSDT"],
            one_cycle(),
        );

        let report = h.scanner.run_cycle().await;

        assert_eq!(report.excluded, 1);
        assert_eq!(fetched(&h), vec!["BTCUSDT", "ETHUSDT"]);
        assert!(h.notifier.sent().iter().all(|(_, text)| !text.contains("USDCUSDT")));
    }

    #[tokio::test]
    async fn test_stop_during_symbol_finishes_it_and_skips_the_rest() {
        let h = harness(
            FakeSource::new()
                .with("ETHUSDT", mixed())
                .with("BTCUSDT", breakout())
                .with("XRPUSDT", breakdown()),
            &["ETHUSDT", "BTCUSDT", "XRPUSDT"],
            ScannerSettings::default(),
        );
        h.source.stop_during("BTCUSDT", h.scanner.control());

        let summary = tokio::time::timeout(Duration::from_secs(5), h.scanner.run())
            .await
            .expect("scanner did not stop")
            .unwrap();

        assert_eq!(fetched(&h), vec!["ETHUSDT", "BTCUSDT"]);
        // the in-flight symbol still completes and notifies
        assert_eq!(summary.signals, 1);
        assert_eq!(h.notifier.sent().len(), 2);
        assert_eq!(h.scanner.status(), ScannerStatus::Stopped);
    }

    #[tokio::test]
    async fn test_stop_during_cycle_delay_returns_promptly() {
        let settings = ScannerSettings {
            cycle_delay: Duration::from_secs(3600),
            ..Default::default()
        };
        let h = harness(FakeSource::new().with("BTCUSDT", breakout()), &["BTCUSDT"], settings);
        let control = h.scanner.control();

        let handle = h.scanner.start().unwrap();
        while control.cycles_completed() < 1 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(control.status(), ScannerStatus::Running);

        control.request_stop();
        let summary = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sleep was not interrupted")
            .unwrap();

        assert_eq!(summary.cycles, 1);
        assert_eq!(control.status(), ScannerStatus::Stopped);
    }

    #[tokio::test]
    async fn test_stop_during_symbol_pause_returns_promptly() {
        let settings = ScannerSettings {
            symbol_pause: Duration::from_secs(3600),
            ..one_cycle()
        };
        let h = harness(
            FakeSource::new().with("BTCUSDT", breakout()).with("ETHUSDT", mixed()),
            &["BTCUSDT", "ETHUSDT"],
            settings,
        );
        let control = h.scanner.control();

        let handle = h.scanner.start().unwrap();
        while h.notifier.sent().len() < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(control.status(), ScannerStatus::Running);

        control.request_stop();
        let summary = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("pause was not interrupted")
            .unwrap();

        assert_eq!(fetched(&h), vec!["BTCUSDT"]);
        assert_eq!(summary.evaluated, 1);
        assert_eq!(control.status(), ScannerStatus::Stopped);
    }

    #[tokio::test]
    async fn test_no_pause_before_first_evaluated_symbol() {
        let settings = ScannerSettings {
            symbol_pause: Duration::from_secs(3600),
            ..one_cycle()
        };
        let h = harness(
            FakeSource::new().with("BTCUSDT", breakout()),
            &["USDCUSDT", "BTCUSDT"],
            settings,
        );

        let report = tokio::time::timeout(Duration::from_secs(1), h.scanner.run_cycle())
            .await
            .expect("paused before the first evaluated symbol");

        assert_eq!(report.excluded, 1);
        assert_eq!(report.evaluated, 1);
        assert_eq!(fetched(&h), vec!["BTCUSDT"]);
    }

    #[tokio::test]
    async fn test_start_while_running_is_refused() {
        let settings = ScannerSettings {
            cycle_delay: Duration::from_secs(3600),
            ..Default::default()
        };
        let h = harness(FakeSource::new().with("BTCUSDT", breakout()), &["BTCUSDT"], settings);

        let handle = h.scanner.start().unwrap();
        assert!(h.scanner.start().is_none());
        assert!(h.scanner.run().await.is_none());

        h.scanner.request_stop();
        h.scanner.request_stop();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_scanner_restarts_after_stop() {
        let h = harness(FakeSource::new().with("BTCUSDT", breakout()), &["BTCUSDT"], one_cycle());

        let first = h.scanner.start().unwrap().await.unwrap();
        assert_eq!(h.scanner.status(), ScannerStatus::Stopped);

        h.scanner.request_stop();
        let second = h.scanner.start().unwrap().await.unwrap();

        assert_eq!(first.cycles, 1);
        assert_eq!(second.cycles, 1);
        assert_eq!(h.source.fetched().len(), 2);
        assert_eq!(h.scanner.control().cycles_completed(), 2);
    }

    #[tokio::test]
    async fn test_multiple_cycles_repeat_the_universe() {
        let settings = ScannerSettings {
            cycle_delay: Duration::ZERO,
            max_cycles: Some(3),
            ..Default::default()
        };
        let h = harness(
            FakeSource::new().with("BTCUSDT", breakout()).with("ETHUSDT", mixed()),
            &["BTCUSDT", "ETHUSDT"],
            settings,
        );

        let summary = h.scanner.run().await.unwrap();

        assert_eq!(summary.cycles, 3);
        assert_eq!(h.source.fetched().len(), 6);
        assert_eq!(h.notifier.sent().len(), 6);
    }

    #[tokio::test]
    async fn test_requires_subscribers_and_symbols() {
        let source: Arc<FakeSource> = Arc::new(FakeSource::new());
        let notifier = Arc::new(DryRunNotifier::new());

        let pipeline = IndicatorPipeline::new(source.clone(), PipelineSettings::default()).unwrap();
        let dispatcher = Dispatcher::new(notifier.clone(), SubscriberSet::default());
        assert!(matches!(
            Scanner::new(pipeline, dispatcher, vec!["BTCUSDT".into()], ScannerSettings::default()),
            Err(StartupError::NoSubscribers)
        ));

        let pipeline = IndicatorPipeline::new(source, PipelineSettings::default()).unwrap();
        let dispatcher = Dispatcher::new(notifier, ["1"].into_iter().map(Subscriber::from).collect());
        assert!(matches!(
            Scanner::new(pipeline, dispatcher, Vec::new(), ScannerSettings::default()),
            Err(StartupError::EmptyUniverse)
        ));
    }
}
