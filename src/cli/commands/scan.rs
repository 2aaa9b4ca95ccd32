//! Scan command implementation.

use anyhow::{Context, Result};
use confluence_config::AppConfig;
use confluence_core::traits::Notifier;
use confluence_core::types::{Subscriber, SubscriberSet, Symbol};
use confluence_notify::{Dispatcher, DryRunNotifier, TelegramConfig, TelegramNotifier};
use confluence_scanner::{discover_universe, IndicatorPipeline, ScanControl, Scanner};
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

use super::build_source;
use crate::cli::ScanArgs;

pub async fn run(args: &ScanArgs, config: &AppConfig) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let notifier: Arc<dyn Notifier> = if args.dry_run {
        info!("Dry run: signals are logged, not sent");
        Arc::new(DryRunNotifier::new())
    } else {
        let token = config.telegram.token()?;
        Arc::new(TelegramNotifier::new(TelegramConfig {
            base_url: config.telegram.base_url.clone(),
            token,
            request_timeout: config.telegram.request_timeout(),
        })?)
    };

    let source = build_source(config, args.data_dir.as_deref())?;

    let mut universe_settings = config.scanner.universe_settings();
    if !args.symbols.is_empty() {
        universe_settings.symbols = args
            .symbols
            .iter()
            .map(|s| Symbol::from(s.trim().to_ascii_uppercase()))
            .collect();
    }
    let universe = discover_universe(source.as_ref(), &universe_settings).await?;

    let pipeline = IndicatorPipeline::new(source, config.scanner.pipeline_settings())
        .context("Invalid indicator settings")?;
    let subscribers: SubscriberSet = config
        .telegram
        .subscribers
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(Subscriber::from)
        .collect();
    let dispatcher = Dispatcher::new(notifier, subscribers);

    let scanner = Scanner::new(
        pipeline,
        dispatcher,
        universe,
        config.scanner.scanner_settings(args.cycles),
    )?;

    let control = scanner.control();
    tokio::spawn(async move {
        if relay_interrupts(tokio::signal::ctrl_c, control).await {
            warn!("Second interrupt received, exiting now");
            std::process::exit(130);
        }
    });

    let handle = scanner
        .start()
        .context("Scanner is already running")?;
    let summary = handle.await.context("Scanner task failed")?;

    println!("Scan finished");
    println!("═══════════════════════════════════════════════════════════");
    println!("  Cycles:             {}", summary.cycles);
    println!("  Symbols evaluated:  {}", summary.evaluated);
    println!("  Symbols skipped:    {}", summary.failed);
    println!("  Signals:            {}", summary.signals);
    println!("  Messages delivered: {}", summary.delivered);
    println!("  Failed deliveries:  {}", summary.failed_deliveries);

    Ok(())
}

/// The first interrupt asks the scanner to stop after the current symbol.
/// Returns `true` on a second interrupt, `false` if listening fails.
async fn relay_interrupts<F, Fut>(mut next_interrupt: F, control: ScanControl) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = next_interrupt().await {
        warn!(error = %e, "Cannot listen for Ctrl-C");
        return false;
    }
    info!("Interrupt received, finishing current symbol. Press Ctrl-C again to exit now");
    control.request_stop();

    match next_interrupt().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Cannot listen for Ctrl-C");
            false
        }
    }
}
