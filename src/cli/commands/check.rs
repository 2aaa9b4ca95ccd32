//! Single-symbol check command.

use anyhow::{Context, Result};
use confluence_config::AppConfig;
use confluence_core::types::{Direction, Symbol};
use confluence_scanner::IndicatorPipeline;
use confluence_strategy::{conditions, evaluate, ConditionSet};
use serde_json::json;

use super::build_source;
use crate::cli::CheckArgs;

pub async fn run(args: &CheckArgs, config: &AppConfig) -> Result<()> {
    let symbol = Symbol::from(args.symbol.trim().to_ascii_uppercase());
    let source = build_source(config, args.data_dir.as_deref())?;
    let pipeline = IndicatorPipeline::new(source, config.scanner.pipeline_settings())
        .context("Invalid indicator settings")?;

    let snapshot = pipeline.snapshot(&symbol).await?;
    let signal = evaluate(&snapshot);
    let up = conditions(&snapshot, Direction::Up);
    let down = conditions(&snapshot, Direction::Down);

    if args.output == "json" {
        let report = json!({
            "symbol": symbol,
            "timeframe": config.scanner.timeframe,
            "snapshot": snapshot,
            "up": up,
            "down": down,
            "signal": signal,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} ({})", symbol, config.scanner.timeframe);
    println!("═══════════════════════════════════════════════════════════");
    println!("  Close:            {:.6}", snapshot.close_latest);
    println!("  EMA fast / slow:  {:.6} / {:.6}", snapshot.ema_fast, snapshot.ema_slow);
    println!("  RSI:              {:.2}", snapshot.rsi_latest);
    println!("  Cloud A / B:      {:.6} / {:.6}", snapshot.ichimoku_a, snapshot.ichimoku_b);
    println!("  OBV change:       {:.2}", snapshot.obv_delta);
    println!(
        "  MACD hist:        {:.6} -> {:.6}",
        snapshot.macd_hist_prev, snapshot.macd_hist_latest
    );
    println!();
    print_conditions("Up", &up);
    print_conditions("Down", &down);
    println!("Signal: {}", signal);

    Ok(())
}

fn print_conditions(label: &str, set: &ConditionSet) {
    let mark = |ok: bool| if ok { "yes" } else { "no" };
    println!("  {} ({}/5)", label, set.met());
    println!("  ───────────────────────────────────────────────────────");
    println!("    trend       {}", mark(set.trend));
    println!("    momentum    {}", mark(set.momentum));
    println!("    cloud       {}", mark(set.cloud));
    println!("    volume      {}", mark(set.volume));
    println!("    macd cross  {}", mark(set.macd_cross));
    println!();
}
