//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "confluence")]
#[command(author, version, about = "Indicator-confluence signal scanner with Telegram alerts")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", env = "CONFLUENCE_CONFIG")]
    pub config: PathBuf,

    /// Log level (overrides the configuration file)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the symbol universe and notify subscribers of signals
    Scan(ScanArgs),
    /// Evaluate a single symbol once and print the breakdown
    Check(CheckArgs),
    /// Print the symbol universe
    Symbols(SymbolsArgs),
    /// Validate configuration
    ValidateConfig,
    /// Print the default configuration as TOML
    DefaultConfig,
}

#[derive(clap::Args)]
pub struct ScanArgs {
    /// Stop after this many passes over the universe
    #[arg(long)]
    pub cycles: Option<u64>,

    /// Log signals instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// Read candles from <DIR>/<SYMBOL>.csv instead of the exchange
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Symbols to scan (comma-separated); replaces discovery
    #[arg(short = 'S', long, value_delimiter = ',')]
    pub symbols: Vec<String>,
}

#[derive(clap::Args)]
pub struct CheckArgs {
    /// Symbol to evaluate
    #[arg(short, long)]
    pub symbol: String,

    /// Read candles from <DIR>/<SYMBOL>.csv instead of the exchange
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub output: String,
}

#[derive(clap::Args)]
pub struct SymbolsArgs {
    /// List symbols from <DIR>/*.csv instead of the exchange
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}
