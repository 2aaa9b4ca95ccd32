//! Configuration management.
//!
//! Settings come from a TOML file overlaid by `CONFLUENCE__<SECTION>__<KEY>`
//! environment variables. Secrets are never stored in the file; the file
//! names the environment variables that hold them.

mod settings;

pub use settings::{AppConfig, AppSettings, ExchangeConfig, LoggingConfig, ScannerConfig, TelegramSettings};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Keys whose environment value is a comma separated list.
const LIST_KEYS: [&str; 3] = ["telegram.subscribers", "scanner.exclusions", "scanner.symbols"];

/// Load configuration from file and environment.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    load_with(path, environment())
}

fn environment() -> Environment {
    LIST_KEYS.iter().fold(
        Environment::with_prefix("CONFLUENCE")
            .separator("__")
            .list_separator(",")
            .try_parsing(true),
        |env, key| env.with_list_parse_key(key),
    )
}

fn load_with(path: &Path, env: Environment) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(env)
        .build()?;

    config.try_deserialize()
}

/// The built-in defaults rendered as TOML.
pub fn default_config_toml() -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(&AppConfig::default())
}
