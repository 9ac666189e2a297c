//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config.toml structure.
//! Every section is optional; missing keys take the defaults below.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::adapters::dexscreener::DexScreenerConfig;
use crate::adapters::geckoterminal::GeckoTerminalConfig;
use crate::adapters::http::RetryPolicy;
use crate::adapters::solana::SolanaRpcConfig;
use crate::application::{EnricherSettings, SourceGates};
use crate::domain::address::{parse_identifier, PUMP_FUN_PROGRAM_ID};
use crate::domain::market::CandleWindow;

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub solana: SolanaSection,
    pub providers: ProvidersSection,
    pub concurrency: ConcurrencySection,
    pub retry: RetrySection,
    pub candles: CandlesSection,
    pub output: OutputSection,
    pub logging: LoggingSection,
}

/// Solana RPC and bonding-curve program section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolanaSection {
    /// RPC endpoint (use a private RPC for large batches)
    pub rpc_url: String,
    /// Bonding-curve program id
    pub program_id: String,
    /// Seed prefix of the bonding-curve account
    pub bonding_curve_seed: String,
    /// Fixed bump nonce
    pub bonding_curve_nonce: u8,
    pub timeout_secs: u64,
}

impl Default for SolanaSection {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            program_id: PUMP_FUN_PROGRAM_ID.to_string(),
            bonding_curve_seed: "bonding-curve".to_string(),
            bonding_curve_nonce: 254,
            timeout_secs: 30,
        }
    }
}

impl SolanaSection {
    /// Get RPC URL with environment variable override
    /// Checks SOLANA_RPC_URL env var first, falls back to config value
    pub fn get_rpc_url(&self) -> String {
        std::env::var("SOLANA_RPC_URL").unwrap_or_else(|_| self.rpc_url.clone())
    }
}

/// Off-chain market-data providers section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvidersSection {
    pub dexscreener_url: String,
    pub geckoterminal_url: String,
    /// Network slug for GeckoTerminal
    pub network: String,
    /// Exchanges whose pools count as graduation
    pub graduation_dex_ids: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for ProvidersSection {
    fn default() -> Self {
        Self {
            dexscreener_url: "https://api.dexscreener.com".to_string(),
            geckoterminal_url: "https://api.geckoterminal.com/api/v2".to_string(),
            network: "solana".to_string(),
            graduation_dex_ids: vec!["raydium".to_string()],
            timeout_secs: 20,
        }
    }
}

/// Worker pool and per-source gate sizes
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConcurrencySection {
    pub max_workers: usize,
    pub rpc_permits: usize,
    pub dexscreener_permits: usize,
    pub geckoterminal_permits: usize,
}

impl Default for ConcurrencySection {
    fn default() -> Self {
        Self {
            max_workers: 50,
            rpc_permits: 50,
            dexscreener_permits: 5,
            geckoterminal_permits: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySection {
    pub max_attempts: u32,
    /// Exponential backoff base
    pub base_delay_ms: u64,
    /// Linear backoff step after HTTP 429
    pub rate_limit_delay_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1_000,
            rate_limit_delay_ms: 5_000,
        }
    }
}

/// Candle window anchored at launch time
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CandlesSection {
    pub timeframe: String,
    pub window_secs: i64,
    pub fetch_limit: u32,
    pub keep: usize,
}

impl Default for CandlesSection {
    fn default() -> Self {
        let window = CandleWindow::default();
        Self {
            timeframe: window.timeframe,
            window_secs: window.window_secs,
            fetch_limit: window.fetch_limit,
            keep: window.keep,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Launch list from the scanner
    pub input_path: String,
    pub output_dir: String,
    /// Progress line every N completed tokens
    pub progress_every: usize,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            input_path: "data/step1_launches.json".to_string(),
            output_dir: "data".to_string(),
            progress_every: 500,
        }
    }
}

impl OutputSection {
    /// Input path with `~` expanded
    pub fn input_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.input_path).to_string())
    }

    /// Output directory with `~` expanded
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.output_dir).to_string())
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load from `path` if given, otherwise start from defaults
pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solana.rpc_url.trim().is_empty() {
            return Err(ConfigError::ValidationError("rpc_url must not be empty".into()));
        }

        if let Err(e) = parse_identifier(&self.solana.program_id) {
            return Err(ConfigError::ValidationError(format!("program_id: {}", e)));
        }

        if self.solana.bonding_curve_seed.is_empty() {
            return Err(ConfigError::ValidationError(
                "bonding_curve_seed must not be empty".into(),
            ));
        }

        if self.providers.graduation_dex_ids.is_empty() {
            return Err(ConfigError::ValidationError(
                "graduation_dex_ids must name at least one exchange".into(),
            ));
        }

        let c = &self.concurrency;
        for (name, value) in [
            ("max_workers", c.max_workers),
            ("rpc_permits", c.rpc_permits),
            ("dexscreener_permits", c.dexscreener_permits),
            ("geckoterminal_permits", c.geckoterminal_permits),
        ] {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!("{} must be > 0", name)));
            }
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(format!(
                "max_attempts must be > 0, got {}",
                self.retry.max_attempts
            )));
        }

        if self.solana.timeout_secs == 0 || self.providers.timeout_secs == 0 {
            return Err(ConfigError::ValidationError("timeouts must be > 0".into()));
        }

        if !matches!(self.candles.timeframe.as_str(), "minute" | "hour" | "day") {
            return Err(ConfigError::ValidationError(format!(
                "timeframe must be minute, hour or day, got {}",
                self.candles.timeframe
            )));
        }

        if self.candles.window_secs <= 0 || self.candles.fetch_limit == 0 || self.candles.keep == 0 {
            return Err(ConfigError::ValidationError(
                "candle window_secs, fetch_limit and keep must be > 0".into(),
            ));
        }

        if self.output.progress_every == 0 {
            return Err(ConfigError::ValidationError("progress_every must be > 0".into()));
        }

        if !matches!(
            self.logging.level.as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(ConfigError::ValidationError(format!(
                "logging level must be trace, debug, info, warn or error, got {}",
                self.logging.level
            )));
        }

        Ok(())
    }
}

impl From<&RetrySection> for RetryPolicy {
    fn from(section: &RetrySection) -> Self {
        RetryPolicy {
            max_attempts: section.max_attempts,
            base_delay: Duration::from_millis(section.base_delay_ms),
            rate_limit_delay: Duration::from_millis(section.rate_limit_delay_ms),
        }
    }
}

impl From<&ConcurrencySection> for SourceGates {
    fn from(section: &ConcurrencySection) -> Self {
        SourceGates::new(
            section.rpc_permits,
            section.dexscreener_permits,
            section.geckoterminal_permits,
        )
    }
}

impl From<&CandlesSection> for CandleWindow {
    fn from(section: &CandlesSection) -> Self {
        CandleWindow {
            timeframe: section.timeframe.clone(),
            window_secs: section.window_secs,
            fetch_limit: section.fetch_limit,
            keep: section.keep,
        }
    }
}

impl From<&Config> for EnricherSettings {
    fn from(config: &Config) -> Self {
        EnricherSettings {
            program_id: config.solana.program_id.clone(),
            bonding_curve_seed: config.solana.bonding_curve_seed.as_bytes().to_vec(),
            bonding_curve_nonce: config.solana.bonding_curve_nonce,
            graduation_dex_ids: config.providers.graduation_dex_ids.clone(),
            candles: CandleWindow::from(&config.candles),
        }
    }
}

impl From<&Config> for SolanaRpcConfig {
    fn from(config: &Config) -> Self {
        SolanaRpcConfig {
            rpc_url: config.solana.get_rpc_url(),
            timeout: Duration::from_secs(config.solana.timeout_secs),
            retry: RetryPolicy::from(&config.retry),
        }
    }
}

impl From<&Config> for DexScreenerConfig {
    fn from(config: &Config) -> Self {
        DexScreenerConfig {
            api_base_url: config.providers.dexscreener_url.clone(),
            timeout: Duration::from_secs(config.providers.timeout_secs),
            retry: RetryPolicy::from(&config.retry),
        }
    }
}

impl From<&Config> for GeckoTerminalConfig {
    fn from(config: &Config) -> Self {
        GeckoTerminalConfig {
            api_base_url: config.providers.geckoterminal_url.clone(),
            network: config.providers.network.clone(),
            timeout: Duration::from_secs(config.providers.timeout_secs),
            retry: RetryPolicy::from(&config.retry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_valid_config() -> String {
        r#"
[solana]
rpc_url = "https://rpc.example.com"
program_id = "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P"
bonding_curve_nonce = 254
timeout_secs = 15

[providers]
graduation_dex_ids = ["raydium", "pumpswap"]

[concurrency]
max_workers = 20
rpc_permits = 10
dexscreener_permits = 2
geckoterminal_permits = 1

[retry]
max_attempts = 4
base_delay_ms = 500
rate_limit_delay_ms = 2000

[candles]
timeframe = "hour"
keep = 12

[output]
input_path = "in/launches.json"
output_dir = "out"
progress_every = 100
"#
        .to_string()
    }

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_config(&create_valid_config());
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.solana.rpc_url, "https://rpc.example.com");
        assert_eq!(config.solana.bonding_curve_seed, "bonding-curve");
        assert_eq!(config.providers.graduation_dex_ids.len(), 2);
        assert_eq!(config.providers.dexscreener_url, "https://api.dexscreener.com");
        assert_eq!(config.concurrency.geckoterminal_permits, 1);
        assert_eq!(config.candles.keep, 12);
        assert_eq!(config.candles.fetch_limit, 48);
        assert_eq!(config.output.progress_every, 100);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = write_config("");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.solana.bonding_curve_nonce, 254);
        assert_eq!(config.concurrency.max_workers, 50);
        assert_eq!(config.concurrency.rpc_permits, 50);
        assert_eq!(config.concurrency.dexscreener_permits, 5);
        assert_eq!(config.concurrency.geckoterminal_permits, 3);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.output.progress_every, 500);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/path/config.toml");
        assert!(matches!(result.unwrap_err(), ConfigError::IoError(_)));
    }

    #[test]
    fn test_parse_error() {
        let file = write_config("[concurrency]\nmax_workers = \"many\"\n");
        assert!(matches!(load_config(file.path()).unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_zero_permits_rejected() {
        let file = write_config("[concurrency]\ngeckoterminal_permits = 0\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("geckoterminal_permits"));
    }

    #[test]
    fn test_invalid_program_id_rejected() {
        let file = write_config("[solana]\nprogram_id = \"nope\"\n");
        assert!(matches!(load_config(file.path()).unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_invalid_timeframe_rejected() {
        let file = write_config("[candles]\ntimeframe = \"4h\"\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_logging_level() {
        let file = write_config("[logging]\nlevel = \"info\"\n");
        assert_eq!(load_config(file.path()).unwrap().logging.level, "info");

        let file = write_config("[logging]\nlevel = \"loud\"\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("logging level"));
    }

    #[test]
    fn test_empty_dex_ids_rejected() {
        let file = write_config("[providers]\ngraduation_dex_ids = []\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_conversions() {
        let file = write_config(&create_valid_config());
        let config = load_config(file.path()).unwrap();

        let policy = RetryPolicy::from(&config.retry);
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.rate_limit_delay, Duration::from_secs(2));

        let settings = EnricherSettings::from(&config);
        assert_eq!(settings.bonding_curve_seed, b"bonding-curve".to_vec());
        assert_eq!(settings.candles.keep, 12);

        let gecko = GeckoTerminalConfig::from(&config);
        assert_eq!(gecko.network, "solana");
        assert_eq!(gecko.timeout, Duration::from_secs(20));
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = load_or_default(None).unwrap();
        assert_eq!(config.output.input_path, "data/step1_launches.json");
    }

    #[test]
    fn test_tilde_expansion() {
        let section = OutputSection {
            output_dir: "~/scans".to_string(),
            ..Default::default()
        };
        assert!(!section.output_dir().to_string_lossy().starts_with('~'));
    }
}
