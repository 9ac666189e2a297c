//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the graduation scanner.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::adapters::dexscreener::{DexScreenerClient, DexScreenerConfig};
use crate::adapters::geckoterminal::{GeckoTerminalClient, GeckoTerminalConfig};
use crate::adapters::solana::{SolanaRpcClient, SolanaRpcConfig};
use crate::application::{EnricherSettings, EnrichmentOrchestrator, SourceGates, TokenEnricher};
use crate::config::{load_or_default, Config};
use crate::domain::address::bonding_curve_address;
use crate::domain::persistence::{load_launches, save_results};
use crate::domain::record::{EnrichmentOutcome, TokenLaunch};
use crate::domain::summary::EnrichmentSummary;

/// Tokens processed by `enrich --smoke-test`
pub const SMOKE_TEST_TOKENS: usize = 20;

/// Graduation scanner - bonding-curve graduation detection for pump.fun launches
#[derive(Parser, Debug)]
#[command(
    name = "graduation-scanner",
    version = env!("CARGO_PKG_VERSION"),
    about = "Detect pump.fun bonding-curve graduations and enrich launches with market data",
    long_about = "Reads a batch of pump.fun launches, derives each bonding-curve account, \
                  decodes its on-chain state and fuses it with DexScreener and \
                  GeckoTerminal data to classify tokens as graduated, active or dead."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Enrich a batch of launches
    Enrich(EnrichCmd),

    /// Print the bonding-curve address of a mint
    Derive(DeriveCmd),

    /// Enrich a single mint and print the record
    Inspect(InspectCmd),
}

impl Command {
    /// Config file named on the command line, if any
    pub fn config_path(&self) -> Option<&Path> {
        match self {
            Command::Enrich(cmd) => cmd.config.as_deref(),
            Command::Derive(cmd) => cmd.config.as_deref(),
            Command::Inspect(cmd) => cmd.config.as_deref(),
        }
    }
}

/// Enrich a batch of launches
#[derive(Parser, Debug)]
pub struct EnrichCmd {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override input launch file
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Override output directory
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Process only the first 20 tokens, log each one, write nothing
    #[arg(long)]
    pub smoke_test: bool,

    /// Override worker count
    #[arg(long, value_name = "N")]
    pub max_workers: Option<usize>,
}

/// Print a bonding-curve address
#[derive(Parser, Debug)]
pub struct DeriveCmd {
    /// Token mint address
    #[arg(value_name = "MINT")]
    pub mint: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override bump nonce
    #[arg(long, value_name = "NONCE")]
    pub nonce: Option<u8>,
}

/// Enrich one mint
#[derive(Parser, Debug)]
pub struct InspectCmd {
    /// Token mint address
    #[arg(value_name = "MINT")]
    pub mint: String,

    /// Launch time (unix seconds), enables candle lookup
    #[arg(long, value_name = "UNIX")]
    pub block_time: Option<i64>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    let config = load_or_default(app.command.config_path()).context("Failed to load configuration")?;

    // Flags win over the configured level; RUST_LOG wins over both
    init_logging(default_level(app.verbose, app.debug, &config.logging.level))?;

    match app.command {
        Command::Enrich(cmd) => enrich_command(cmd, &config).await,
        Command::Derive(cmd) => derive_command(cmd, &config),
        Command::Inspect(cmd) => inspect_command(cmd, &config).await,
    }
}

fn default_level<'a>(verbose: bool, debug: bool, configured: &'a str) -> &'a str {
    if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        configured
    }
}

/// Initialize logging system
fn init_logging(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Wire the production adapters from configuration
pub fn build_enricher(config: &Config) -> Result<TokenEnricher> {
    let chain = SolanaRpcClient::new(SolanaRpcConfig::from(config))
        .context("Failed to create Solana RPC client")?;
    let market = DexScreenerClient::with_config(DexScreenerConfig::from(config))
        .context("Failed to create DexScreener client")?;
    let candles = GeckoTerminalClient::with_config(GeckoTerminalConfig::from(config))
        .context("Failed to create GeckoTerminal client")?;

    Ok(TokenEnricher::new(Arc::new(chain), Arc::new(market), Arc::new(candles))
        .with_gates(SourceGates::from(&config.concurrency))
        .with_settings(EnricherSettings::from(config)))
}

/// Handle enrich command
async fn enrich_command(cmd: EnrichCmd, config: &Config) -> Result<()> {
    let input = cmd.input.clone().unwrap_or_else(|| config.output.input_path());
    let output_dir = cmd.output_dir.clone().unwrap_or_else(|| config.output.output_dir());

    let mut rows = load_launches(&input)
        .with_context(|| format!("Cannot read launches from {}", input.display()))?;

    if cmd.smoke_test {
        rows.truncate(SMOKE_TEST_TOKENS);
        tracing::warn!("SMOKE TEST - {} tokens, no files written", rows.len());
    }

    let orchestrator = EnrichmentOrchestrator::new(build_enricher(config)?)
        .with_max_workers(cmd.max_workers.unwrap_or(config.concurrency.max_workers))
        .with_progress_every(config.output.progress_every)
        .with_verbose(cmd.smoke_test);

    let outcomes = orchestrator.enrich_rows(rows).await;
    let summary = EnrichmentSummary::from_outcomes(&outcomes);

    if cmd.smoke_test {
        for outcome in &outcomes {
            let r = outcome.record();
            println!(
                "{} | {} | grad: {:.1}% | mcap: ${:.0} | candles: {}",
                r.mint(),
                r.status,
                r.grad_pct,
                r.market_cap_usd,
                r.hourly_prices_24h.len()
            );
        }
        print_summary(&summary);
        return Ok(());
    }

    let records = outcomes.into_iter().map(EnrichmentOutcome::into_record).collect();
    let (enriched_path, summary_path) = save_results(&output_dir, records, &summary)
        .context("Failed to write results")?;

    print_summary(&summary);
    println!("  Records: {}", enriched_path.display());
    println!("  Summary: {}", summary_path.display());
    Ok(())
}

/// Handle derive command
fn derive_command(cmd: DeriveCmd, config: &Config) -> Result<()> {
    let nonce = cmd.nonce.unwrap_or(config.solana.bonding_curve_nonce);

    let pda = bonding_curve_address(
        &cmd.mint,
        &config.solana.program_id,
        config.solana.bonding_curve_seed.as_bytes(),
        nonce,
    )?;

    println!("{}", pda);
    Ok(())
}

/// Handle inspect command
async fn inspect_command(cmd: InspectCmd, config: &Config) -> Result<()> {
    let enricher = build_enricher(config)?;

    let mut launch = TokenLaunch::new(cmd.mint);
    launch.block_time = cmd.block_time;

    let record = enricher.enrich(launch).await;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn print_summary(summary: &EnrichmentSummary) {
    println!("Launched:  {}", summary.total_launched);
    println!("Graduated: {} ({:.2}%)", summary.total_graduated, summary.graduation_rate_pct);
    println!("Active:    {}", summary.total_active);
    println!("Dead:      {}", summary.total_dead);
    if summary.total_failed > 0 {
        println!("Failed:    {}", summary.total_failed);
    }
}
