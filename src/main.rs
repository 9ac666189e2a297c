//! Graduation Scanner
//!
//! Batch graduation detection and market-data enrichment for pump.fun launches.

use anyhow::Result;
use graduation_scanner::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (SOLANA_RPC_URL with API keys goes here)
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app).await
}
