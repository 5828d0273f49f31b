use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use quiz_funnel::cli::{self, Cli};
use quiz_funnel::config::FunnelConfig;
use quiz_funnel::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let config =
        FunnelConfig::load(args.config.as_deref()).context("Invalid funnel configuration")?;
    telemetry::init_tracing(config.log_json);
    debug!(?config, "Configuration loaded");

    cli::execute(args.command, &config).await
}
