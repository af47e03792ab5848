//! BOLD utilities - account setup for the Arbitrum BOLD dispute protocol
//!
//! Two workflows, run for every validator key given:
//! - `mint-stake-token`: wrap ETH into the stake token, then approve the
//!   rollup and the challenge manager to spend it
//! - `bridge-eth`: deposit ETH into the rollup inbox

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

mod account;
mod batch;
mod chain;
mod cli;
mod config;
mod contracts;
mod error;
mod tx;
mod workflow;

use batch::{BatchReport, BatchRunner};
use chain::ChainProvider;
use cli::{Cli, Commands};
use config::{FileSettings, SetupConfig, WorkflowSettings};
use error::SetupResult;
use tx::{GasPricer, TransactionSender};
use workflow::{BridgeEth, MintStakeToken, WorkflowFactory};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.log_json);

    info!("Starting bold-utils v{}", env!("CARGO_PKG_VERSION"));

    // Load the optional settings file
    let file = match cli.command.common().config.as_deref() {
        Some(path) => match FileSettings::load(path) {
            Ok(file) => file,
            Err(e) => {
                error!("{:#}", e);
                return ExitCode::from(2);
            }
        },
        None => FileSettings::default(),
    };

    match run(&cli.command, &file).await {
        Ok(report) => {
            for line in report.confirmation_lines() {
                println!("{}", line);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(command: &Commands, file: &FileSettings) -> SetupResult<BatchReport> {
    let config = SetupConfig::resolve(command, file)?;
    info!(
        "Loaded configuration for {} accounts, bumping gas price by {} percent",
        config.accounts.len(),
        config.bump_price_percent
    );

    let provider = ChainProvider::new(config.chain.clone())?;
    info!(
        "Using chain {} at {}",
        provider.chain_id(),
        config.chain.endpoint
    );

    let sender = TransactionSender::new(
        Arc::new(provider),
        GasPricer::new(config.bump_price_percent),
    );

    let factory: Box<dyn WorkflowFactory> = match &config.workflow {
        WorkflowSettings::MintStakeToken(settings) => {
            Box::new(MintStakeToken::new(settings.clone()))
        }
        WorkflowSettings::BridgeEth(settings) => Box::new(BridgeEth::new(settings.clone())),
    };

    BatchRunner::new(sender)
        .run_all(&config.accounts, factory.as_ref())
        .await
}

fn init_logging(json: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bold_utils=debug,hyper=warn"));

    // Logs go to stderr; stdout only carries the confirmation lines
    let json_layer = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}
