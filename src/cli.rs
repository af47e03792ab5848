use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bold-utils",
    about = "Arbitrum BOLD command-line utilities",
    version
)]
pub struct Cli {
    #[arg(long, global = true, help = "emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Convert ETH into the WETH stake token and approve the rollup and challenge manager
    MintStakeToken(MintArgs),

    /// Bridge ETH from the base chain to the BOLD rollup through the inbox
    BridgeEth(BridgeArgs),
}

impl Commands {
    pub fn common(&self) -> &CommonArgs {
        match self {
            Commands::MintStakeToken(args) => &args.common,
            Commands::BridgeEth(args) => &args.common,
        }
    }
}

/// Flags shared by every subcommand. Unset flags fall back to the config file,
/// then to built-in defaults.
///
/// Not `Debug`: it carries private keys.
#[derive(Args, Clone, Default)]
pub struct CommonArgs {
    #[arg(
        long,
        env = "VALIDATOR_PRIV_KEYS",
        hide_env_values = true,
        help = "comma-separated validator private keys"
    )]
    pub validator_priv_keys: Option<String>,

    #[arg(long, help = "l1 chain id (sepolia default)")]
    pub l1_chain_id: Option<String>,

    #[arg(long, help = "l1 endpoint")]
    pub l1_endpoint: Option<String>,

    #[arg(long, help = "percent to increase the suggested gas price by (default 100)")]
    pub bump_price_percent: Option<u64>,

    #[arg(long, help = "deadline for each RPC request, in seconds (default 30)")]
    pub rpc_timeout_secs: Option<u64>,

    #[arg(long, help = "extra attempts for failed read-only RPC requests (default 0)")]
    pub rpc_retries: Option<u32>,

    #[arg(
        long,
        env = "BOLD_UTILS_CONFIG",
        help = "TOML file with default values for these flags"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Args, Clone, Default)]
pub struct MintArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(long, help = "rollup address")]
    pub rollup_address: Option<String>,

    #[arg(long, help = "stake token address")]
    pub stake_token_address: Option<String>,

    #[arg(
        long,
        help = "eth to mint into erc20 WETH tokens, in wei (default 100 WETH)"
    )]
    pub wei_to_mint: Option<String>,
}

#[derive(Args, Clone, Default)]
pub struct BridgeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(long, help = "inbox address")]
    pub inbox_address: Option<String>,

    #[arg(long, help = "eth to bridge over, in wei (default 0.002 ETH)")]
    pub wei_to_deposit: Option<String>,

    #[arg(long, help = "gas limit of the inbox deposit (default 150000)")]
    pub bridge_gas_limit: Option<u64>,
}
