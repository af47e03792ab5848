//! Configuration management for the BOLD setup utilities
//!
//! Values come from command line flags first, then from an optional TOML file
//! (with `${VAR}` environment substitution), then from built-in defaults. The
//! result is a single immutable [`SetupConfig`] validated before any network
//! call is made.

use crate::account::{parse_accounts, Account};
use crate::cli::{BridgeArgs, Commands, CommonArgs, MintArgs};
use crate::error::{SetupError, SetupResult};

use anyhow::{Context, Result};
use ethers::types::{Address, U256};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Sepolia
pub const DEFAULT_L1_CHAIN_ID: u64 = 11_155_111;
/// 100 WETH
pub const DEFAULT_WEI_TO_MINT: &str = "100000000000000000000";
/// 0.002 ETH
pub const DEFAULT_WEI_TO_DEPOSIT: &str = "2000000000000000";
pub const DEFAULT_BUMP_PRICE_PERCENT: u64 = 100;
pub const DEFAULT_BRIDGE_GAS_LIMIT: u64 = 150_000;
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 30;

lazy_static! {
    static ref ENV_PLACEHOLDER: Regex =
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("placeholder pattern is valid");
}

/// Optional settings file. Every key mirrors a command line flag.
///
/// Not `Debug`: it may carry private keys.
#[derive(Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub validator_priv_keys: Option<String>,
    pub l1_chain_id: Option<u64>,
    pub l1_endpoint: Option<String>,
    pub bump_price_percent: Option<u64>,
    pub rpc_timeout_secs: Option<u64>,
    pub rpc_retries: Option<u32>,
    pub rollup_address: Option<String>,
    pub stake_token_address: Option<String>,
    pub wei_to_mint: Option<String>,
    pub inbox_address: Option<String>,
    pub wei_to_deposit: Option<String>,
    pub bridge_gas_limit: Option<u64>,
}

impl FileSettings {
    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::parse(&raw).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let substituted = substitute_env_vars(raw);
        Ok(toml::from_str(&substituted)?)
    }
}

/// Connection to the base chain
#[derive(Debug, Clone)]
pub struct ChainSettings {
    pub chain_id: u64,
    pub endpoint: String,
    /// Deadline for each individual RPC request
    pub rpc_timeout: Duration,
    /// Extra attempts for retryable read-only requests
    pub rpc_retries: u32,
}

#[derive(Debug, Clone)]
pub struct MintSettings {
    pub rollup_address: Address,
    pub stake_token_address: Address,
    pub wei_to_mint: U256,
}

#[derive(Debug, Clone)]
pub struct BridgeSettings {
    pub inbox_address: Address,
    pub wei_to_deposit: U256,
    pub gas_limit: u64,
}

#[derive(Debug, Clone)]
pub enum WorkflowSettings {
    MintStakeToken(MintSettings),
    BridgeEth(BridgeSettings),
}

/// Everything a run needs, resolved once at startup
#[derive(Debug, Clone)]
pub struct SetupConfig {
    pub chain: ChainSettings,
    pub bump_price_percent: u64,
    pub accounts: Vec<Account>,
    pub workflow: WorkflowSettings,
}

impl SetupConfig {
    /// Merge flags over file values over defaults and validate the result
    pub fn resolve(command: &Commands, file: &FileSettings) -> SetupResult<Self> {
        let common = command.common();
        let chain = resolve_chain(common, file)?;

        let bump_price_percent = common
            .bump_price_percent
            .or(file.bump_price_percent)
            .unwrap_or(DEFAULT_BUMP_PRICE_PERCENT);

        let workflow = match command {
            Commands::MintStakeToken(args) => {
                WorkflowSettings::MintStakeToken(resolve_mint(args, file)?)
            }
            Commands::BridgeEth(args) => WorkflowSettings::BridgeEth(resolve_bridge(args, file)?),
        };

        // Keys last: everything that is plain configuration is reported first
        let keys = pick(&common.validator_priv_keys, &file.validator_priv_keys)
            .ok_or(SetupError::MissingField("validator_priv_keys"))?;
        let accounts = parse_accounts(keys, chain.chain_id)?;

        Ok(Self {
            chain,
            bump_price_percent,
            accounts,
            workflow,
        })
    }
}

fn resolve_chain(common: &CommonArgs, file: &FileSettings) -> SetupResult<ChainSettings> {
    let chain_id = match common.l1_chain_id.as_deref() {
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
            SetupError::Config(format!("l1_chain_id {:?} is not a base-10 integer", raw))
        })?,
        None => file.l1_chain_id.unwrap_or(DEFAULT_L1_CHAIN_ID),
    };

    let endpoint = pick(&common.l1_endpoint, &file.l1_endpoint)
        .ok_or(SetupError::MissingField("l1_endpoint"))?
        .to_string();

    let timeout_secs = common
        .rpc_timeout_secs
        .or(file.rpc_timeout_secs)
        .unwrap_or(DEFAULT_RPC_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(SetupError::Config(
            "rpc_timeout_secs must be greater than zero".to_string(),
        ));
    }

    Ok(ChainSettings {
        chain_id,
        endpoint,
        rpc_timeout: Duration::from_secs(timeout_secs),
        rpc_retries: common.rpc_retries.or(file.rpc_retries).unwrap_or(0),
    })
}

fn resolve_mint(args: &MintArgs, file: &FileSettings) -> SetupResult<MintSettings> {
    Ok(MintSettings {
        rollup_address: required_address(
            "rollup_address",
            pick(&args.rollup_address, &file.rollup_address),
        )?,
        stake_token_address: required_address(
            "stake_token_address",
            pick(&args.stake_token_address, &file.stake_token_address),
        )?,
        wei_to_mint: parse_amount(
            "wei_to_mint",
            pick(&args.wei_to_mint, &file.wei_to_mint).unwrap_or(DEFAULT_WEI_TO_MINT),
        )?,
    })
}

fn resolve_bridge(args: &BridgeArgs, file: &FileSettings) -> SetupResult<BridgeSettings> {
    let gas_limit = args
        .bridge_gas_limit
        .or(file.bridge_gas_limit)
        .unwrap_or(DEFAULT_BRIDGE_GAS_LIMIT);
    if gas_limit == 0 {
        return Err(SetupError::Config(
            "bridge_gas_limit must be greater than zero".to_string(),
        ));
    }

    Ok(BridgeSettings {
        inbox_address: required_address(
            "inbox_address",
            pick(&args.inbox_address, &file.inbox_address),
        )?,
        wei_to_deposit: parse_amount(
            "wei_to_deposit",
            pick(&args.wei_to_deposit, &file.wei_to_deposit).unwrap_or(DEFAULT_WEI_TO_DEPOSIT),
        )?,
        gas_limit,
    })
}

/// Flag value if set and non-blank, else the file value if set and non-blank
fn pick<'a>(flag: &'a Option<String>, file: &'a Option<String>) -> Option<&'a str> {
    [flag, file]
        .into_iter()
        .filter_map(|v| v.as_deref())
        .map(str::trim)
        .find(|v| !v.is_empty())
}

fn required_address(field: &'static str, value: Option<&str>) -> SetupResult<Address> {
    let value = value.ok_or(SetupError::MissingField(field))?;
    Address::from_str(value).map_err(|_| SetupError::InvalidAddress {
        field,
        value: value.to_string(),
    })
}

/// Base-10 amount in wei
pub fn parse_amount(field: &'static str, value: &str) -> SetupResult<U256> {
    let invalid = || SetupError::InvalidAmount {
        field,
        value: value.to_string(),
    };

    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    U256::from_dec_str(trimmed).map_err(|_| invalid())
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    ENV_PLACEHOLDER
        .replace_all(input, |caps: &regex::Captures| {
            env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}
