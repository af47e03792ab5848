//! Chain module - the narrow view of an EVM node the setup workflows need
//!
//! Workflows only talk to the [`ChainClient`] trait. [`ChainProvider`] is the
//! production implementation over ethers' HTTP provider.

pub mod provider;

pub use provider::ChainProvider;

use crate::error::SetupResult;

use async_trait::async_trait;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, H256, U256};

#[cfg(test)]
use mockall::automock;

/// Requests the setup workflows make against the base chain.
///
/// Every call is a single blocking request/response from the caller's point
/// of view; implementations must not reorder or pipeline them.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Node's suggested legacy gas price in wei
    async fn suggest_gas_price(&self) -> SetupResult<U256>;

    /// Nonce the account's next transaction must use, counting pending ones
    async fn pending_nonce(&self, address: Address) -> SetupResult<u64>;

    /// Gas needed to execute `tx` at the latest block
    async fn estimate_gas(&self, tx: TypedTransaction) -> SetupResult<U256>;

    /// `eth_call` against `to` with raw calldata, returning raw return data
    async fn call(&self, to: Address, data: Bytes) -> SetupResult<Bytes>;

    /// Broadcast a signed, RLP encoded transaction without waiting for it to be mined
    async fn send_raw_transaction(&self, raw: Bytes) -> SetupResult<H256>;
}
