//! Nonce sequencing for dependent submissions from one account
//!
//! The pending nonce is fetched once when a workflow starts. After that the
//! counter only moves locally: the next step is usually built before the
//! previous transaction is mined, so asking the node again could hand back a
//! stale value.

use crate::chain::ChainClient;
use crate::error::SetupResult;

use ethers::types::Address;
use tracing::debug;

/// Per-account nonce state, owned by a single workflow run
#[derive(Debug)]
pub struct NonceCounter {
    /// Account the nonces belong to
    address: Address,
    /// Nonce for the next submission
    current: u64,
}

impl NonceCounter {
    /// Seed a counter from the account's pending nonce on chain
    pub async fn init<C: ChainClient + ?Sized>(
        client: &C,
        address: Address,
    ) -> SetupResult<Self> {
        let pending = client.pending_nonce(address).await?;
        debug!("Initialized nonce for {:?}: {}", address, pending);
        Ok(Self::starting_at(address, pending))
    }

    pub fn starting_at(address: Address, nonce: u64) -> Self {
        Self {
            address,
            current: nonce,
        }
    }

    /// Nonce the next submission must carry
    pub fn current(&self) -> u64 {
        self.current
    }

    /// Record a successful submission.
    ///
    /// Returns the nonce that was consumed.
    pub fn advance(&mut self) -> u64 {
        let used = self.current;
        self.current += 1;
        debug!("Nonce {} consumed for {:?}", used, self.address);
        used
    }
}
