//! Signing accounts derived from validator private keys

use crate::error::{SetupError, SetupResult};

use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes};
use std::fmt;

/// A validator account. Key material lives only in memory.
#[derive(Clone)]
pub struct Account {
    wallet: LocalWallet,
}

impl Account {
    /// Parse a hex private key (with or without `0x`) bound to `chain_id`
    pub fn from_private_key(index: usize, key: &str, chain_id: u64) -> SetupResult<Self> {
        let wallet = key
            .trim()
            .parse::<LocalWallet>()
            .map_err(|e| SetupError::InvalidPrivateKey {
                index,
                message: e.to_string(),
            })?;

        Ok(Self {
            wallet: wallet.with_chain_id(chain_id),
        })
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    pub fn chain_id(&self) -> u64 {
        self.wallet.chain_id()
    }

    /// Sign `tx` and return its RLP encoding, ready for broadcast.
    ///
    /// The chain id is part of the signed payload, so the result cannot be
    /// replayed on another chain.
    pub async fn sign(&self, tx: &TypedTransaction) -> SetupResult<Bytes> {
        let signature = self
            .wallet
            .sign_transaction(tx)
            .await
            .map_err(|e| SetupError::Signing(e.to_string()))?;
        Ok(tx.rlp_signed(&signature))
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address())
            .field("chain_id", &self.chain_id())
            .finish()
    }
}

/// Split a comma-separated key list into accounts, preserving order
pub fn parse_accounts(keys: &str, chain_id: u64) -> SetupResult<Vec<Account>> {
    let accounts = keys
        .split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .enumerate()
        .map(|(index, key)| Account::from_private_key(index, key, chain_id))
        .collect::<SetupResult<Vec<_>>>()?;

    if accounts.is_empty() {
        return Err(SetupError::MissingField("validator_priv_keys"));
    }
    Ok(accounts)
}
