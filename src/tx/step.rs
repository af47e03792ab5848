//! Single transaction submission: price, sequence, sign, broadcast

use super::gas::GasPricer;
use super::nonce::NonceCounter;
use crate::account::Account;
use crate::chain::ChainClient;
use crate::error::{SetupError, SetupResult};

use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, TransactionRequest, H256, U256};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Contract that is granted a stake token allowance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpenderRole {
    Rollup,
    ChallengeManager,
}

impl fmt::Display for SpenderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpenderRole::Rollup => write!(f, "rollup"),
            SpenderRole::ChallengeManager => write!(f, "challenge manager"),
        }
    }
}

/// What a workflow step does, used for logging and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Wrap native currency into the stake token
    MintStakeToken,
    /// Unlimited stake token allowance for `spender`
    Approve { spender: Address, role: SpenderRole },
    /// Deposit native currency into the rollup inbox
    BridgeEth,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::MintStakeToken => write!(f, "mint-stake-token"),
            StepKind::Approve {
                role: SpenderRole::Rollup,
                ..
            } => write!(f, "approve-rollup"),
            StepKind::Approve {
                role: SpenderRole::ChallengeManager,
                ..
            } => write!(f, "approve-challenge-manager"),
            StepKind::BridgeEth => write!(f, "bridge-eth"),
        }
    }
}

/// How the gas limit of a step is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasLimit {
    Fixed(u64),
    /// Ask the node via `eth_estimateGas` once the rest of the call is known
    Estimate,
}

/// Template for one transaction. Nonce and price are filled in at submission.
#[derive(Debug, Clone)]
pub struct WorkflowStep {
    pub kind: StepKind,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub gas: GasLimit,
}

/// Fully specified transaction, consumed by signing
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionIntent {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub gas_limit: U256,
    pub nonce: u64,
    pub gas_price: U256,
}

impl TransactionIntent {
    /// Legacy transaction with EIP-155 chain id
    pub fn into_transaction(self, chain_id: u64) -> TypedTransaction {
        TransactionRequest::new()
            .from(self.from)
            .to(self.to)
            .value(self.value)
            .data(self.data)
            .gas(self.gas_limit)
            .gas_price(self.gas_price)
            .nonce(self.nonce)
            .chain_id(chain_id)
            .into()
    }
}

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedTx {
    pub kind: StepKind,
    pub nonce: u64,
    pub gas_price: U256,
    pub hash: H256,
}

/// Submits workflow steps one at a time against the base chain
pub struct TransactionSender {
    /// Chain access
    client: Arc<dyn ChainClient>,
    /// Gas pricer
    gas_pricer: GasPricer,
}

impl TransactionSender {
    pub fn new(client: Arc<dyn ChainClient>, gas_pricer: GasPricer) -> Self {
        Self { client, gas_pricer }
    }

    pub fn client(&self) -> &dyn ChainClient {
        self.client.as_ref()
    }

    /// Submit `step` from `account` using the counter's current nonce.
    ///
    /// The counter only advances once the node has accepted the transaction.
    /// Nothing waits for the transaction to be mined.
    pub async fn execute(
        &self,
        account: &Account,
        nonces: &mut NonceCounter,
        step: &WorkflowStep,
    ) -> SetupResult<SubmittedTx> {
        // Prices are never reused across steps
        let quote = self.gas_pricer.quote(self.client()).await?;
        let gas_price = quote.bumped();
        let nonce = nonces.current();

        let gas_limit = match step.gas {
            GasLimit::Fixed(limit) => U256::from(limit),
            GasLimit::Estimate => self.estimate(account, step, gas_price).await?,
        };

        let intent = TransactionIntent {
            from: account.address(),
            to: step.to,
            value: step.value,
            data: step.data.clone(),
            gas_limit,
            nonce,
            gas_price,
        };
        debug!("Built {} transaction: {:?}", step.kind, intent);

        let tx = intent.into_transaction(account.chain_id());
        let raw = account.sign(&tx).await?;

        let hash = self
            .client
            .send_raw_transaction(raw)
            .await
            .map_err(|e| SetupError::Submission {
                nonce,
                message: e.to_string(),
            })?;
        nonces.advance();

        info!("Sent {} tx with hash {:?}", step.kind, hash);

        Ok(SubmittedTx {
            kind: step.kind,
            nonce,
            gas_price,
            hash,
        })
    }

    async fn estimate(
        &self,
        account: &Account,
        step: &WorkflowStep,
        gas_price: U256,
    ) -> SetupResult<U256> {
        let call: TypedTransaction = TransactionRequest::new()
            .from(account.address())
            .to(step.to)
            .value(step.value)
            .data(step.data.clone())
            .gas_price(gas_price)
            .into();

        let gas = self.client.estimate_gas(call).await?;
        debug!("Estimated {} gas for {}", gas, step.kind);
        Ok(gas)
    }
}
