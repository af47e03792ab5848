//! Chain provider over ethers' HTTP transport with per-call deadlines

use super::ChainClient;
use crate::config::ChainSettings;
use crate::error::{SetupError, SetupResult};

use async_trait::async_trait;
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, BlockId, BlockNumber, Bytes, TransactionRequest, H256, U256};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Delay between attempts of a retried read-only query
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// HTTP JSON-RPC connection to the base chain
pub struct ChainProvider {
    /// Connection settings
    settings: ChainSettings,
    /// Underlying ethers provider
    http: Provider<Http>,
}

impl ChainProvider {
    /// Create a provider for the configured endpoint.
    ///
    /// No request is made here; an unreachable node surfaces on the first call.
    pub fn new(settings: ChainSettings) -> SetupResult<Self> {
        let http = Provider::<Http>::try_from(settings.endpoint.as_str()).map_err(|e| {
            SetupError::Config(format!("Invalid L1 endpoint {:?}: {}", settings.endpoint, e))
        })?;

        debug!(
            "Created HTTP provider for chain {}: {}",
            settings.chain_id, settings.endpoint
        );

        Ok(Self { settings, http })
    }

    /// Get chain ID used for signing
    pub fn chain_id(&self) -> u64 {
        self.settings.chain_id
    }

    /// Run a read-only request under the deadline, retrying transport failures
    async fn query<T, E, F, Fut>(&self, operation: &str, rpc: F) -> SetupResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        self.request(operation, self.settings.rpc_retries, rpc)
            .await
    }

    async fn request<T, E, F, Fut>(
        &self,
        operation: &str,
        retries: u32,
        mut rpc: F,
    ) -> SetupResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempts = 0;

        loop {
            attempts += 1;

            let err = match timeout(self.settings.rpc_timeout, rpc()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => SetupError::rpc(operation, e),
                Err(_) => SetupError::Timeout {
                    operation: operation.to_string(),
                },
            };

            if !err.is_retryable() || attempts > retries {
                return Err(err);
            }

            warn!(
                "{} failed (attempt {}/{}): {}",
                operation,
                attempts,
                retries + 1,
                err
            );
            tokio::time::sleep(RETRY_DELAY).await;
        }
    }
}

#[async_trait]
impl ChainClient for ChainProvider {
    async fn suggest_gas_price(&self) -> SetupResult<U256> {
        self.query("suggest gas price", || self.http.get_gas_price())
            .await
    }

    async fn pending_nonce(&self, address: Address) -> SetupResult<u64> {
        let block = Some(BlockId::Number(BlockNumber::Pending));
        let nonce = self
            .query("pending nonce", || {
                self.http.get_transaction_count(address, block)
            })
            .await?;

        if nonce > U256::from(u64::MAX) {
            return Err(SetupError::rpc(
                "pending nonce",
                format!("nonce {} does not fit in 64 bits", nonce),
            ));
        }
        Ok(nonce.as_u64())
    }

    async fn estimate_gas(&self, tx: TypedTransaction) -> SetupResult<U256> {
        self.query("estimate gas", || self.http.estimate_gas(&tx, None))
            .await
    }

    async fn call(&self, to: Address, data: Bytes) -> SetupResult<Bytes> {
        let tx: TypedTransaction = TransactionRequest::new().to(to).data(data).into();
        self.query("contract call", || self.http.call(&tx, None))
            .await
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> SetupResult<H256> {
        // A failed broadcast may still have reached the mempool, so never resend.
        let pending = self
            .request("send raw transaction", 0, || {
                self.http.send_raw_transaction(raw.clone())
            })
            .await?;
        Ok(pending.tx_hash())
    }
}
