//! Batch execution of one workflow per validator account
//!
//! Accounts are processed one after another, in the order their keys were
//! given. The first error ends the batch; later accounts are never touched.

use crate::account::Account;
use crate::error::SetupResult;
use crate::tx::{SubmittedTx, TransactionSender};
use crate::workflow::WorkflowFactory;

use ethers::types::Address;
use tracing::info;

/// Transactions submitted for one account
#[derive(Debug, Clone)]
pub struct AccountReport {
    pub address: Address,
    pub transactions: Vec<SubmittedTx>,
}

/// Result of a completed batch
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub accounts: Vec<AccountReport>,
}

impl BatchReport {
    /// One line per submitted transaction: address, step, nonce, price, hash
    pub fn confirmation_lines(&self) -> Vec<String> {
        self.accounts
            .iter()
            .flat_map(|report| {
                report.transactions.iter().map(move |tx| {
                    format!(
                        "{:?} {} nonce={} gas_price={} {:?}",
                        report.address, tx.kind, tx.nonce, tx.gas_price, tx.hash
                    )
                })
            })
            .collect()
    }

    pub fn transaction_count(&self) -> usize {
        self.accounts.iter().map(|a| a.transactions.len()).sum()
    }
}

/// Drives workflows across accounts
pub struct BatchRunner {
    sender: TransactionSender,
}

impl BatchRunner {
    pub fn new(sender: TransactionSender) -> Self {
        Self { sender }
    }

    /// Build and run a workflow for every account, in order
    pub async fn run_all(
        &self,
        accounts: &[Account],
        factory: &dyn WorkflowFactory,
    ) -> SetupResult<BatchReport> {
        info!("{}", factory.describe());

        let mut report = BatchReport::default();

        for (index, account) in accounts.iter().enumerate() {
            info!(
                "Account {}/{}: {:?}",
                index + 1,
                accounts.len(),
                account.address()
            );

            let workflow = factory.build(&self.sender, account).await?;
            let transactions = workflow.run(&self.sender).await?;

            report.accounts.push(AccountReport {
                address: account.address(),
                transactions,
            });
        }

        info!(
            "Submitted {} transactions for {} accounts",
            report.transaction_count(),
            report.accounts.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::tests::{dev_account, KEY_0, KEY_1};
    use crate::chain::MockChainClient;
    use crate::config::{BridgeSettings, MintSettings};
    use crate::error::SetupError;
    use crate::tx::step::tests::{decode, record_broadcasts};
    use crate::tx::{GasPricer, StepKind};
    use crate::workflow::{BridgeEth, MintStakeToken};
    use ethers::abi::{self, Token};
    use ethers::types::{NameOrAddress, U256};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn mint_factory() -> MintStakeToken {
        MintStakeToken::new(MintSettings {
            rollup_address: Address::repeat_byte(0x0a),
            stake_token_address: Address::repeat_byte(0x0b),
            wei_to_mint: U256::exp10(20),
        })
    }

    #[tokio::test]
    async fn test_two_account_mint_batch() {
        let first = dev_account(KEY_0);
        let second = dev_account(KEY_1);
        let manager = Address::repeat_byte(0x0c);

        let mut start_nonces = HashMap::new();
        start_nonces.insert(first.address(), 5u64);
        start_nonces.insert(second.address(), 0u64);

        let mut client = MockChainClient::new();
        client
            .expect_call()
            .times(2)
            .returning(move |_, _| Ok(abi::encode(&[Token::Address(manager)]).into()));
        client
            .expect_pending_nonce()
            .times(2)
            .returning(move |address| Ok(start_nonces[&address]));
        client
            .expect_suggest_gas_price()
            .times(6)
            .returning(|| Ok(U256::from(10)));
        client
            .expect_estimate_gas()
            .returning(|_| Ok(U256::from(50_000)));
        let sent = record_broadcasts(&mut client);

        let runner = BatchRunner::new(TransactionSender::new(
            Arc::new(client),
            GasPricer::new(100),
        ));
        let report = runner
            .run_all(&[first.clone(), second.clone()], &mint_factory())
            .await
            .unwrap();

        assert_eq!(report.accounts.len(), 2);
        assert_eq!(report.accounts[0].address, first.address());
        assert_eq!(report.accounts[1].address, second.address());
        assert_eq!(report.transaction_count(), 6);

        let txs: Vec<_> = sent.lock().unwrap().iter().map(decode).collect();
        assert!(txs
            .iter()
            .all(|tx| tx.gas_price == Some(U256::from(20))));

        let nonces: Vec<_> = txs.iter().map(|tx| tx.nonce.unwrap().as_u64()).collect();
        assert_eq!(nonces, vec![5, 6, 7, 0, 1, 2]);

        let kinds: Vec<_> = report.accounts[0]
            .transactions
            .iter()
            .map(|tx| tx.kind.to_string())
            .collect();
        assert_eq!(
            kinds,
            vec!["mint-stake-token", "approve-rollup", "approve-challenge-manager"]
        );
        assert_eq!(report.confirmation_lines().len(), 6);
    }

    #[tokio::test]
    async fn test_failed_account_halts_batch() {
        let first = dev_account(KEY_0);
        let second = dev_account(KEY_1);

        // Only the first account may ever look up its nonce
        let mut client = MockChainClient::new();
        client
            .expect_pending_nonce()
            .times(1)
            .returning(|_| Ok(0));
        client
            .expect_suggest_gas_price()
            .returning(|| Ok(U256::from(10)));
        client
            .expect_send_raw_transaction()
            .times(1)
            .returning(|_| Err(SetupError::rpc("send raw transaction", "insufficient funds")));

        let runner = BatchRunner::new(TransactionSender::new(
            Arc::new(client),
            GasPricer::new(100),
        ));
        let factory = BridgeEth::new(BridgeSettings {
            inbox_address: Address::repeat_byte(0x1b),
            wei_to_deposit: U256::from(1),
            gas_limit: 150_000,
        });

        let err = runner
            .run_all(&[first, second], &factory)
            .await
            .unwrap_err();

        assert!(matches!(err, SetupError::Submission { nonce: 0, .. }));
    }

    #[tokio::test]
    async fn test_bridge_batch_targets_inbox_for_every_account() {
        let inbox = Address::repeat_byte(0x1b);
        let mut client = MockChainClient::new();
        client.expect_pending_nonce().returning(|_| Ok(3));
        client
            .expect_suggest_gas_price()
            .returning(|| Ok(U256::from(10)));
        let sent = record_broadcasts(&mut client);

        let runner = BatchRunner::new(TransactionSender::new(
            Arc::new(client),
            GasPricer::new(100),
        ));
        let factory = BridgeEth::new(BridgeSettings {
            inbox_address: inbox,
            wei_to_deposit: U256::from(2_000_000_000_000_000u64),
            gas_limit: 150_000,
        });

        let report = runner
            .run_all(&[dev_account(KEY_0), dev_account(KEY_1)], &factory)
            .await
            .unwrap();

        assert_eq!(report.transaction_count(), 2);
        assert!(report.accounts.iter().all(|a| a.transactions[0].kind == StepKind::BridgeEth));
        for tx in sent.lock().unwrap().iter().map(decode) {
            assert_eq!(tx.to, Some(NameOrAddress::Address(inbox)));
            assert_eq!(tx.nonce, Some(U256::from(3)));
            assert_eq!(tx.gas_price, Some(U256::from(20)));
        }
    }
}
