//! Per-account workflows
//!
//! A workflow is an ordered list of [`WorkflowStep`]s bound to one account.
//! Steps run strictly in order and the first failure stops the workflow: no
//! later step is priced, built or signed.

pub mod bridge;
pub mod mint;

pub use bridge::BridgeEth;
pub use mint::MintStakeToken;

use crate::account::Account;
use crate::error::SetupResult;
use crate::tx::{NonceCounter, StepKind, SubmittedTx, TransactionSender, WorkflowStep};

use async_trait::async_trait;
use tracing::info;

/// Ordered steps for a single account
#[derive(Debug, Clone)]
pub struct AccountWorkflow {
    account: Account,
    steps: Vec<WorkflowStep>,
}

impl AccountWorkflow {
    pub fn new(account: Account, steps: Vec<WorkflowStep>) -> Self {
        Self { account, steps }
    }

    /// Submit every step in order, stopping at the first error
    pub async fn run(&self, sender: &TransactionSender) -> SetupResult<Vec<SubmittedTx>> {
        let address = self.account.address();
        let mut nonces = NonceCounter::init(sender.client(), address).await?;
        let mut submitted = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            if let StepKind::Approve { spender, role } = step.kind {
                info!(
                    "Your {:?} address is giving the {} contract {:?} a full allowance",
                    address, role, spender
                );
            }

            submitted.push(sender.execute(&self.account, &mut nonces, step).await?);
        }

        Ok(submitted)
    }
}

/// Builds the workflow to run for each account of a batch
#[async_trait]
pub trait WorkflowFactory: Send + Sync {
    /// Log line announcing the batch
    fn describe(&self) -> &'static str;

    /// Build the workflow for `account`. May read chain state.
    async fn build(
        &self,
        sender: &TransactionSender,
        account: &Account,
    ) -> SetupResult<AccountWorkflow>;
}
