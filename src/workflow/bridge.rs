//! Bridge native currency from the base chain to the rollup through the inbox

use super::{AccountWorkflow, WorkflowFactory};
use crate::account::Account;
use crate::config::BridgeSettings;
use crate::contracts;
use crate::error::SetupResult;
use crate::tx::{GasLimit, StepKind, TransactionSender, WorkflowStep};

use async_trait::async_trait;

/// Factory for single-step bridging workflows
pub struct BridgeEth {
    settings: BridgeSettings,
}

impl BridgeEth {
    pub fn new(settings: BridgeSettings) -> Self {
        Self { settings }
    }

    pub fn step(&self) -> WorkflowStep {
        WorkflowStep {
            kind: StepKind::BridgeEth,
            to: self.settings.inbox_address,
            value: self.settings.wei_to_deposit,
            data: contracts::inbox_deposit_calldata(),
            gas: GasLimit::Fixed(self.settings.gas_limit),
        }
    }
}

#[async_trait]
impl WorkflowFactory for BridgeEth {
    fn describe(&self) -> &'static str {
        "Now bridging ETH from the base chain to the Arbitrum BOLD L2 rollup"
    }

    async fn build(
        &self,
        _sender: &TransactionSender,
        account: &Account,
    ) -> SetupResult<AccountWorkflow> {
        Ok(AccountWorkflow::new(account.clone(), vec![self.step()]))
    }
}
