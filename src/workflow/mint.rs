//! Mint-and-approve: wrap native currency into the stake token and
//! pre-authorize the rollup and the challenge manager to spend it

use super::{AccountWorkflow, WorkflowFactory};
use crate::account::Account;
use crate::config::MintSettings;
use crate::contracts;
use crate::error::SetupResult;
use crate::tx::{GasLimit, SpenderRole, StepKind, TransactionSender, WorkflowStep};

use async_trait::async_trait;
use ethers::types::{Address, U256};
use tracing::debug;

/// Factory for mint-and-approve workflows
pub struct MintStakeToken {
    settings: MintSettings,
}

impl MintStakeToken {
    pub fn new(settings: MintSettings) -> Self {
        Self { settings }
    }

    /// Deposit, approve rollup, approve challenge manager; all on the stake token
    pub fn steps(&self, challenge_manager: Address) -> Vec<WorkflowStep> {
        let token = self.settings.stake_token_address;
        let approve = |spender: Address, role: SpenderRole| WorkflowStep {
            kind: StepKind::Approve { spender, role },
            to: token,
            value: U256::zero(),
            data: contracts::approve_max_calldata(spender),
            gas: GasLimit::Estimate,
        };

        vec![
            WorkflowStep {
                kind: StepKind::MintStakeToken,
                to: token,
                value: self.settings.wei_to_mint,
                data: contracts::deposit_calldata(),
                gas: GasLimit::Estimate,
            },
            approve(self.settings.rollup_address, SpenderRole::Rollup),
            approve(challenge_manager, SpenderRole::ChallengeManager),
        ]
    }
}

#[async_trait]
impl WorkflowFactory for MintStakeToken {
    fn describe(&self) -> &'static str {
        "Now minting the stake token required for BOLD assertion posting and challenge participation"
    }

    async fn build(
        &self,
        sender: &TransactionSender,
        account: &Account,
    ) -> SetupResult<AccountWorkflow> {
        let challenge_manager =
            contracts::challenge_manager(sender.client(), self.settings.rollup_address).await?;
        debug!(
            "Rollup {:?} reports challenge manager {:?}",
            self.settings.rollup_address, challenge_manager
        );

        Ok(AccountWorkflow::new(
            account.clone(),
            self.steps(challenge_manager),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::tests::{dev_account, KEY_0};
    use crate::chain::MockChainClient;
    use crate::contracts::ChallengeManagerCall;
    use crate::tx::step::tests::{decode, record_broadcasts};
    use crate::tx::GasPricer;
    use ethers::abi::{self, AbiEncode, Token};
    use ethers::types::{Bytes, NameOrAddress};
    use mockall::predicate::eq;
    use mockall::Sequence;
    use std::sync::Arc;

    fn rollup() -> Address {
        Address::repeat_byte(0x0a)
    }

    fn token() -> Address {
        Address::repeat_byte(0x0b)
    }

    fn manager() -> Address {
        Address::repeat_byte(0x0c)
    }

    fn factory() -> MintStakeToken {
        MintStakeToken::new(MintSettings {
            rollup_address: rollup(),
            stake_token_address: token(),
            wei_to_mint: U256::exp10(20),
        })
    }

    #[test]
    fn test_steps_target_stake_token_in_order() {
        let steps = factory().steps(manager());

        assert_eq!(steps.len(), 3);
        assert!(steps.iter().all(|step| step.to == token()));
        assert_eq!(steps[0].kind, StepKind::MintStakeToken);
        assert_eq!(steps[0].value, U256::exp10(20));
        assert_eq!(
            steps[1].kind,
            StepKind::Approve {
                spender: rollup(),
                role: SpenderRole::Rollup
            }
        );
        assert_eq!(
            steps[2].kind,
            StepKind::Approve {
                spender: manager(),
                role: SpenderRole::ChallengeManager
            }
        );
        assert_eq!(steps[1].value, U256::zero());
        assert_eq!(steps[2].data, contracts::approve_max_calldata(manager()));
    }

    #[tokio::test]
    async fn test_challenge_manager_read_precedes_submissions() {
        let account = dev_account(KEY_0);
        let mut seq = Sequence::new();
        let mut client = MockChainClient::new();

        client
            .expect_call()
            .with(eq(rollup()), eq(Bytes::from(ChallengeManagerCall.encode())))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(abi::encode(&[Token::Address(manager())]).into()));
        client
            .expect_pending_nonce()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(5));
        client
            .expect_suggest_gas_price()
            .times(3)
            .returning(|| Ok(U256::from(10)));
        client
            .expect_estimate_gas()
            .times(3)
            .returning(|_| Ok(U256::from(60_000)));
        let sent = record_broadcasts(&mut client);

        let sender = TransactionSender::new(Arc::new(client), GasPricer::new(100));
        let workflow = factory().build(&sender, &account).await.unwrap();
        let submitted = workflow.run(&sender).await.unwrap();

        assert_eq!(submitted.len(), 3);
        let txs: Vec<_> = sent.lock().unwrap().iter().map(decode).collect();
        for (i, tx) in txs.iter().enumerate() {
            assert_eq!(tx.to, Some(NameOrAddress::Address(token())));
            assert_eq!(tx.nonce, Some(U256::from(5 + i)));
            assert_eq!(tx.gas_price, Some(U256::from(20)));
        }
        assert_eq!(txs[0].value, Some(U256::exp10(20)));
        assert_eq!(txs[1].data, Some(contracts::approve_max_calldata(rollup())));
        assert_eq!(txs[2].data, Some(contracts::approve_max_calldata(manager())));
    }
}
