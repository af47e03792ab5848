//! Contract call encodings used by the setup workflows

use crate::chain::ChainClient;
use crate::error::{SetupError, SetupResult};

use ethers::abi::{self, AbiEncode, ParamType, Token};
use ethers::contract::abigen;
use ethers::types::{Address, Bytes, U256};

abigen!(
    StakeToken,
    r#"[
        function deposit() external payable
        function approve(address spender, uint256 amount) external returns (bool)
    ]"#
);

abigen!(
    RollupUserLogic,
    r#"[
        function challengeManager() external view returns (address)
    ]"#
);

/// Selector of the inbox's `depositEth(uint256 maxSubmissionCost)`
pub const DEPOSIT_ETH_SELECTOR: [u8; 4] = [0x0f, 0x4d, 0x14, 0xe9];

/// Max submission cost, in wei, attached to the bridging retryable ticket
pub const DEPOSIT_MAX_SUBMISSION_COST: u64 = 144_000_000_000_000;

/// Calldata for bridging ETH through the inbox.
///
/// `depositEth(DEPOSIT_MAX_SUBMISSION_COST)`; the message value is credited to
/// the sender's address on the rollup.
pub fn inbox_deposit_calldata() -> Bytes {
    let mut data = DEPOSIT_ETH_SELECTOR.to_vec();
    data.extend(abi::encode(&[Token::Uint(U256::from(
        DEPOSIT_MAX_SUBMISSION_COST,
    ))]));
    data.into()
}

/// Calldata wrapping the message value into stake tokens
pub fn deposit_calldata() -> Bytes {
    DepositCall.encode().into()
}

/// Calldata granting `spender` an unlimited allowance
pub fn approve_max_calldata(spender: Address) -> Bytes {
    ApproveCall {
        spender,
        amount: U256::MAX,
    }
    .encode()
    .into()
}

/// Read the challenge manager address from the rollup contract
pub async fn challenge_manager<C: ChainClient + ?Sized>(
    client: &C,
    rollup: Address,
) -> SetupResult<Address> {
    let output = client
        .call(rollup, ChallengeManagerCall.encode().into())
        .await?;

    let mut tokens = abi::decode(&[ParamType::Address], &output)
        .map_err(|e| SetupError::Contract(format!("challengeManager() returned {}: {}", output, e)))?;

    match tokens.pop().and_then(Token::into_address) {
        Some(address) => Ok(address),
        None => Err(SetupError::Contract(
            "challengeManager() did not return an address".to_string(),
        )),
    }
}
