//! Gas price bumping for legacy transactions

use crate::chain::ChainClient;
use crate::error::SetupResult;

use ethers::types::{U256, U512};
use tracing::info;

const WEI_PER_GWEI: u64 = 1_000_000_000;

/// A suggested gas price together with the markup applied on top of it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasQuote {
    pub suggested: U256,
    pub bump_percent: u64,
}

impl GasQuote {
    /// Price actually offered: `suggested + floor(suggested * bump_percent / 100)`
    pub fn bumped(&self) -> U256 {
        bump_gas_price(self.suggested, self.bump_percent)
    }
}

/// Increase `suggested` by `percent` percent, rounding the increase down.
///
/// The intermediate product is computed in 512 bits so it cannot overflow. The
/// result saturates at `U256::MAX`, which keeps it `>= suggested`.
pub fn bump_gas_price(suggested: U256, percent: u64) -> U256 {
    let increase = suggested.full_mul(U256::from(percent)) / U512::from(100u64);
    let increase = U256::try_from(increase).unwrap_or(U256::MAX);
    suggested.saturating_add(increase)
}

/// Display-only conversion, truncating
pub fn wei_to_gwei(wei: U256) -> U256 {
    wei / U256::from(WEI_PER_GWEI)
}

/// Prices every submission from a fresh network suggestion
#[derive(Debug, Clone, Copy)]
pub struct GasPricer {
    bump_percent: u64,
}

impl GasPricer {
    pub fn new(bump_percent: u64) -> Self {
        Self { bump_percent }
    }

    /// Query the suggested price and apply the configured bump
    pub async fn quote<C: ChainClient + ?Sized>(&self, client: &C) -> SetupResult<GasQuote> {
        let suggested = client.suggest_gas_price().await?;
        let quote = GasQuote {
            suggested,
            bump_percent: self.bump_percent,
        };

        info!(
            "Suggested gas price: {} gwei, bumping by {} percent",
            wei_to_gwei(suggested),
            self.bump_percent
        );
        info!("Bumped to price: {} gwei", wei_to_gwei(quote.bumped()));

        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MockChainClient;

    #[test]
    fn test_bump_formula() {
        assert_eq!(bump_gas_price(U256::from(1000), 50), U256::from(1500));
        assert_eq!(bump_gas_price(U256::from(1), 100), U256::from(2));
        assert_eq!(bump_gas_price(U256::zero(), 999), U256::zero());
    }

    #[test]
    fn test_bump_rounds_increase_down() {
        // 7 * 33 / 100 = 2.31
        assert_eq!(bump_gas_price(U256::from(7), 33), U256::from(9));
        assert_eq!(bump_gas_price(U256::from(99), 1), U256::from(99));
    }

    #[test]
    fn test_bump_is_monotonic() {
        let prices = [0u64, 1, 9, 10, 1_000_000_007, 30_000_000_000, u64::MAX];
        let percents = [0u64, 1, 10, 99, 100, 250, 10_000];
        for price in prices {
            let suggested = U256::from(price);
            assert_eq!(bump_gas_price(suggested, 0), suggested);
            for percent in percents {
                assert!(bump_gas_price(suggested, percent) >= suggested);
            }
        }
    }

    #[test]
    fn test_bump_large_values_do_not_overflow() {
        let huge = U256::MAX / 2;
        assert_eq!(bump_gas_price(huge, 50), huge + huge / 2);
        assert_eq!(bump_gas_price(U256::MAX, 100), U256::MAX);
        assert_eq!(bump_gas_price(U256::MAX, 0), U256::MAX);
    }

    #[test]
    fn test_wei_to_gwei_truncates() {
        assert_eq!(wei_to_gwei(U256::from(1_999_999_999u64)), U256::from(1));
        assert_eq!(wei_to_gwei(U256::from(999_999_999u64)), U256::zero());
        assert_eq!(wei_to_gwei(U256::from(42_000_000_000u64)), U256::from(42));
    }

    #[tokio::test]
    async fn test_quote_uses_network_suggestion() {
        let mut client = MockChainClient::new();
        client
            .expect_suggest_gas_price()
            .times(1)
            .returning(|| Ok(U256::from(10)));

        let quote = GasPricer::new(100).quote(&client).await.unwrap();
        assert_eq!(quote.suggested, U256::from(10));
        assert_eq!(quote.bumped(), U256::from(20));
    }
}
