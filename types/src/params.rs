//! Ledger genesis parameters.

use crate::amount::{InterestRate, PRECISION};
use serde::{Deserialize, Serialize};

/// Default global interest rate at genesis: `5 * 10^-8` per second.
pub const DEFAULT_INTEREST_RATE: InterestRate = InterestRate::new(5 * PRECISION / 100_000_000);

/// Parameters fixed when a ledger instance is created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerParams {
    /// Global interest rate at genesis. Can only ever be lowered afterwards.
    pub initial_interest_rate: InterestRate,
    /// Human-readable token name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Number of display decimals.
    pub decimals: u8,
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self {
            initial_interest_rate: DEFAULT_INTEREST_RATE,
            name: "Rebase Token".to_string(),
            symbol: "RBT".to_string(),
            decimals: 18,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rate_is_five_e_minus_eight() {
        assert_eq!(DEFAULT_INTEREST_RATE.raw(), 50_000_000_000);
        assert_eq!(LedgerParams::default().decimals, 18);
    }
}
