//! Amount and interest-rate constants.
//!
//! Amounts are plain `u128` raw units. Interest rates are fixed-point
//! fractions of [`PRECISION`] accrued per second, so a rate of
//! `5 * PRECISION / 10^8` credits 0.00000005 of principal every second.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-point scale for interest rates: `10^18`.
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Reserved amount meaning "the holder's entire current balance".
///
/// Resolved to the live computed balance at the start of a call, before any
/// state is touched.
pub const FULL_BALANCE: u128 = u128::MAX;

/// A per-second linear interest rate scaled by [`PRECISION`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InterestRate(u128);

impl InterestRate {
    pub const ZERO: Self = Self(0);

    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for InterestRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/s", self.0)
    }
}
