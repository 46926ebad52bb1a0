//! Per-holder ledger state and the linear accrual arithmetic.

use rebase_types::{InterestRate, Timestamp, PRECISION};
use serde::{Deserialize, Serialize};

/// Ledger state for a single holder.
///
/// Only the realised principal is stored. Interest accrued since
/// `last_settled_at` is projected on demand and written into `principal`
/// by [`HolderAccount::settle`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderAccount {
    /// Realised balance, excluding interest accrued since the last settlement.
    pub principal: u128,
    /// Rate fixed at the holder's last mint, or inherited on first receipt.
    pub locked_rate: InterestRate,
    /// Start of the current accrual interval.
    pub last_settled_at: Timestamp,
}

impl HolderAccount {
    /// A fresh, empty account whose accrual clock starts at `created_at`.
    pub fn new(created_at: Timestamp) -> Self {
        Self {
            principal: 0,
            locked_rate: InterestRate::ZERO,
            last_settled_at: created_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.principal == 0
    }

    /// Interest accrued since the last settlement, or `None` on overflow.
    ///
    /// `floor(principal × rate × elapsed / PRECISION)`. Rounding is always
    /// downwards so settlement never credits value that was not earned.
    pub fn accrued_interest_checked(&self, now: Timestamp) -> Option<u128> {
        if self.principal == 0 || self.locked_rate.is_zero() {
            return Some(0);
        }
        let elapsed = self.last_settled_at.elapsed_since(now) as u128;
        let factor = self.locked_rate.raw().checked_mul(elapsed)?;
        mul_div_precision(self.principal, factor)
    }

    /// Principal plus accrued interest, or `None` on overflow.
    pub fn projected_balance_checked(&self, now: Timestamp) -> Option<u128> {
        self.principal
            .checked_add(self.accrued_interest_checked(now)?)
    }

    /// Principal plus accrued interest, saturating at `u128::MAX`.
    pub fn projected_balance(&self, now: Timestamp) -> u128 {
        self.projected_balance_checked(now).unwrap_or(u128::MAX)
    }

    /// The account as it would look after realising interest at `now`,
    /// together with the interest realised.
    ///
    /// Pure: the receiver is left untouched so callers can validate a whole
    /// operation before writing anything back.
    pub fn settle(&self, now: Timestamp) -> Option<(Self, u128)> {
        let interest = self.accrued_interest_checked(now)?;
        let settled = Self {
            principal: self.principal.checked_add(interest)?,
            locked_rate: self.locked_rate,
            last_settled_at: now.max(self.last_settled_at),
        };
        Some((settled, interest))
    }
}

/// `floor(a × b / PRECISION)` without a 256-bit intermediate.
///
/// Splits both operands at `PRECISION`:
/// `a = qa·P + ra`, `b = qb·P + rb`, so
/// `a·b/P = qa·qb·P + qa·rb + ra·qb + ra·rb/P`, where only the last term
/// needs flooring and `ra·rb < P² < u128::MAX`.
pub fn mul_div_precision(a: u128, b: u128) -> Option<u128> {
    let (qa, ra) = (a / PRECISION, a % PRECISION);
    let (qb, rb) = (b / PRECISION, b % PRECISION);
    let high = qa.checked_mul(qb)?.checked_mul(PRECISION)?;
    let cross = qa.checked_mul(rb)?.checked_add(ra.checked_mul(qb)?)?;
    let low = ra * rb / PRECISION;
    high.checked_add(cross)?.checked_add(low)
}
