//! Ledger-specific errors.

use rebase_types::{Address, InterestRate};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("interest rate can only decrease: current {current}, requested {requested}")]
    RateIncreaseRejected {
        current: InterestRate,
        requested: InterestRate,
    },

    #[error("unauthorized: {caller} lacks the {required} role")]
    Unauthorized {
        caller: Address,
        required: &'static str,
    },

    #[error("insufficient balance for {holder}: need {needed}, available {available}")]
    InsufficientBalance {
        holder: Address,
        needed: u128,
        available: u128,
    },

    #[error("insufficient allowance: {spender} may spend {allowed} of {owner}, requested {needed}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        allowed: u128,
        needed: u128,
    },

    #[error("arithmetic overflow in ledger computation")]
    Overflow,
}
